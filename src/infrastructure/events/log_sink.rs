//! Tracing Event Sink
//!
//! Renders pipeline events as structured log lines.

use tracing::{debug, info};

use crate::domain::ports::{PipelineEvent, PipelineEventSink};

/// Event sink that forwards pipeline events to `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingEventSink {
    detailed: bool,
}

impl TracingEventSink {
    pub fn new(detailed: bool) -> Self {
        Self { detailed }
    }
}

impl PipelineEventSink for TracingEventSink {
    fn on_event(&self, event: PipelineEvent) {
        match event {
            PipelineEvent::StageEntered { stage } => debug!(%stage, "stage entered"),
            PipelineEvent::SnapshotLoaded {
                dependency_key,
                lock_present,
            } => info!(%dependency_key, lock_present, "manifest snapshot loaded"),
            PipelineEvent::PackageInstalled { name, version } => {
                debug!(%name, %version, "installed package")
            }
            PipelineEvent::DependenciesSynced {
                dependency_key,
                status,
                package_count,
            } => info!(
                %dependency_key,
                status = status.as_str(),
                package_count,
                "dependencies synced"
            ),
            PipelineEvent::Compiled { path } => debug!(path = %path.display(), "compiled bytecode"),
            PipelineEvent::PayloadInstalled {
                project,
                payload_key,
                file_count,
            } => info!(%project, %payload_key, file_count, "application installed"),
            PipelineEvent::RuntimeActivated { bin_dir } => {
                info!(bin_dir = %bin_dir.display(), "runtime activated")
            }
            PipelineEvent::Launching { command } => info!(%command, "launching listener"),
            PipelineEvent::Failed {
                stage,
                code,
                message,
            } => debug!(%stage, %code, %message, "stage failed"),
        }
    }

    fn wants_detailed_events(&self) -> bool {
        self.detailed
    }
}
