//! Subcommand implementations for the `stager` binary.

pub mod build;
pub mod json;
pub mod keys;
pub mod serve;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use stager::config::load_for_context;
use stager::domain::ports::{PipelineEvent, PipelineEventSink};
use stager::domain::value_objects::Stage;
use stager::infrastructure::events::{JsonEventSink, TracingEventSink};
use stager::{BuildPipeline, Config, StagerError, StagerResult};

use crate::cli::ContextArgs;

/// Flags every subcommand sees.
#[derive(Debug, Clone)]
pub struct GlobalOptions {
    pub json: bool,
    pub verbose: u8,
    pub config: Option<PathBuf>,
}

impl GlobalOptions {
    pub fn event_sink(&self, command: &'static str) -> Arc<dyn PipelineEventSink> {
        if self.json {
            Arc::new(JsonEventSink::stdout(command))
        } else {
            Arc::new(TracingEventSink::new(self.verbose >= 2))
        }
    }

    /// Canonical build context and its configuration (`stager.toml` plus env overrides).
    ///
    /// Failures are reported through `events` since the pipeline has not started yet.
    pub fn prepare(
        &self,
        args: &ContextArgs,
        events: &dyn PipelineEventSink,
    ) -> StagerResult<(PathBuf, Config)> {
        let prepared = std::fs::canonicalize(&args.context)
            .map_err(StagerError::from)
            .and_then(|context| {
                let config = load_for_context(&context, self.config.as_deref())?;
                Ok((context, config))
            });
        prepared.map_err(|err| report_setup_failure(events, err))
    }
}

pub fn open_pipeline(
    config: Config,
    context: &Path,
    args: &ContextArgs,
    events: Arc<dyn PipelineEventSink>,
) -> BuildPipeline {
    let paths = config.resolve(context, args.workspace.as_deref());
    BuildPipeline::new(config, paths).with_events(events)
}

fn report_setup_failure(events: &dyn PipelineEventSink, err: StagerError) -> StagerError {
    events.on_event(PipelineEvent::Failed {
        stage: Stage::ManifestLoaded,
        code: err.code().to_string(),
        message: err.to_string(),
    });
    err
}
