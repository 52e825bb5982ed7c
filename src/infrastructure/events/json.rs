//! JSON Event Sink
//!
//! Outputs pipeline events as NDJSON for CI/automation consumption.

use crate::domain::ports::{PipelineEvent, PipelineEventSink};
use std::io::{self, Write};
use std::sync::Mutex;

/// Event sink that outputs NDJSON events to stdout
pub struct JsonEventSink {
    command: &'static str,
    writer: Mutex<Box<dyn Write + Send>>,
}

impl JsonEventSink {
    /// Create a new JSON event sink writing to stdout
    pub fn stdout(command: &'static str) -> Self {
        Self::with_writer(command, io::stdout())
    }

    /// Create a JSON event sink writing to a custom writer
    pub fn with_writer<W: Write + Send + 'static>(command: &'static str, writer: W) -> Self {
        Self {
            command,
            writer: Mutex::new(Box::new(writer)),
        }
    }

    fn write_event(&self, event: serde_json::Value) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writeln!(writer, "{}", event);
            let _ = writer.flush();
        }
    }
}

impl PipelineEventSink for JsonEventSink {
    fn on_event(&self, event: PipelineEvent) {
        let command = self.command;
        let json = match event {
            PipelineEvent::StageEntered { stage } => {
                serde_json::json!({
                    "event": "stage",
                    "command": command,
                    "stage": stage.as_str(),
                })
            }

            PipelineEvent::SnapshotLoaded {
                dependency_key,
                lock_present,
            } => {
                serde_json::json!({
                    "event": "snapshot",
                    "command": command,
                    "dependency_key": dependency_key,
                    "lock_present": lock_present,
                })
            }

            PipelineEvent::PackageInstalled { name, version } => {
                serde_json::json!({
                    "event": "package_installed",
                    "command": command,
                    "name": name,
                    "version": version,
                })
            }

            PipelineEvent::DependenciesSynced {
                dependency_key,
                status,
                package_count,
            } => {
                serde_json::json!({
                    "event": "dependencies_synced",
                    "command": command,
                    "dependency_key": dependency_key,
                    "status": status.as_str(),
                    "package_count": package_count,
                })
            }

            PipelineEvent::Compiled { path } => {
                serde_json::json!({
                    "event": "compiled",
                    "command": command,
                    "path": path.display().to_string(),
                })
            }

            PipelineEvent::PayloadInstalled {
                project,
                payload_key,
                file_count,
            } => {
                serde_json::json!({
                    "event": "payload_installed",
                    "command": command,
                    "project": project,
                    "payload_key": payload_key,
                    "file_count": file_count,
                })
            }

            PipelineEvent::RuntimeActivated { bin_dir } => {
                serde_json::json!({
                    "event": "runtime_activated",
                    "command": command,
                    "bin_dir": bin_dir.display().to_string(),
                })
            }

            PipelineEvent::Launching { command: line } => {
                serde_json::json!({
                    "event": "launching",
                    "command": command,
                    "argv": line,
                })
            }

            PipelineEvent::Failed {
                stage,
                code,
                message,
            } => {
                serde_json::json!({
                    "event": "error",
                    "command": command,
                    "stage": stage.as_str(),
                    "code": code,
                    "message": message,
                })
            }
        };

        self.write_event(json);
    }
}
