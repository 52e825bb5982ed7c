//! Pipeline Event Port
//!
//! Provides an observable interface for build and launch stages.
//! Enables progress reporting, JSON event streams, and debugging.

use std::path::PathBuf;

use crate::domain::value_objects::Stage;

/// How the dependency stage was satisfied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStatus {
    /// Workspace already holds this dependency key; nothing was touched
    UpToDate,
    /// Cache entry existed; the workspace was re-materialized from it
    CacheHit,
    /// Cache miss; packages were installed from the store
    Built,
}

impl SyncStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SyncStatus::UpToDate => "up_to_date",
            SyncStatus::CacheHit => "cache_hit",
            SyncStatus::Built => "built",
        }
    }
}

/// Event emitted during pipeline operations
#[derive(Debug, Clone)]
pub enum PipelineEvent {
    /// A stage transition succeeded
    StageEntered { stage: Stage },

    /// Manifest and lock were snapshotted
    SnapshotLoaded {
        dependency_key: String,
        lock_present: bool,
    },

    /// One locked package was installed into the cache entry
    PackageInstalled { name: String, version: String },

    /// Dependency environment is ready
    DependenciesSynced {
        dependency_key: String,
        status: SyncStatus,
        package_count: usize,
    },

    /// Bytecode compilation finished for a tree
    Compiled { path: PathBuf },

    /// Application copied and installed
    PayloadInstalled {
        project: String,
        payload_key: String,
        file_count: usize,
    },

    /// Search path bound to the environment
    RuntimeActivated { bin_dir: PathBuf },

    /// Listener about to take over the foreground
    Launching { command: String },

    /// A stage failed; no later stage will run
    Failed {
        stage: Stage,
        code: String,
        message: String,
    },
}

/// Trait for receiving pipeline events
///
/// Implementations:
/// - `TracingEventSink`: structured log lines
/// - `JsonEventSink`: NDJSON event stream for CI
/// - `NoopEventSink`: silent operation
pub trait PipelineEventSink: Send + Sync {
    /// Handle a pipeline event
    fn on_event(&self, event: PipelineEvent);

    /// Whether this sink wants per-package events
    fn wants_detailed_events(&self) -> bool {
        true
    }
}

/// No-op event sink for silent operation
pub struct NoopEventSink;

impl PipelineEventSink for NoopEventSink {
    fn on_event(&self, _event: PipelineEvent) {}

    fn wants_detailed_events(&self) -> bool {
        false
    }
}
