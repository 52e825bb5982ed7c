//! Infrastructure Layer
//!
//! Concrete implementations of domain ports.
//! This layer handles all I/O operations.
//!
//! ## Structure
//!
//! - `fs/` - Tree walking, hashing, materialization, `.stagerignore`
//! - `repositories/` - Manifest/lock codecs, package store, workspace state
//! - `events/` - Pipeline event sinks (NDJSON, tracing)
//! - `process/` - Bytecode compiler and listener process

pub mod events;
pub mod fs;
pub mod process;
pub mod repositories;

// Re-export for convenience
pub use events::{JsonEventSink, TracingEventSink};
pub use process::{ExternalCompiler, ProcessLauncher};
pub use repositories::{PackageStore, Workspace};
