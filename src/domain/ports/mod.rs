//! Domain Ports (Interfaces)
//!
//! These traits define the boundaries of the domain layer.
//! Infrastructure layer provides concrete implementations.

pub mod bytecode_compiler;
pub mod launcher;
pub mod pipeline_events;

pub use bytecode_compiler::{BytecodeCompiler, NoopCompiler};
pub use launcher::{LaunchCommand, Launcher};
pub use pipeline_events::{NoopEventSink, PipelineEvent, PipelineEventSink, SyncStatus};
