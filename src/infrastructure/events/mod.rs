//! Event Sink Implementations
//!
//! Concrete implementations of PipelineEventSink:
//! - JsonEventSink: NDJSON output for CI/automation
//! - TracingEventSink: structured log lines

mod json;
mod log_sink;

pub use json::JsonEventSink;
pub use log_sink::TracingEventSink;
