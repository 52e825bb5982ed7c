//! stager - reproducible build-and-launch pipeline for containerized web services
//!
//! A build runs a one-pass state machine over a build context:
//!
//! 1. snapshot the dependency manifest and its lock,
//! 2. materialize the locked (non-dev) dependencies into an isolated
//!    environment, reusing a cache entry keyed only by the snapshot,
//! 3. install the application payload on top of that environment,
//! 4. activate the environment,
//! 5. hand the process over to the ASGI listener.
//!
//! Any failure stops the pipeline with a distinguishable exit code and no
//! listener is started.

pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;

// Re-exports for convenience
pub use application::{BuildPipeline, BuildReport, CacheKeys};
pub use config::{BuildPaths, Config};
pub use error::{LockMismatchReason, StagerError, StagerResult};
