//! Application Layer
//!
//! Use cases that orchestrate the build-and-launch flow.
//! This layer:
//! - Depends on Domain layer (entities, services, ports)
//! - Does NOT contain business rules (those are in Domain)
//! - Coordinates between Infrastructure and Domain
//!
//! ## Stages
//!
//! - `ManifestSnapshot` - raw manifest and lock bytes, dependency key
//! - `EnvironmentSynchronizer` - locked, non-dev dependency environment
//! - `PayloadInstaller` - application copy installed as the project package
//! - `activate` - search path and working directory for the listener
//! - `ServiceLauncher` - foreground listener on `0.0.0.0:<port>`
//! - `BuildPipeline` - the state machine tying them together

mod activate;
mod launch;
mod payload;
mod pipeline;
mod snapshot;
mod sync;

pub use activate::{activate, Activation};
pub use launch::{ServiceLauncher, ServiceSpec, BIND_HOST};
pub use payload::{payload_key, PayloadInstaller, PayloadOutcome};
pub use pipeline::{BuildPipeline, BuildReport, CacheKeys};
pub use snapshot::ManifestSnapshot;
pub use sync::{EnvironmentSynchronizer, SyncOutcome};
