//! Domain Entities
//!
//! - `Manifest` - human-authored dependency declaration
//! - `Lockfile` - fully pinned dependency graph
//! - `InstalledSet` - what a synchronized environment contains

mod environment;
mod lockfile;
mod manifest;

pub use environment::{InstallKind, InstallRecord, InstalledSet};
pub use lockfile::{LockedPackage, Lockfile};
pub(crate) use manifest::canonicalize;
pub use manifest::Manifest;
