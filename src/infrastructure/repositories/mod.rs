//! Repository Implementations
//!
//! File-backed storage for manifests, locks, packages and workspace state.

mod install_records;
mod lockfile;
mod manifest;
mod package_store;
mod workspace;

pub use install_records::{InstallRecordStore, RECORDS_DIR};
pub use lockfile::{parse_lockfile, render_lockfile};
pub use manifest::parse_manifest;
pub use package_store::PackageStore;
pub use workspace::{StateRepository, Workspace, WorkspaceLock, WorkspaceState, STATE_VERSION};
