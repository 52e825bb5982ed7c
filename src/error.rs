//! Error types for Stager
//!
//! Uses `thiserror` for library errors. The three pipeline failure classes
//! (`LockMismatch`, `PayloadInstall`, `EnvironmentActivation`) are kept as
//! distinct variants so operators can tell a bad lock from bad application code.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for Stager operations
pub type StagerResult<T> = Result<T, StagerError>;

/// Why a manifest/lock pair was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LockMismatchReason {
    /// No lock file next to the manifest
    MissingLock { path: PathBuf },
    /// Lock file is not valid TOML or has the wrong shape
    MalformedLock { message: String },
    /// Manifest could not be parsed
    MalformedManifest { message: String },
    /// Lock format version this build does not understand
    UnsupportedVersion { found: u32, expected: u32 },
    /// Lock was generated for another project
    ProjectMismatch { locked: String, declared: String },
    /// Recorded requirements differ from the manifest's declarations
    Stale { diff: String },
    /// A declared requirement has no satisfying locked package
    Unsatisfied { requirement: String, locked: Option<String> },
    /// A locked package depends on something that is not locked
    DanglingDependency { package: String, dependency: String },
    /// The same package is locked twice
    DuplicatePackage { name: String },
    /// Copied build context carries a different manifest or lock than the snapshot
    SnapshotDrift { expected: String, found: String },
}

impl std::fmt::Display for LockMismatchReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingLock { path } => write!(f, "lock file {} is missing", path.display()),
            Self::MalformedLock { message } => write!(f, "lock file is malformed: {}", message),
            Self::MalformedManifest { message } => write!(f, "manifest is malformed: {}", message),
            Self::UnsupportedVersion { found, expected } => write!(
                f,
                "lock format version {} is not supported (expected {})",
                found, expected
            ),
            Self::ProjectMismatch { locked, declared } => write!(
                f,
                "lock was generated for '{}' but the manifest declares '{}'",
                locked, declared
            ),
            Self::Stale { diff } => {
                write!(f, "lock is stale relative to the manifest:\n{}", diff)
            }
            Self::Unsatisfied {
                requirement,
                locked: Some(version),
            } => write!(
                f,
                "requirement '{}' is not satisfied by locked version {}",
                requirement, version
            ),
            Self::Unsatisfied {
                requirement,
                locked: None,
            } => write!(f, "requirement '{}' has no locked package", requirement),
            Self::DanglingDependency {
                package,
                dependency,
            } => write!(
                f,
                "locked package '{}' depends on '{}' which is not locked",
                package, dependency
            ),
            Self::DuplicatePackage { name } => write!(f, "package '{}' is locked twice", name),
            Self::SnapshotDrift { expected, found } => write!(
                f,
                "build context manifest/lock hash to {} but dependencies were synced from {}",
                found, expected
            ),
        }
    }
}

/// Main error type for Stager operations
#[derive(Error, Debug)]
pub enum StagerError {
    /// Manifest and lock disagree, or the lock is absent or stale
    #[error("lock mismatch: {reason}")]
    LockMismatch { reason: LockMismatchReason },

    /// The application package itself failed to install
    #[error("failed to install application package '{project}': {reason}")]
    PayloadInstall { project: String, reason: String },

    /// The synchronized environment cannot be activated
    #[error("environment activation failed: {reason}")]
    EnvironmentActivation { reason: String },

    /// Dependency manifest not found in the build context
    #[error("dependency manifest not found: {path}")]
    ManifestNotFound { path: PathBuf },

    /// Locked artifact missing from the package store
    #[error("package {name}=={version} is not available in store {store}")]
    PackageUnavailable {
        name: String,
        version: String,
        store: PathBuf,
    },

    /// Store artifact content differs from the pinned hash
    #[error("package {name}=={version} hash mismatch: locked {expected}, store has {actual}")]
    ArtifactHashMismatch {
        name: String,
        version: String,
        expected: String,
        actual: String,
    },

    /// Store artifact contains a symbolic link, whose target the hash cannot cover
    #[error("package {name}=={version} contains symbolic link '{path}'; artifacts must hold regular files only")]
    ArtifactSymlink {
        name: String,
        version: String,
        path: PathBuf,
    },

    /// Two packages install the same file
    #[error("file '{path}' is installed by both '{first}' and '{second}'")]
    FileConflict {
        path: PathBuf,
        first: String,
        second: String,
    },

    /// Another build holds the workspace lock
    #[error("workspace {path} is locked by another build")]
    WorkspaceBusy { path: PathBuf },

    /// Listener process could not be started
    #[error("failed to launch '{program}': {message}")]
    Launch { program: PathBuf, message: String },

    /// Invalid configuration file
    #[error("invalid configuration in {file}: {message}")]
    Config { file: PathBuf, message: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl StagerError {
    pub fn lock_mismatch(reason: LockMismatchReason) -> Self {
        Self::LockMismatch { reason }
    }

    pub fn payload(project: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::PayloadInstall {
            project: project.into(),
            reason: reason.into(),
        }
    }

    pub fn activation(reason: impl Into<String>) -> Self {
        Self::EnvironmentActivation {
            reason: reason.into(),
        }
    }

    /// Stable machine-readable code used in JSON output.
    pub fn code(&self) -> &'static str {
        match self {
            Self::LockMismatch { .. } => "lock_mismatch",
            Self::PayloadInstall { .. } => "payload_install_error",
            Self::EnvironmentActivation { .. } => "environment_activation_error",
            Self::ManifestNotFound { .. } => "manifest_not_found",
            Self::PackageUnavailable { .. } => "package_unavailable",
            Self::ArtifactHashMismatch { .. } => "artifact_hash_mismatch",
            Self::ArtifactSymlink { .. } => "artifact_symlink",
            Self::FileConflict { .. } => "file_conflict",
            Self::WorkspaceBusy { .. } => "workspace_busy",
            Self::Launch { .. } => "launch_error",
            Self::Config { .. } => "config_error",
            Self::Io(_) => "io_error",
        }
    }

    /// Process exit code for a failed pipeline.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::LockMismatch { .. } => 2,
            Self::PayloadInstall { .. } => 3,
            Self::EnvironmentActivation { .. } => 4,
            _ => 1,
        }
    }
}
