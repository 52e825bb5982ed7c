//! Build workspace repository
//!
//! Layout helpers, the persisted pipeline state at `.stager/state.toml`,
//! and the exclusive writer lock at `.stager/build.lock`.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::Stage;
use crate::error::{StagerError, StagerResult};

use super::install_records::InstallRecordStore;

/// Current `state.toml` format version.
pub const STATE_VERSION: u32 = 1;

/// Paths inside a build workspace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn env_dir(&self) -> PathBuf {
        self.root.join("env")
    }

    pub fn bin_dir(&self) -> PathBuf {
        self.env_dir().join("bin")
    }

    pub fn site_packages(&self) -> PathBuf {
        self.env_dir().join("site-packages")
    }

    pub fn app_dir(&self) -> PathBuf {
        self.root.join("app")
    }

    pub fn meta_dir(&self) -> PathBuf {
        self.root.join(".stager")
    }

    pub fn state_path(&self) -> PathBuf {
        self.meta_dir().join("state.toml")
    }

    pub fn lock_path(&self) -> PathBuf {
        self.meta_dir().join("build.lock")
    }

    pub fn records(&self) -> InstallRecordStore {
        InstallRecordStore::new(&self.env_dir())
    }

    pub fn state(&self) -> StateRepository {
        StateRepository::new(self.state_path())
    }

    /// Take the exclusive writer lock, failing fast if another build holds it.
    pub fn lock(&self) -> StagerResult<WorkspaceLock> {
        WorkspaceLock::acquire(&self.lock_path())
    }
}

/// What the last pipeline run left behind in a workspace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceState {
    pub version: u32,
    pub stage: Stage,
    pub dependency_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    #[serde(default)]
    pub dependency_count: usize,
    pub updated_at: DateTime<Utc>,
}

impl WorkspaceState {
    pub fn new(stage: Stage) -> Self {
        Self {
            version: STATE_VERSION,
            stage,
            dependency_key: None,
            payload_key: None,
            project: None,
            dependency_count: 0,
            updated_at: Utc::now(),
        }
    }

    /// True when the recorded dependency stage was completed for `key`.
    pub fn has_dependencies_for(&self, key: &str) -> bool {
        self.dependency_key.as_deref() == Some(key)
            && matches!(
                self.stage,
                Stage::DepsSynced | Stage::PayloadInstalled | Stage::RuntimeActivated | Stage::Serving
            )
    }
}

/// Loads and saves `state.toml`.
#[derive(Debug, Clone)]
pub struct StateRepository {
    path: PathBuf,
}

impl StateRepository {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A missing or unreadable state file means a fresh workspace.
    pub fn load(&self) -> Option<WorkspaceState> {
        let content = fs::read_to_string(&self.path).ok()?;
        match toml::from_str::<WorkspaceState>(&content) {
            Ok(state) if state.version == STATE_VERSION => Some(state),
            Ok(state) => {
                tracing::warn!(
                    path = %self.path.display(),
                    found = state.version,
                    "ignoring workspace state with unknown version"
                );
                None
            }
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "ignoring corrupt workspace state");
                None
            }
        }
    }

    pub fn save(&self, state: &WorkspaceState) -> StagerResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(state)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e.to_string()))?;

        let tmp = self.path.with_extension("toml.tmp");
        fs::write(&tmp, content)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    pub fn clear(&self) -> StagerResult<()> {
        match fs::remove_file(&self.path) {
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            other => Ok(other?),
        }
    }
}

/// Exclusive lock held for the duration of a build. Released on drop.
#[derive(Debug)]
pub struct WorkspaceLock {
    file: fs::File,
    path: PathBuf,
}

impl WorkspaceLock {
    pub fn acquire(path: &Path) -> StagerResult<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = fs::OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(path)?;
        file.try_lock_exclusive()
            .map_err(|_| StagerError::WorkspaceBusy {
                path: path.to_path_buf(),
            })?;
        Ok(Self {
            file,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for WorkspaceLock {
    fn drop(&mut self) {
        let _ = self.file.unlock();
    }
}
