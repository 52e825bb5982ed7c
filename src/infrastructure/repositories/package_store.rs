//! Offline package store
//!
//! Artifacts live at `<store>/<normalized-name>/<version>/`. An artifact is
//! only handed out after its tree hash matches the hash pinned in the lock.
//! Symbolic links are refused: the tree hash records only their target path,
//! so the bytes behind them would go unverified.

use std::path::{Path, PathBuf};

use crate::domain::entities::LockedPackage;
use crate::error::{StagerError, StagerResult};
use crate::infrastructure::fs::{tree_hash, walk, EntryKind, TreeFilter};

#[derive(Debug, Clone)]
pub struct PackageStore {
    root: PathBuf,
}

impl PackageStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn artifact_dir(&self, package: &LockedPackage) -> PathBuf {
        self.root
            .join(package.name().as_str())
            .join(package.raw_version())
    }

    /// Locate and verify the artifact for `package`.
    pub fn fetch(&self, package: &LockedPackage) -> StagerResult<PathBuf> {
        let dir = self.artifact_dir(package);
        if !dir.is_dir() {
            return Err(StagerError::PackageUnavailable {
                name: package.name().to_string(),
                version: package.raw_version().to_string(),
                store: self.root.clone(),
            });
        }

        if let Some(link) = walk(&dir, &TreeFilter::All)?
            .into_iter()
            .find(|e| e.kind == EntryKind::Symlink)
        {
            return Err(StagerError::ArtifactSymlink {
                name: package.name().to_string(),
                version: package.raw_version().to_string(),
                path: link.rel,
            });
        }

        let actual = tree_hash(&dir, &TreeFilter::All)?;
        if &actual != package.hash() {
            return Err(StagerError::ArtifactHashMismatch {
                name: package.name().to_string(),
                version: package.raw_version().to_string(),
                expected: package.hash().to_string(),
                actual: actual.to_string(),
            });
        }
        Ok(dir)
    }
}
