//! Manifest Snapshot Loader
//!
//! Captures the raw manifest and lock bytes. Nothing is parsed here; the
//! dependency key is derived from these bytes alone.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::config::BuildPaths;
use crate::domain::entities::{Lockfile, Manifest};
use crate::domain::services::dependency_key;
use crate::domain::value_objects::ContentHash;
use crate::error::{LockMismatchReason, StagerError, StagerResult};
use crate::infrastructure::repositories::{parse_lockfile, parse_manifest};

/// Raw manifest and lock content, as found at snapshot time.
#[derive(Debug, Clone)]
pub struct ManifestSnapshot {
    manifest_path: PathBuf,
    lock_path: PathBuf,
    manifest: Vec<u8>,
    lock: Option<Vec<u8>>,
    dependency_key: ContentHash,
}

impl ManifestSnapshot {
    /// Read the manifest and lock named by `paths`.
    ///
    /// A missing manifest fails; a missing lock is recorded as absent.
    pub fn load(paths: &BuildPaths) -> StagerResult<Self> {
        let manifest = match fs::read(&paths.manifest) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Err(StagerError::ManifestNotFound {
                    path: paths.manifest.clone(),
                });
            }
            Err(err) => return Err(err.into()),
        };
        let lock = read_optional(&paths.lock)?;
        Ok(Self::from_bytes(
            paths.manifest.clone(),
            paths.lock.clone(),
            manifest,
            lock,
        ))
    }

    pub fn from_bytes(
        manifest_path: PathBuf,
        lock_path: PathBuf,
        manifest: Vec<u8>,
        lock: Option<Vec<u8>>,
    ) -> Self {
        let dependency_key = dependency_key(&manifest, lock.as_deref());
        Self {
            manifest_path,
            lock_path,
            manifest,
            lock,
            dependency_key,
        }
    }

    pub fn dependency_key(&self) -> &ContentHash {
        &self.dependency_key
    }

    pub fn manifest_path(&self) -> &Path {
        &self.manifest_path
    }

    pub fn lock_path(&self) -> &Path {
        &self.lock_path
    }

    pub fn manifest_bytes(&self) -> &[u8] {
        &self.manifest
    }

    pub fn lock_bytes(&self) -> Option<&[u8]> {
        self.lock.as_deref()
    }

    pub fn has_lock(&self) -> bool {
        self.lock.is_some()
    }

    /// Decode both files. An absent lock is a `MissingLock` mismatch.
    pub fn decode(&self) -> Result<(Manifest, Lockfile), LockMismatchReason> {
        let manifest = std::str::from_utf8(&self.manifest)
            .map_err(|e| LockMismatchReason::MalformedManifest {
                message: e.to_string(),
            })
            .and_then(parse_manifest)?;

        let lock_bytes = self
            .lock
            .as_deref()
            .ok_or_else(|| LockMismatchReason::MissingLock {
                path: self.lock_path.clone(),
            })?;
        let lock = std::str::from_utf8(lock_bytes)
            .map_err(|e| LockMismatchReason::MalformedLock {
                message: e.to_string(),
            })
            .and_then(parse_lockfile)?;

        Ok((manifest, lock))
    }
}

/// Read a file, mapping "not found" to `None`.
pub(crate) fn read_optional(path: &Path) -> io::Result<Option<Vec<u8>>> {
    match fs::read(path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err),
    }
}
