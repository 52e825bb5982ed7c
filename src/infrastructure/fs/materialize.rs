//! Tree materialization
//!
//! Reproduces a walked tree at a new location, either as copies or as hard
//! links. Both produce the same logical tree (same paths, bytes and modes).

use std::fs;
use std::io;
use std::path::Path;

use tracing::debug;

use crate::domain::value_objects::LinkMode;
use crate::error::StagerResult;

use super::tree::{walk, EntryKind, TreeFilter};

/// Materialize `src` into `dst` (which must not contain conflicting files).
///
/// Returns the number of files written.
pub fn materialize_tree(
    src: &Path,
    dst: &Path,
    mode: LinkMode,
    filter: &TreeFilter<'_>,
) -> StagerResult<usize> {
    fs::create_dir_all(dst)?;
    let mut files = 0;
    for entry in walk(src, filter)? {
        let from = src.join(&entry.rel);
        let to = dst.join(&entry.rel);
        match entry.kind {
            EntryKind::Dir => fs::create_dir_all(&to)?,
            EntryKind::File { .. } => {
                place_file(&from, &to, mode)?;
                files += 1;
            }
            EntryKind::Symlink => {
                copy_symlink(&from, &to)?;
                files += 1;
            }
        }
    }
    Ok(files)
}

/// Place one file, falling back from a hard link to a copy when linking fails
/// (for example across devices).
pub fn place_file(from: &Path, to: &Path, mode: LinkMode) -> io::Result<()> {
    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent)?;
    }
    match mode {
        LinkMode::Copy => fs::copy(from, to).map(|_| ()),
        LinkMode::Hardlink => fs::hard_link(from, to).or_else(|err| {
            debug!(path = %to.display(), error = %err, "hard link failed, copying instead");
            fs::copy(from, to).map(|_| ())
        }),
    }
}

#[cfg(unix)]
fn copy_symlink(from: &Path, to: &Path) -> io::Result<()> {
    let target = fs::read_link(from)?;
    std::os::unix::fs::symlink(target, to)
}

#[cfg(not(unix))]
fn copy_symlink(from: &Path, to: &Path) -> io::Result<()> {
    fs::copy(from, to).map(|_| ())
}

/// Remove `path` entirely if it exists.
pub fn remove_tree(path: &Path) -> io::Result<()> {
    match fs::remove_dir_all(path) {
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}
