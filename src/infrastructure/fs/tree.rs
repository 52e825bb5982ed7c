//! Deterministic directory trees
//!
//! Walks a directory in byte-sorted order and hashes it. The same tree always
//! yields the same entry list and the same hash, whatever order the file
//! system returns entries in.

use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::value_objects::{ContentHash, FramedHasher};
use crate::error::StagerResult;

use super::context_ignore::ContextIgnore;

/// Kind of a tree entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Dir,
    File { executable: bool },
    Symlink,
}

/// One entry of a walked tree, relative to the walk root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    pub rel: PathBuf,
    pub kind: EntryKind,
}

/// Which entries a walk keeps.
pub enum TreeFilter<'a> {
    /// Every entry
    All,
    /// Skip bytecode artifacts (`__pycache__/`, `*.pyc`)
    SkipCompiled,
    /// Build context rules from `.stagerignore`
    Context(&'a ContextIgnore),
    /// `SkipCompiled`, and also these exact relative paths
    SkipCompiledExcept(&'a [PathBuf]),
}

impl TreeFilter<'_> {
    fn keeps(&self, rel: &Path, is_dir: bool) -> bool {
        match self {
            TreeFilter::All => true,
            TreeFilter::SkipCompiled => !is_compiled_artifact(rel, is_dir),
            TreeFilter::Context(ignore) => !ignore.is_ignored(rel, is_dir),
            TreeFilter::SkipCompiledExcept(excluded) => {
                !is_compiled_artifact(rel, is_dir) && !excluded.iter().any(|p| p == rel)
            }
        }
    }
}

/// True for bytecode caches that compilation adds next to sources.
pub fn is_compiled_artifact(rel: &Path, is_dir: bool) -> bool {
    let name = rel.file_name().map(|n| n.to_string_lossy());
    match name {
        Some(name) if is_dir => name == "__pycache__",
        Some(name) => name.ends_with(".pyc"),
        None => false,
    }
}

/// Normalize a relative path for records and hashing (always forward slashes).
pub fn normalize_rel(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Walk `root` depth-first in sorted order. Filtered directories are not entered.
pub fn walk(root: &Path, filter: &TreeFilter<'_>) -> StagerResult<Vec<TreeEntry>> {
    let mut entries = Vec::new();
    walk_into(root, Path::new(""), filter, &mut entries)?;
    Ok(entries)
}

fn walk_into(
    root: &Path,
    rel_dir: &Path,
    filter: &TreeFilter<'_>,
    out: &mut Vec<TreeEntry>,
) -> StagerResult<()> {
    let mut children: Vec<_> = fs::read_dir(root.join(rel_dir))?
        .map(|e| e.map(|e| e.file_name()))
        .collect::<Result<_, _>>()?;
    children.sort();

    for name in children {
        let rel = rel_dir.join(&name);
        let metadata = fs::symlink_metadata(root.join(&rel))?;
        let file_type = metadata.file_type();
        let is_dir = file_type.is_dir();
        if !filter.keeps(&rel, is_dir) {
            continue;
        }

        if is_dir {
            out.push(TreeEntry {
                rel: rel.clone(),
                kind: EntryKind::Dir,
            });
            walk_into(root, &rel, filter, out)?;
        } else if file_type.is_symlink() {
            out.push(TreeEntry {
                rel,
                kind: EntryKind::Symlink,
            });
        } else {
            out.push(TreeEntry {
                rel,
                kind: EntryKind::File {
                    executable: is_executable(&metadata),
                },
            });
        }
    }
    Ok(())
}

#[cfg(unix)]
fn is_executable(metadata: &fs::Metadata) -> bool {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode() & 0o111 != 0
}

#[cfg(not(unix))]
fn is_executable(_metadata: &fs::Metadata) -> bool {
    false
}

/// Hash the walked tree: paths, kinds, executable bits, file bytes, link targets.
pub fn tree_hash(root: &Path, filter: &TreeFilter<'_>) -> StagerResult<ContentHash> {
    let mut hasher = FramedHasher::new();
    for entry in walk(root, filter)? {
        let rel = normalize_rel(&entry.rel);
        match entry.kind {
            EntryKind::Dir => {
                hasher.field("dir", rel.as_bytes());
            }
            EntryKind::File { executable } => {
                hasher.field(if executable { "exec" } else { "file" }, rel.as_bytes());
                hasher.field("content", &fs::read(root.join(&entry.rel))?);
            }
            EntryKind::Symlink => {
                let target = fs::read_link(root.join(&entry.rel))?;
                hasher.field("symlink", rel.as_bytes());
                hasher.field("target", normalize_rel(&target).as_bytes());
            }
        }
    }
    Ok(hasher.finish())
}

/// Fingerprint of an environment or cache entry, ignoring bytecode caches.
pub fn fingerprint(root: &Path) -> StagerResult<ContentHash> {
    tree_hash(root, &TreeFilter::SkipCompiled)
}

/// `fingerprint` with the given relative paths left out.
pub fn fingerprint_excluding(root: &Path, excluded: &[PathBuf]) -> StagerResult<ContentHash> {
    tree_hash(root, &TreeFilter::SkipCompiledExcept(excluded))
}
