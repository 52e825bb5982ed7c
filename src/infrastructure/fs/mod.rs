//! File System Helpers
//!
//! Deterministic tree walking and hashing, build context ignore rules, and
//! copy/hardlink materialization.

mod context_ignore;
mod materialize;
mod tree;

pub use context_ignore::{ContextIgnore, IgnoreError, IGNORE_FILE, RESERVED_DIR};
pub use materialize::{materialize_tree, place_file, remove_tree};
pub use tree::{
    fingerprint, fingerprint_excluding, is_compiled_artifact, normalize_rel, tree_hash, walk, EntryKind, TreeEntry,
    TreeFilter,
};
