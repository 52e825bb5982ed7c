//! Cache key derivation
//!
//! The dependency key covers the manifest and lock bytes and nothing else.
//! Application files, configuration and environment flags never feed into it.

use crate::domain::value_objects::{ContentHash, FramedHasher};

/// Key for the dependency-only environment (first cache partition).
pub fn dependency_key(manifest: &[u8], lock: Option<&[u8]>) -> ContentHash {
    let mut hasher = FramedHasher::new();
    hasher.field("manifest", manifest);
    match lock {
        Some(bytes) => hasher.field("lock", bytes),
        None => hasher.field("lock-absent", &[]),
    };
    hasher.finish()
}
