//! Domain Services
//!
//! Pure business logic services that operate on domain entities.
//! These services have no I/O dependencies and are easily testable.

mod cache_keys;
mod lock_verifier;

pub use cache_keys::dependency_key;
pub use lock_verifier::{InstallPlan, LockVerifier};
