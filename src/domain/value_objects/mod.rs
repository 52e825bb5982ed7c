//! Domain Value Objects
//!
//! Immutable value types that represent domain concepts.

mod hash;
mod link_mode;
mod requirement;
mod stage;
mod version;

pub use hash::{ContentHash, FramedHasher};
pub use link_mode::LinkMode;
pub use requirement::{Operator, PackageName, Requirement, RequirementError, Specifier};
pub use stage::{Stage, StageTracker};
pub use version::{PreKind, Version, VersionParseError};
