//! Domain Layer
//!
//! Pure build logic without I/O dependencies.
//!
//! ## Structure
//!
//! - `entities/` - Manifest, Lockfile, InstalledSet
//! - `value_objects/` - Immutable value types (Version, Requirement, ContentHash, Stage)
//! - `services/` - Lock verification and cache key derivation
//! - `ports/` - Interface definitions for infrastructure (events, compiler, launcher)

pub mod entities;
pub mod ports;
pub mod services;
pub mod value_objects;
