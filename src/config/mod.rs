//! Configuration module for stager
//!
//! Configuration hierarchy:
//! 1. CLI flags (highest priority)
//! 2. Environment variables (STAGER_*)
//! 3. Context config (`<context>/stager.toml`)
//! 4. Built-in defaults (lowest priority)

mod env_validator;
mod loader;
mod types;

pub use env_validator::{levenshtein, EnvVarValidator};
pub use loader::{
    load_for_context, load_with_warnings, with_env_overrides, with_overrides_from, ConfigWarning,
};
pub use types::{BuildConfig, BuildPaths, Config, ServiceConfig, CONFIG_FILE};
