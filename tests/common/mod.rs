//! Common test utilities for stager contract and scenario tests.
//!
//! This module provides:
//! - `TestEnv`: isolated build context, package store and cache
//! - Fixtures: reusable package and manifest content

#![allow(dead_code)]


pub use env::*;
pub use fixtures::*;
