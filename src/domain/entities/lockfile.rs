//! Lockfile entity - the fully pinned dependency graph
//!
//! A pure data structure. I/O and TOML decoding are handled by the lockfile
//! repository; consistency with the manifest is checked by the lock verifier.

use std::collections::BTreeMap;

use crate::domain::value_objects::{ContentHash, PackageName, Version};

/// One pinned package in the lock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockedPackage {
    name: PackageName,
    version: Version,
    raw_version: String,
    hash: ContentHash,
    dependencies: Vec<PackageName>,
}

impl LockedPackage {
    pub fn new(
        name: PackageName,
        raw_version: impl Into<String>,
        version: Version,
        hash: ContentHash,
    ) -> Self {
        Self {
            name,
            version,
            raw_version: raw_version.into(),
            hash,
            dependencies: Vec::new(),
        }
    }

    pub fn with_dependencies(mut self, dependencies: Vec<PackageName>) -> Self {
        self.dependencies = dependencies;
        self
    }

    pub fn name(&self) -> &PackageName {
        &self.name
    }

    pub fn version(&self) -> &Version {
        &self.version
    }

    /// Version exactly as written in the lock; used for store paths.
    pub fn raw_version(&self) -> &str {
        &self.raw_version
    }

    pub fn hash(&self) -> &ContentHash {
        &self.hash
    }

    pub fn dependencies(&self) -> &[PackageName] {
        &self.dependencies
    }
}

/// Parsed lock artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lockfile {
    version: u32,
    project: PackageName,
    requires: Vec<String>,
    dev: Vec<String>,
    packages: Vec<LockedPackage>,
}

impl Lockfile {
    /// Lock format version understood by this build.
    pub const FORMAT_VERSION: u32 = 1;

    pub fn new(project: PackageName) -> Self {
        Self {
            version: Self::FORMAT_VERSION,
            project,
            requires: Vec::new(),
            dev: Vec::new(),
            packages: Vec::new(),
        }
    }

    pub fn with_version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    /// Requirement strings recorded when the lock was resolved.
    pub fn with_recorded(mut self, requires: Vec<String>, dev: Vec<String>) -> Self {
        self.requires = requires;
        self.dev = dev;
        self
    }

    pub fn with_package(mut self, package: LockedPackage) -> Self {
        self.packages.push(package);
        self
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn project(&self) -> &PackageName {
        &self.project
    }

    pub fn recorded_requires(&self) -> &[String] {
        &self.requires
    }

    pub fn recorded_dev(&self) -> &[String] {
        &self.dev
    }

    pub fn packages(&self) -> &[LockedPackage] {
        &self.packages
    }

    /// Index packages by name. Later duplicates shadow earlier ones; the
    /// verifier rejects duplicates before this matters.
    pub fn by_name(&self) -> BTreeMap<&PackageName, &LockedPackage> {
        self.packages.iter().map(|p| (p.name(), p)).collect()
    }

    pub fn get(&self, name: &PackageName) -> Option<&LockedPackage> {
        self.packages.iter().find(|p| p.name() == name)
    }
}
