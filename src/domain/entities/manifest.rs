//! Manifest entity - the human-authored dependency declaration
//!
//! A pure data structure. Parsing from TOML lives in the manifest repository.

use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::domain::value_objects::{PackageName, Requirement};

/// Parsed dependency manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    project: PackageName,
    version: String,
    dependencies: Vec<Requirement>,
    dev_groups: BTreeMap<String, Vec<Requirement>>,
    packages: Vec<PathBuf>,
}

impl Manifest {
    pub fn new(project: PackageName, version: impl Into<String>) -> Self {
        Self {
            project,
            version: version.into(),
            dependencies: Vec::new(),
            dev_groups: BTreeMap::new(),
            packages: Vec::new(),
        }
    }

    pub fn with_dependencies(mut self, dependencies: Vec<Requirement>) -> Self {
        self.dependencies = dependencies;
        self
    }

    pub fn with_dev_group(mut self, group: impl Into<String>, requirements: Vec<Requirement>) -> Self {
        self.dev_groups.insert(group.into(), requirements);
        self
    }

    pub fn with_packages(mut self, packages: Vec<PathBuf>) -> Self {
        self.packages = packages;
        self
    }

    pub fn project(&self) -> &PackageName {
        &self.project
    }

    /// Raw version string as declared; validated at payload install time.
    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn dependencies(&self) -> &[Requirement] {
        &self.dependencies
    }

    pub fn dev_groups(&self) -> &BTreeMap<String, Vec<Requirement>> {
        &self.dev_groups
    }

    /// Import roots that must exist in the build context for the project to install.
    pub fn packages(&self) -> &[PathBuf] {
        &self.packages
    }

    /// Requirements from every development-only group.
    pub fn dev_requirements(&self) -> impl Iterator<Item = &Requirement> {
        self.dev_groups.values().flatten()
    }

    /// Canonical, sorted rendering of the main requirements (staleness comparison).
    pub fn canonical_requires(&self) -> Vec<String> {
        canonicalize(self.dependencies.iter())
    }

    /// Canonical, sorted rendering of all dev requirements.
    pub fn canonical_dev(&self) -> Vec<String> {
        canonicalize(self.dev_requirements())
    }
}

pub(crate) fn canonicalize<'a>(reqs: impl Iterator<Item = &'a Requirement>) -> Vec<String> {
    let mut out: Vec<String> = reqs.map(|r| r.to_string()).collect();
    out.sort();
    out.dedup();
    out
}
