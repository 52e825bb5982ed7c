//! Environment entities - what a synchronized environment has installed

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::value_objects::PackageName;

/// Whether an install record belongs to a locked dependency or the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstallKind {
    Dependency,
    Project,
}

/// Record written to `<env>/installed/<name>.toml` for every installed package.
///
/// Contains no timestamps so identical inputs produce identical bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallRecord {
    pub name: String,
    pub version: String,
    pub kind: InstallKind,
    /// Artifact hash for dependencies, payload key for the project
    pub hash: String,
    /// Environment-relative paths, forward slashes, sorted
    #[serde(default)]
    pub files: Vec<String>,
}

/// The set of packages present in an environment, keyed by normalized name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstalledSet {
    records: BTreeMap<PackageName, InstallRecord>,
}

impl InstalledSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: PackageName, record: InstallRecord) {
        self.records.insert(name, record);
    }

    pub fn get(&self, name: &PackageName) -> Option<&InstallRecord> {
        self.records.get(name)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &PackageName> {
        self.records.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PackageName, &InstallRecord)> {
        self.records.iter()
    }

    pub fn dependencies(&self) -> impl Iterator<Item = (&PackageName, &InstallRecord)> {
        self.records
            .iter()
            .filter(|(_, r)| r.kind == InstallKind::Dependency)
    }

    pub fn project(&self) -> Option<(&PackageName, &InstallRecord)> {
        self.records
            .iter()
            .find(|(_, r)| r.kind == InstallKind::Project)
    }

    /// Names of records in `earlier` that are missing or altered in `self`.
    ///
    /// An empty result means `self` is a superset of `earlier`.
    pub fn lost_since(&self, earlier: &InstalledSet) -> Vec<String> {
        earlier
            .records
            .iter()
            .filter(|(name, record)| self.records.get(*name) != Some(*record))
            .map(|(name, _)| name.to_string())
            .collect()
    }
}
