//! Lock verification service
//!
//! Checks a lock against its manifest without ever re-resolving, and derives
//! the install set. Pure logic; no I/O.
//!
//! Detection rule for a lock generated from a different manifest:
//! the recorded requirement lists must equal the manifest's declarations
//! exactly, and every constraint is re-verified against the locked versions.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use similar::TextDiff;

use crate::domain::entities::{canonicalize, LockedPackage, Lockfile, Manifest};
use crate::domain::value_objects::{PackageName, Requirement};
use crate::error::LockMismatchReason;

/// Packages to materialize, ordered by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallPlan {
    packages: Vec<LockedPackage>,
}

impl InstallPlan {
    pub fn packages(&self) -> &[LockedPackage] {
        &self.packages
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    pub fn contains(&self, name: &PackageName) -> bool {
        self.packages.iter().any(|p| p.name() == name)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LockVerifier;

impl LockVerifier {
    pub fn new() -> Self {
        Self
    }

    /// Verify `lock` against `manifest` and compute the non-dev install set.
    pub fn verify(
        &self,
        manifest: &Manifest,
        lock: &Lockfile,
    ) -> Result<InstallPlan, LockMismatchReason> {
        if lock.version() != Lockfile::FORMAT_VERSION {
            return Err(LockMismatchReason::UnsupportedVersion {
                found: lock.version(),
                expected: Lockfile::FORMAT_VERSION,
            });
        }

        if lock.project() != manifest.project() {
            return Err(LockMismatchReason::ProjectMismatch {
                locked: lock.project().to_string(),
                declared: manifest.project().to_string(),
            });
        }

        let mut seen = BTreeSet::new();
        for package in lock.packages() {
            if !seen.insert(package.name()) {
                return Err(LockMismatchReason::DuplicatePackage {
                    name: package.name().to_string(),
                });
            }
        }

        check_recorded("requires", lock.recorded_requires(), &manifest.canonical_requires())?;
        check_recorded("dev", lock.recorded_dev(), &manifest.canonical_dev())?;

        let by_name = lock.by_name();
        for requirement in manifest
            .dependencies()
            .iter()
            .chain(manifest.dev_requirements())
        {
            check_satisfied(requirement, &by_name)?;
        }

        for package in lock.packages() {
            for dependency in package.dependencies() {
                if !by_name.contains_key(dependency) {
                    return Err(LockMismatchReason::DanglingDependency {
                        package: package.name().to_string(),
                        dependency: dependency.to_string(),
                    });
                }
            }
        }

        Ok(InstallPlan {
            packages: reachable(manifest, &by_name),
        })
    }
}

fn check_recorded(
    section: &str,
    recorded: &[String],
    declared: &[String],
) -> Result<(), LockMismatchReason> {
    let parsed = recorded
        .iter()
        .map(|s| s.parse::<Requirement>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| LockMismatchReason::MalformedLock {
            message: format!("manifest.{}: {}", section, e),
        })?;
    let recorded = canonicalize(parsed.iter());
    if recorded == declared {
        return Ok(());
    }

    let old = lines(&recorded);
    let new = lines(declared);
    let diff = TextDiff::from_lines(&old, &new)
        .unified_diff()
        .header(
            &format!("lock/{}", section),
            &format!("manifest/{}", section),
        )
        .to_string();
    Err(LockMismatchReason::Stale { diff })
}

fn lines(items: &[String]) -> String {
    items.iter().map(|s| format!("{}\n", s)).collect()
}

fn check_satisfied(
    requirement: &Requirement,
    by_name: &BTreeMap<&PackageName, &LockedPackage>,
) -> Result<(), LockMismatchReason> {
    match by_name.get(requirement.name()) {
        None => Err(LockMismatchReason::Unsatisfied {
            requirement: requirement.to_string(),
            locked: None,
        }),
        Some(package) if !requirement.is_satisfied_by(package.version()) => {
            Err(LockMismatchReason::Unsatisfied {
                requirement: requirement.to_string(),
                locked: Some(package.raw_version().to_string()),
            })
        }
        Some(_) => Ok(()),
    }
}

/// Packages reachable from the main dependencies. Dev roots and the project
/// itself are never entered.
fn reachable(
    manifest: &Manifest,
    by_name: &BTreeMap<&PackageName, &LockedPackage>,
) -> Vec<LockedPackage> {
    let mut visited: BTreeMap<&PackageName, &LockedPackage> = BTreeMap::new();
    let mut queue: VecDeque<&PackageName> =
        manifest.dependencies().iter().map(|r| r.name()).collect();

    while let Some(name) = queue.pop_front() {
        if name == manifest.project() || visited.contains_key(name) {
            continue;
        }
        if let Some(&package) = by_name.get(name) {
            visited.insert(name, package);
            queue.extend(package.dependencies());
        }
    }

    visited.into_values().cloned().collect()
}
