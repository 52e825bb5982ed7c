//! TOML Lockfile Repository
//!
//! Decodes and encodes the lock artifact (`stager.lock`).

use serde::{Deserialize, Serialize};

use crate::domain::entities::{LockedPackage, Lockfile};
use crate::domain::value_objects::{ContentHash, PackageName, Version};
use crate::error::LockMismatchReason;

/// TOML representation of the manifest snapshot recorded at resolve time
#[derive(Debug, Clone, Serialize, Deserialize)]
struct TomlLockManifest {
    project: String,
    #[serde(default)]
    requires: Vec<String>,
    #[serde(default)]
    dev: Vec<String>,
}

/// TOML representation of one pinned package
#[derive(Debug, Clone, Serialize, Deserialize)]
struct TomlLockedPackage {
    name: String,
    version: String,
    hash: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    dependencies: Vec<String>,
}

/// TOML representation of the lock artifact
#[derive(Debug, Clone, Serialize, Deserialize)]
struct TomlLockfile {
    version: u32,
    manifest: TomlLockManifest,
    #[serde(default, rename = "package")]
    packages: Vec<TomlLockedPackage>,
}

/// Only the format version, read before committing to the full shape.
#[derive(Debug, Deserialize)]
struct VersionProbe {
    version: u32,
}

fn malformed(message: impl Into<String>) -> LockMismatchReason {
    LockMismatchReason::MalformedLock {
        message: message.into(),
    }
}

fn parse_hash(package: &str, raw: &str) -> Result<ContentHash, LockMismatchReason> {
    let hex = raw.strip_prefix(ContentHash::PREFIX).ok_or_else(|| {
        malformed(format!(
            "package '{}' hash must start with '{}'",
            package,
            ContentHash::PREFIX
        ))
    })?;
    if hex.len() != 64 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(malformed(format!(
            "package '{}' hash is not a sha256 digest",
            package
        )));
    }
    Ok(ContentHash::new(&hex.to_ascii_lowercase()))
}

/// Decode a lock artifact.
///
/// Structural problems are `MalformedLock`; an unknown format version is
/// reported as `UnsupportedVersion` before the rest is decoded.
pub fn parse_lockfile(content: &str) -> Result<Lockfile, LockMismatchReason> {
    let probe: VersionProbe = toml::from_str(content).map_err(|e| malformed(e.to_string()))?;
    if probe.version != Lockfile::FORMAT_VERSION {
        return Err(LockMismatchReason::UnsupportedVersion {
            found: probe.version,
            expected: Lockfile::FORMAT_VERSION,
        });
    }

    let toml_lock: TomlLockfile = toml::from_str(content).map_err(|e| malformed(e.to_string()))?;

    let project = PackageName::new(&toml_lock.manifest.project)
        .map_err(|e| malformed(format!("manifest.project: {}", e)))?;

    let mut lock = Lockfile::new(project)
        .with_version(toml_lock.version)
        .with_recorded(toml_lock.manifest.requires, toml_lock.manifest.dev);

    for entry in toml_lock.packages {
        let name = PackageName::new(&entry.name).map_err(|e| malformed(e.to_string()))?;
        let version: Version = entry
            .version
            .parse()
            .map_err(|e: crate::domain::value_objects::VersionParseError| {
                malformed(format!("package '{}': {}", name, e))
            })?;
        let hash = parse_hash(name.as_str(), &entry.hash)?;
        let dependencies = entry
            .dependencies
            .iter()
            .map(|d| PackageName::new(d))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| malformed(format!("package '{}': {}", name, e)))?;

        lock = lock.with_package(
            LockedPackage::new(name, entry.version.trim(), version, hash)
                .with_dependencies(dependencies),
        );
    }

    Ok(lock)
}

/// Encode a lock artifact. Packages are written in name order.
pub fn render_lockfile(lock: &Lockfile) -> Result<String, toml::ser::Error> {
    let mut packages: Vec<TomlLockedPackage> = lock
        .packages()
        .iter()
        .map(|p| TomlLockedPackage {
            name: p.name().to_string(),
            version: p.raw_version().to_string(),
            hash: p.hash().to_string(),
            dependencies: p.dependencies().iter().map(|d| d.to_string()).collect(),
        })
        .collect();
    packages.sort_by(|a, b| a.name.cmp(&b.name));

    let toml_lock = TomlLockfile {
        version: lock.version(),
        manifest: TomlLockManifest {
            project: lock.project().to_string(),
            requires: lock.recorded_requires().to_vec(),
            dev: lock.recorded_dev().to_vec(),
        },
        packages,
    };
    toml::to_string_pretty(&toml_lock)
}
