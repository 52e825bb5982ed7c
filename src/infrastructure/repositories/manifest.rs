//! TOML Manifest Repository
//!
//! Decodes the dependency manifest (`pyproject.toml`).

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Deserialize;

use crate::domain::entities::Manifest;
use crate::domain::value_objects::{PackageName, Requirement};
use crate::error::LockMismatchReason;

#[derive(Debug, Deserialize)]
struct TomlProject {
    name: String,
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    dependencies: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
struct TomlStagerTool {
    #[serde(default)]
    packages: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
struct TomlTool {
    #[serde(default)]
    stager: TomlStagerTool,
}

/// Only the sections stager reads; everything else in the file is ignored.
#[derive(Debug, Deserialize)]
struct TomlManifest {
    project: Option<TomlProject>,
    #[serde(default, rename = "dependency-groups")]
    dependency_groups: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    tool: TomlTool,
}

fn malformed(message: impl Into<String>) -> LockMismatchReason {
    LockMismatchReason::MalformedManifest {
        message: message.into(),
    }
}

fn parse_requirements(section: &str, raw: &[String]) -> Result<Vec<Requirement>, LockMismatchReason> {
    raw.iter()
        .map(|s| {
            s.parse::<Requirement>()
                .map_err(|e| malformed(format!("{}: {}", section, e)))
        })
        .collect()
}

/// Decode a manifest.
pub fn parse_manifest(content: &str) -> Result<Manifest, LockMismatchReason> {
    let toml_manifest: TomlManifest =
        toml::from_str(content).map_err(|e| malformed(e.to_string()))?;
    let project = toml_manifest
        .project
        .ok_or_else(|| malformed("missing [project] table"))?;
    let name = PackageName::new(&project.name).map_err(|e| malformed(format!("project.name: {}", e)))?;

    let dependencies = parse_requirements("project.dependencies", &project.dependencies)?;
    let mut manifest = Manifest::new(name, project.version.unwrap_or_default())
        .with_dependencies(dependencies)
        .with_packages(
            toml_manifest
                .tool
                .stager
                .packages
                .into_iter()
                .map(PathBuf::from)
                .collect(),
        );

    for (group, raw) in toml_manifest.dependency_groups {
        let requirements = parse_requirements(&format!("dependency-groups.{}", group), &raw)?;
        manifest = manifest.with_dev_group(group, requirements);
    }

    Ok(manifest)
}
