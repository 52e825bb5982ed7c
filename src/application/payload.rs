//! Application Payload Installer
//!
//! Copies the build context into `<workspace>/app` and installs it as the
//! project package on top of the synchronized dependencies. Installation may
//! only add the project: every dependency record must survive unchanged, and
//! the environment minus the project's files must keep the fingerprint the
//! dependency stage reported.

use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info};

use crate::domain::entities::{InstallKind, InstallRecord, InstalledSet, Manifest};
use crate::domain::ports::{BytecodeCompiler, PipelineEvent, PipelineEventSink};
use crate::domain::services::dependency_key;
use crate::domain::value_objects::{ContentHash, LinkMode, Version};
use crate::error::{LockMismatchReason, StagerError, StagerResult};
use crate::infrastructure::fs::{
    fingerprint_excluding, materialize_tree, remove_tree, tree_hash, ContextIgnore, TreeFilter,
    IGNORE_FILE, RESERVED_DIR,
};
use crate::infrastructure::repositories::{parse_manifest, InstallRecordStore, Workspace};

use super::snapshot::{read_optional, ManifestSnapshot};
use super::sync::SyncOutcome;

/// Result of the payload stage.
#[derive(Debug, Clone)]
pub struct PayloadOutcome {
    pub project: String,
    pub version: String,
    pub payload_key: ContentHash,
    pub file_count: usize,
    /// Every record in the environment, project included
    pub installed: InstalledSet,
}

/// Key for the application payload (second cache partition).
///
/// Tree hash of the build context minus `.stagerignore` matches and `.stager/`.
pub fn payload_key(context: &Path) -> StagerResult<ContentHash> {
    let ignore = ContextIgnore::load(context)?;
    tree_hash(context, &TreeFilter::Context(&ignore))
}

pub struct PayloadInstaller {
    workspace: Workspace,
    compiler: Option<Arc<dyn BytecodeCompiler>>,
    events: Arc<dyn PipelineEventSink>,
}

impl PayloadInstaller {
    pub fn new(workspace: Workspace, events: Arc<dyn PipelineEventSink>) -> Self {
        Self {
            workspace,
            compiler: None,
            events,
        }
    }

    pub fn with_compiler(mut self, compiler: Arc<dyn BytecodeCompiler>) -> Self {
        self.compiler = Some(compiler);
        self
    }

    pub fn install(
        &self,
        context: &Path,
        snapshot: &ManifestSnapshot,
        deps: &SyncOutcome,
    ) -> StagerResult<PayloadOutcome> {
        self.check_workspace_placement(context)?;

        let ignore = ContextIgnore::load(context)?;
        check_snapshot_files_included(context, snapshot, &ignore)?;
        let filter = TreeFilter::Context(&ignore);
        let payload_key = tree_hash(context, &filter)?;

        let app = self.workspace.app_dir();
        remove_tree(&app)?;
        let file_count = materialize_tree(context, &app, LinkMode::Copy, &filter)?;
        debug!(files = file_count, app = %app.display(), "build context copied");

        let manifest = self.copied_manifest(context, snapshot, deps)?;
        let project = manifest.project().to_string();
        let version = validate_project(&manifest, &app)?;

        if deps.installed.get(manifest.project()).is_some() {
            return Err(StagerError::payload(
                &project,
                "project name collides with a locked dependency",
            ));
        }

        let pth = self.write_path_file(&manifest, &app)?;
        let records = self.workspace.records();
        records.write(&InstallRecord {
            name: project.clone(),
            version: version.clone(),
            kind: InstallKind::Project,
            hash: payload_key.to_string(),
            files: vec![pth.clone()],
        })?;

        let installed = records.read_all()?;
        check_superset(&project, &deps.installed, &installed)?;

        let project_files = [
            PathBuf::from(&pth),
            InstallRecordStore::record_rel(manifest.project()),
        ];
        let remaining = fingerprint_excluding(&self.workspace.env_dir(), &project_files)?;
        if remaining != deps.fingerprint {
            return Err(StagerError::payload(
                &project,
                format!(
                    "dependency environment changed during installation: fingerprint {} is now {}",
                    deps.fingerprint.short(),
                    remaining.short()
                ),
            ));
        }

        if let Some(compiler) = &self.compiler {
            compiler.compile(&app)?;
            self.events.on_event(PipelineEvent::Compiled { path: app.clone() });
        }

        info!(%project, %version, payload_key = %payload_key.short(), files = file_count, "application installed");
        Ok(PayloadOutcome {
            project,
            version,
            payload_key,
            file_count,
            installed,
        })
    }

    /// A workspace inside the context would copy itself, unless it lives under `.stager/`.
    fn check_workspace_placement(&self, context: &Path) -> StagerResult<()> {
        match self.workspace.root().strip_prefix(context) {
            Ok(rel) if !starts_with_reserved(rel) => Err(StagerError::payload(
                context.display().to_string(),
                format!(
                    "workspace {} lies inside the build context; move it or place it under {}/",
                    self.workspace.root().display(),
                    RESERVED_DIR
                ),
            )),
            _ => Ok(()),
        }
    }

    /// Re-read the manifest and lock from the copy and check they still
    /// hash to the key the dependencies were synced from.
    fn copied_manifest(
        &self,
        context: &Path,
        snapshot: &ManifestSnapshot,
        deps: &SyncOutcome,
    ) -> StagerResult<Manifest> {
        let app = self.workspace.app_dir();
        let manifest_path = copied_path(context, &app, snapshot.manifest_path());
        let lock_path = copied_path(context, &app, snapshot.lock_path());

        let manifest_bytes = read_optional(&manifest_path)?.ok_or_else(|| {
            StagerError::ManifestNotFound {
                path: manifest_path.clone(),
            }
        })?;
        let lock_bytes = read_optional(&lock_path)?;

        let found = dependency_key(&manifest_bytes, lock_bytes.as_deref());
        if found != deps.dependency_key {
            return Err(StagerError::lock_mismatch(LockMismatchReason::SnapshotDrift {
                expected: deps.dependency_key.to_string(),
                found: found.to_string(),
            }));
        }

        std::str::from_utf8(&manifest_bytes)
            .map_err(|e| LockMismatchReason::MalformedManifest {
                message: e.to_string(),
            })
            .and_then(parse_manifest)
            .map_err(StagerError::lock_mismatch)
    }

    /// Put the app copy on the import path. Returns the env-relative file.
    fn write_path_file(&self, manifest: &Manifest, app: &Path) -> StagerResult<String> {
        let site = self.workspace.site_packages();
        fs::create_dir_all(&site)?;
        let file_name = format!("{}.pth", manifest.project().as_str().replace('-', "_"));
        fs::write(site.join(&file_name), format!("{}\n", app.display()))?;
        Ok(format!("site-packages/{}", file_name))
    }
}

/// The copy must carry the manifest and lock the dependencies were synced from.
fn check_snapshot_files_included(
    context: &Path,
    snapshot: &ManifestSnapshot,
    ignore: &ContextIgnore,
) -> StagerResult<()> {
    for path in [snapshot.manifest_path(), snapshot.lock_path()] {
        let Ok(rel) = path.strip_prefix(context) else {
            continue;
        };
        if ignore.is_ignored(rel, false) {
            return Err(StagerError::payload(
                context.display().to_string(),
                format!(
                    "'{}' is excluded from the build context; remove it from {}",
                    rel.display(),
                    IGNORE_FILE
                ),
            ));
        }
    }
    Ok(())
}

fn starts_with_reserved(rel: &Path) -> bool {
    rel.components()
        .next()
        .is_some_and(|c| c.as_os_str() == RESERVED_DIR)
}

/// Where `original` ended up after copying `context` into `app`.
fn copied_path(context: &Path, app: &Path, original: &Path) -> PathBuf {
    original
        .strip_prefix(context)
        .map(|rel| app.join(rel))
        .unwrap_or_else(|_| original.to_path_buf())
}

/// Validate the project metadata and declared import roots. Returns the version.
fn validate_project(manifest: &Manifest, app: &Path) -> StagerResult<String> {
    let project = manifest.project().as_str();
    let raw = manifest.version().trim();
    if raw.is_empty() {
        return Err(StagerError::payload(project, "project.version is not declared"));
    }
    let version: Version = raw
        .parse()
        .map_err(|e: crate::domain::value_objects::VersionParseError| {
            StagerError::payload(project, e.to_string())
        })?;

    for package in manifest.packages() {
        let escapes = package
            .components()
            .any(|c| !matches!(c, Component::Normal(_)));
        if escapes || package.as_os_str().is_empty() {
            return Err(StagerError::payload(
                project,
                format!("package root '{}' must be a relative path inside the context", package.display()),
            ));
        }
        if !app.join(package).is_dir() {
            return Err(StagerError::payload(
                project,
                format!("declared package root '{}' does not exist", package.display()),
            ));
        }
    }

    Ok(version.to_string())
}

/// Only the project may be added; no dependency record may change or vanish.
fn check_superset(
    project: &str,
    before: &InstalledSet,
    after: &InstalledSet,
) -> StagerResult<()> {
    let lost = after.lost_since(before);
    if !lost.is_empty() {
        return Err(StagerError::payload(
            project,
            format!("installing the application altered dependencies: {}", lost.join(", ")),
        ));
    }

    let unexpected: Vec<String> = after
        .names()
        .filter(|name| before.get(name).is_none() && name.as_str() != project)
        .map(|name| name.to_string())
        .collect();
    if !unexpected.is_empty() {
        return Err(StagerError::payload(
            project,
            format!("unexpected packages in environment: {}", unexpected.join(", ")),
        ));
    }
    Ok(())
}
