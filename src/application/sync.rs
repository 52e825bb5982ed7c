//! Environment Synchronizer
//!
//! Verifies the lock fail-closed, then materializes exactly the locked,
//! non-dev dependency set into the workspace environment. The application
//! itself is never installed here.
//!
//! Dependency environments are cached under `<cache>/deps/<key>/`. A miss is
//! built in a temporary directory and renamed into place, so a failed build
//! never leaves a cache entry behind.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info};

use crate::domain::entities::{InstallKind, InstallRecord, InstalledSet, LockedPackage};
use crate::domain::ports::{BytecodeCompiler, PipelineEvent, PipelineEventSink, SyncStatus};
use crate::domain::services::{InstallPlan, LockVerifier};
use crate::domain::value_objects::{ContentHash, LinkMode};
use crate::error::{StagerError, StagerResult};
use crate::infrastructure::fs::{
    fingerprint, materialize_tree, normalize_rel, place_file, remove_tree, walk, EntryKind,
    TreeFilter,
};
use crate::infrastructure::repositories::{
    InstallRecordStore, PackageStore, Workspace, WorkspaceState, RECORDS_DIR,
};

use super::snapshot::ManifestSnapshot;

/// Result of the dependency stage.
#[derive(Debug, Clone)]
pub struct SyncOutcome {
    pub dependency_key: ContentHash,
    /// Environment fingerprint, bytecode caches excluded
    pub fingerprint: ContentHash,
    pub status: SyncStatus,
    pub packages: Vec<LockedPackage>,
    /// Dependency records present after the stage
    pub installed: InstalledSet,
}

pub struct EnvironmentSynchronizer {
    store: PackageStore,
    cache_root: PathBuf,
    workspace: Workspace,
    link_mode: LinkMode,
    compiler: Option<Arc<dyn BytecodeCompiler>>,
    events: Arc<dyn PipelineEventSink>,
}

impl EnvironmentSynchronizer {
    pub fn new(
        store: PackageStore,
        cache_root: impl Into<PathBuf>,
        workspace: Workspace,
        events: Arc<dyn PipelineEventSink>,
    ) -> Self {
        Self {
            store,
            cache_root: cache_root.into(),
            workspace,
            link_mode: LinkMode::default(),
            compiler: None,
            events,
        }
    }

    pub fn with_link_mode(mut self, mode: LinkMode) -> Self {
        self.link_mode = mode;
        self
    }

    /// Compile bytecode after materializing the environment.
    pub fn with_compiler(mut self, compiler: Arc<dyn BytecodeCompiler>) -> Self {
        self.compiler = Some(compiler);
        self
    }

    pub fn cache_entry(&self, key: &ContentHash) -> PathBuf {
        self.cache_root.join("deps").join(key.hex())
    }

    /// Run the stage. `previous` is the workspace state before this build.
    pub fn sync(
        &self,
        snapshot: &ManifestSnapshot,
        previous: Option<&WorkspaceState>,
    ) -> StagerResult<SyncOutcome> {
        let (manifest, lock) = snapshot.decode().map_err(StagerError::lock_mismatch)?;
        let plan = LockVerifier::new()
            .verify(&manifest, &lock)
            .map_err(StagerError::lock_mismatch)?;
        let key = snapshot.dependency_key().clone();
        debug!(project = %manifest.project(), packages = plan.len(), "lock verified");

        let env = self.workspace.env_dir();
        let records = self.workspace.records();

        if previous.is_some_and(|s| s.has_dependencies_for(key.as_str())) {
            let installed = dependency_records(&records)?;
            if matches_plan(&installed, &plan) {
                info!(dependency_key = %key.short(), "dependencies up to date");
                strip_payload(&env, &records)?;
                self.compile_site()?;
                return Ok(SyncOutcome {
                    fingerprint: fingerprint(&env)?,
                    dependency_key: key,
                    status: SyncStatus::UpToDate,
                    packages: plan.packages().to_vec(),
                    installed,
                });
            }
            debug!("workspace records drifted from the lock, re-materializing");
        }

        let entry = self.cache_entry(&key);
        let status = if entry.is_dir() {
            info!(dependency_key = %key.short(), "dependency cache hit");
            SyncStatus::CacheHit
        } else {
            self.build_entry(&plan, &entry)?;
            SyncStatus::Built
        };

        remove_tree(&env)?;
        let files = materialize_tree(&entry, &env, self.link_mode, &TreeFilter::All)?;
        debug!(files, mode = %self.link_mode, env = %env.display(), "environment materialized");
        self.compile_site()?;

        Ok(SyncOutcome {
            fingerprint: fingerprint(&env)?,
            dependency_key: key,
            status,
            packages: plan.packages().to_vec(),
            installed: dependency_records(&records)?,
        })
    }

    /// Compile `site-packages` when a compiler is configured. Already compiled
    /// files are recompiled, which leaves the fingerprint untouched.
    fn compile_site(&self) -> StagerResult<()> {
        let Some(compiler) = &self.compiler else {
            return Ok(());
        };
        let site = self.workspace.site_packages();
        if site.is_dir() {
            compiler.compile(&site)?;
            self.events.on_event(PipelineEvent::Compiled { path: site });
        }
        Ok(())
    }

    /// Install every planned package into a fresh cache entry at `entry`.
    fn build_entry(&self, plan: &InstallPlan, entry: &Path) -> StagerResult<()> {
        let parent = entry
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.cache_root.clone());
        fs::create_dir_all(&parent)?;

        let staging = tempfile::Builder::new()
            .prefix(".build-")
            .tempdir_in(&parent)?;
        info!(packages = plan.len(), "building dependency environment");

        let records = InstallRecordStore::new(staging.path());
        let mut owners: BTreeMap<String, String> = BTreeMap::new();
        fs::create_dir_all(staging.path().join("bin"))?;
        fs::create_dir_all(staging.path().join("site-packages"))?;
        fs::create_dir_all(staging.path().join(RECORDS_DIR))?;

        for package in plan.packages() {
            let artifact = self.store.fetch(package)?;
            let files = install_artifact(&artifact, staging.path(), package, &mut owners)?;
            records.write(&InstallRecord {
                name: package.name().to_string(),
                version: package.raw_version().to_string(),
                kind: InstallKind::Dependency,
                hash: package.hash().to_string(),
                files,
            })?;

            if self.events.wants_detailed_events() {
                self.events.on_event(PipelineEvent::PackageInstalled {
                    name: package.name().to_string(),
                    version: package.raw_version().to_string(),
                });
            }
        }

        // Dropping `staging` afterwards is harmless: the directory is gone.
        match fs::rename(staging.path(), entry) {
            Ok(()) => Ok(()),
            // A concurrent build finished the same key first
            Err(_) if entry.is_dir() => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

/// Copy one artifact into `env_root`. Top-level `bin/` goes to `bin/`,
/// everything else under `site-packages/`. Returns the sorted file list.
fn install_artifact(
    artifact: &Path,
    env_root: &Path,
    package: &LockedPackage,
    owners: &mut BTreeMap<String, String>,
) -> StagerResult<Vec<String>> {
    let mut files = Vec::new();
    for entry in walk(artifact, &TreeFilter::All)? {
        if entry.kind == EntryKind::Dir {
            continue;
        }
        let rel = normalize_rel(&entry.rel);
        let dest = match rel.strip_prefix("bin/") {
            Some(exe) => format!("bin/{}", exe),
            None => format!("site-packages/{}", rel),
        };

        if let Some(first) = owners.get(&dest) {
            return Err(StagerError::FileConflict {
                path: PathBuf::from(&dest),
                first: first.clone(),
                second: package.name().to_string(),
            });
        }
        owners.insert(dest.clone(), package.name().to_string());

        place_file(&artifact.join(&entry.rel), &env_root.join(&dest), LinkMode::Copy)?;
        files.push(dest);
    }
    files.sort();
    Ok(files)
}

fn dependency_records(records: &InstallRecordStore) -> StagerResult<InstalledSet> {
    let mut set = InstalledSet::new();
    for (name, record) in records.read_all()?.dependencies() {
        set.insert(name.clone(), record.clone());
    }
    Ok(set)
}

/// Drop what a previous payload install added, leaving the dependency-only env.
fn strip_payload(env: &Path, records: &InstallRecordStore) -> StagerResult<()> {
    let installed = records.read_all()?;
    if let Some((name, record)) = installed.project() {
        for file in &record.files {
            match fs::remove_file(env.join(file)) {
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
                other => other?,
            }
        }
        records.remove(name)?;
    }
    Ok(())
}

fn matches_plan(installed: &InstalledSet, plan: &InstallPlan) -> bool {
    installed.len() == plan.len()
        && plan.packages().iter().all(|p| {
            installed.get(p.name()).is_some_and(|r| {
                r.version == p.raw_version() && p.hash().matches_str(&r.hash)
            })
        })
}
