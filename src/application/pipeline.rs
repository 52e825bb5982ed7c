//! Build Pipeline
//!
//! Drives the one-pass state machine
//! `Start → ManifestLoaded → DepsSynced → PayloadInstalled → RuntimeActivated → Serving`.
//! The first failure moves to `Failed` and nothing after it runs.

use std::ffi::OsString;
use std::sync::Arc;

use tracing::{info, warn};

use crate::config::{BuildPaths, Config};
use crate::domain::ports::{
    BytecodeCompiler, Launcher, NoopEventSink, PipelineEvent, PipelineEventSink, SyncStatus,
};
use crate::domain::value_objects::{ContentHash, Stage, StageTracker};
use crate::error::{StagerError, StagerResult};
use crate::infrastructure::process::ExternalCompiler;
use crate::infrastructure::repositories::{PackageStore, Workspace, WorkspaceState};

use super::activate::{activate, Activation};
use super::launch::{ServiceLauncher, ServiceSpec};
use super::payload::{payload_key, PayloadInstaller};
use super::snapshot::ManifestSnapshot;
use super::sync::EnvironmentSynchronizer;

/// Summary of a successful `build`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildReport {
    pub project: String,
    pub dependency_key: ContentHash,
    pub payload_key: ContentHash,
    pub fingerprint: ContentHash,
    pub sync_status: SyncStatus,
    pub package_count: usize,
    pub stages: Vec<Stage>,
}

/// Both cache keys for a build context, without building anything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheKeys {
    pub dependency_key: ContentHash,
    pub payload_key: ContentHash,
    pub lock_present: bool,
}

pub struct BuildPipeline {
    paths: BuildPaths,
    config: Config,
    workspace: Workspace,
    events: Arc<dyn PipelineEventSink>,
    compiler: Option<Arc<dyn BytecodeCompiler>>,
}

impl BuildPipeline {
    pub fn new(config: Config, paths: BuildPaths) -> Self {
        let compiler: Option<Arc<dyn BytecodeCompiler>> = if config.build.compile_bytecode {
            ExternalCompiler::from_argv(&config.build.compiler)
                .map(|c| Arc::new(c) as Arc<dyn BytecodeCompiler>)
        } else {
            None
        };
        Self {
            workspace: Workspace::new(&paths.workspace),
            paths,
            config,
            events: Arc::new(NoopEventSink),
            compiler,
        }
    }

    pub fn with_events(mut self, events: Arc<dyn PipelineEventSink>) -> Self {
        self.events = events;
        self
    }

    pub fn with_compiler(mut self, compiler: Arc<dyn BytecodeCompiler>) -> Self {
        self.compiler = Some(compiler);
        self
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn paths(&self) -> &BuildPaths {
        &self.paths
    }

    /// Compute the dependency and payload keys.
    pub fn keys(&self) -> StagerResult<CacheKeys> {
        let snapshot = ManifestSnapshot::load(&self.paths)?;
        Ok(CacheKeys {
            dependency_key: snapshot.dependency_key().clone(),
            payload_key: payload_key(&self.paths.context)?,
            lock_present: snapshot.has_lock(),
        })
    }

    /// Stages 1-3: snapshot, dependencies, payload. Persists `state.toml`.
    pub fn build(&self) -> StagerResult<BuildReport> {
        let _lock = self.workspace.lock()?;
        let state_repo = self.workspace.state();
        let previous = state_repo.load();
        let mut tracker = StageTracker::new();

        let result = self.build_stages(&mut tracker, previous.as_ref());
        if let Err(err) = &result {
            let attempted = tracker.current().next().unwrap_or(Stage::Failed);
            self.fail(&mut tracker, attempted, err);
            let mut failed = WorkspaceState::new(Stage::Failed);
            failed.dependency_key = previous.and_then(|p| p.dependency_key);
            if let Err(save_err) = state_repo.save(&failed) {
                warn!(error = %save_err, "could not record failed build state");
            }
        }
        result
    }

    fn build_stages(
        &self,
        tracker: &mut StageTracker,
        previous: Option<&WorkspaceState>,
    ) -> StagerResult<BuildReport> {
        let snapshot = ManifestSnapshot::load(&self.paths)?;
        self.enter(tracker, Stage::ManifestLoaded);
        self.events.on_event(PipelineEvent::SnapshotLoaded {
            dependency_key: snapshot.dependency_key().to_string(),
            lock_present: snapshot.has_lock(),
        });

        let mut synchronizer = EnvironmentSynchronizer::new(
            PackageStore::new(&self.paths.store),
            &self.paths.cache,
            self.workspace.clone(),
            Arc::clone(&self.events),
        )
        .with_link_mode(self.config.build.link_mode);
        if let Some(compiler) = &self.compiler {
            synchronizer = synchronizer.with_compiler(Arc::clone(compiler));
        }
        let deps = synchronizer.sync(&snapshot, previous)?;
        self.enter(tracker, Stage::DepsSynced);
        self.events.on_event(PipelineEvent::DependenciesSynced {
            dependency_key: deps.dependency_key.to_string(),
            status: deps.status,
            package_count: deps.packages.len(),
        });

        let mut state = WorkspaceState::new(Stage::DepsSynced);
        state.dependency_key = Some(deps.dependency_key.to_string());
        state.dependency_count = deps.packages.len();
        self.workspace.state().save(&state)?;

        let mut installer = PayloadInstaller::new(self.workspace.clone(), Arc::clone(&self.events));
        if let Some(compiler) = &self.compiler {
            installer = installer.with_compiler(Arc::clone(compiler));
        }
        let payload = installer.install(&self.paths.context, &snapshot, &deps)?;
        self.enter(tracker, Stage::PayloadInstalled);
        self.events.on_event(PipelineEvent::PayloadInstalled {
            project: payload.project.clone(),
            payload_key: payload.payload_key.to_string(),
            file_count: payload.file_count,
        });

        state.stage = Stage::PayloadInstalled;
        state.payload_key = Some(payload.payload_key.to_string());
        state.project = Some(payload.project.clone());
        state.updated_at = chrono::Utc::now();
        self.workspace.state().save(&state)?;

        info!(
            project = %payload.project,
            dependency_key = %deps.dependency_key.short(),
            payload_key = %payload.payload_key.short(),
            status = deps.status.as_str(),
            "build complete"
        );
        Ok(BuildReport {
            project: payload.project,
            dependency_key: deps.dependency_key,
            payload_key: payload.payload_key,
            fingerprint: deps.fingerprint,
            sync_status: deps.status,
            package_count: deps.packages.len(),
            stages: tracker.history().to_vec(),
        })
    }

    /// Stage 4 only: resolve the activation for the built workspace.
    pub fn activate(&self, current_path: Option<OsString>) -> StagerResult<Activation> {
        let state = self.workspace.state().load();
        activate(
            &self.workspace,
            state.as_ref(),
            &self.config.service.listener,
            current_path.as_deref(),
        )
    }

    /// Stages 4-5 on a built workspace. Returns the listener's exit code.
    pub fn serve<L: Launcher>(&self, launcher: L) -> StagerResult<i32> {
        let mut tracker = StageTracker::starting_at(Stage::PayloadInstalled);
        let result = self.serve_stages(&mut tracker, launcher);
        if let Err(err) = &result {
            let attempted = tracker.current().next().unwrap_or(Stage::Failed);
            self.fail(&mut tracker, attempted, err);
        }
        result
    }

    fn serve_stages<L: Launcher>(&self, tracker: &mut StageTracker, launcher: L) -> StagerResult<i32> {
        let activation = self.activate(std::env::var_os("PATH"))?;
        self.enter(tracker, Stage::RuntimeActivated);
        self.events.on_event(PipelineEvent::RuntimeActivated {
            bin_dir: activation.bin_dir.clone(),
        });

        let service = ServiceSpec::from(&self.config.service);
        let command = ServiceLauncher::<L>::command(&activation, &service);
        self.events.on_event(PipelineEvent::Launching {
            command: command.to_string(),
        });
        self.enter(tracker, Stage::Serving);
        ServiceLauncher::new(launcher).launch(&activation, &service)
    }

    /// `build` followed by `serve`.
    pub fn run<L: Launcher>(&self, launcher: L) -> StagerResult<i32> {
        self.build()?;
        self.serve(launcher)
    }

    fn enter(&self, tracker: &mut StageTracker, stage: Stage) {
        if tracker.advance(stage) {
            self.events.on_event(PipelineEvent::StageEntered { stage });
        } else {
            warn!(from = %tracker.current(), to = %stage, "ignored out-of-order stage transition");
        }
    }

    fn fail(&self, tracker: &mut StageTracker, attempted: Stage, err: &StagerError) {
        tracker.fail();
        self.events.on_event(PipelineEvent::Failed {
            stage: attempted,
            code: err.code().to_string(),
            message: err.to_string(),
        });
    }
}
