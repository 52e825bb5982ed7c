//! Contract: lock problems fail the build before anything is materialized.

use std::fs;

use stager::domain::value_objects::Stage;
use stager::infrastructure::repositories::Workspace;
use stager::{LockMismatchReason, StagerError};

use crate::common::TestEnvBuilder;

/// CONTRACT: a constraint the lock does not satisfy is a LockMismatch (exit 2)
/// and leaves no cache entry and no environment.
#[test]
fn contract_unsatisfied_constraint_fails_closed() {
    let env = TestEnvBuilder::web_service()
        .with_dependency("pydantic>=2")
        .build();

    let result = env.run(&["build"]);
    assert_eq!(result.exit_code, 2, "output: {}", result.combined_output());
    assert!(result.stderr.contains("lock"), "stderr: {}", result.stderr);
    assert!(env.cache_entries().is_empty());
    assert!(!env.workspace_path("env/site-packages").exists());
}

/// CONTRACT: editing the manifest without re-locking is detected as stale.
#[test]
fn contract_stale_lock_is_rejected() {
    let env = TestEnvBuilder::web_service().build();
    let manifest = fs::read_to_string(env.context_path("pyproject.toml")).unwrap();
    env.write_context_file(
        "pyproject.toml",
        &manifest.replace("fastapi>=0.110", "fastapi>=0.100"),
    );

    let err = env.pipeline().build().unwrap_err();
    match err {
        StagerError::LockMismatch {
            reason: LockMismatchReason::Stale { diff },
        } => {
            assert!(diff.contains("-fastapi>=0.110"), "{}", diff);
            assert!(diff.contains("+fastapi>=0.100"), "{}", diff);
        }
        other => panic!("expected stale lock, got {:?}", other),
    }
}

/// CONTRACT: a missing lock never triggers resolution.
#[test]
fn contract_missing_lock_is_a_mismatch() {
    let env = TestEnvBuilder::web_service().without_lock().build();

    let result = env.run(&["--json", "build"]);
    assert_eq!(result.exit_code, 2);

    let events = result.events();
    let error = events
        .iter()
        .find(|e| e["event"] == "error")
        .unwrap_or_else(|| panic!("no error event in {:?}", events));
    assert_eq!(error["code"], "lock_mismatch");
    assert_eq!(error["stage"], "deps_synced");
    assert!(env.cache_entries().is_empty());
}

/// CONTRACT: an artifact whose bytes differ from the locked hash is refused.
#[test]
fn contract_tampered_artifact_is_refused() {
    let env = TestEnvBuilder::web_service().build();
    fs::write(env.store().join("starlette/0.37.2/starlette/__init__.py"), "evil = True\n").unwrap();

    let err = env.pipeline().build().unwrap_err();
    assert!(matches!(err, StagerError::ArtifactHashMismatch { .. }), "{:?}", err);
    assert!(env.cache_entries().is_empty());
}

/// CONTRACT: a failed build records `failed`, so nothing can be served from it.
#[test]
fn contract_failed_build_blocks_serve() {
    let env = TestEnvBuilder::web_service().build();
    env.pipeline().build().unwrap();

    env.write_context_file("stager.lock", "version = 1\n");
    assert!(env.pipeline().build().is_err());

    let state = Workspace::new(env.workspace()).state().load().unwrap();
    assert_eq!(state.stage, Stage::Failed);

    let result = env.run(&["serve", "--no-exec"]);
    assert_eq!(result.exit_code, 4, "output: {}", result.combined_output());
    assert!(!result.stdout.contains("listener-argv"));
}

/// CONTRACT: broken application metadata is a PayloadInstall error (exit 3),
/// distinct from lock problems.
#[test]
fn contract_bad_application_is_distinguished_from_bad_lock() {
    let env = TestEnvBuilder::web_service().without_version().build();

    let result = env.run(&["build"]);
    assert_eq!(result.exit_code, 3, "output: {}", result.combined_output());

    // Dependencies were fine and stay cached.
    assert_eq!(env.cache_entries().len(), 1);
}

/// CONTRACT: `run` never starts the listener when the build fails.
#[test]
fn contract_run_does_not_launch_after_failure() {
    let env = TestEnvBuilder::web_service()
        .with_dependency("pydantic>=2")
        .build();

    let result = env.run(&["run", "--no-exec"]);
    assert_eq!(result.exit_code, 2);
    assert!(!result.stdout.contains("listener-argv"));
}
