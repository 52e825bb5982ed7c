//! Scenario: Dependency upgrade
//!
//! Journey: a developer bumps a pin, forgets to re-lock, then re-locks.
//!
//! Steps:
//! 1. Build with the original lock
//! 2. Bump the constraint in the manifest only: build fails with a diff
//! 3. Re-lock with the new package: build succeeds with a new cache entry
//!
//! Success Criteria:
//! - The stale build exits 2 and the workspace cannot be served until the next good build
//! - The re-locked build produces a second cache entry

use std::fs;

use stager::domain::entities::Lockfile;
use stager::domain::value_objects::PackageName;
use stager::infrastructure::repositories::render_lockfile;

use crate::common::*;

#[test]
fn scenario_bump_without_relock_then_relock() {
    let env = TestEnvBuilder::web_service().build();
    assert!(env.run(&["build"]).is_success());
    let first_keys = env.pipeline().keys().unwrap();

    // Step 2: manifest-only bump
    let manifest = fs::read_to_string(env.context_path("pyproject.toml")).unwrap();
    let bumped = manifest.replace("uvicorn==0.29.0", "uvicorn==0.30.0");
    env.write_context_file("pyproject.toml", &bumped);

    let result = env.run(&["build"]);
    assert_eq!(result.exit_code, 2, "output: {}", result.combined_output());
    assert!(result.stderr.contains("+uvicorn==0.30.0"), "stderr: {}", result.stderr);
    assert_eq!(env.run(&["serve", "--no-exec"]).exit_code, 4);

    // Step 3: re-lock against the new artifact
    let packages = [
        write_store_package(
            &env.store(),
            &StorePackage::new("fastapi", "0.110.1")
                .file("fastapi/__init__.py", FASTAPI_INIT)
                .depends_on("starlette"),
        ),
        write_store_package(
            &env.store(),
            &StorePackage::new("starlette", "0.37.2").file("starlette/__init__.py", STARLETTE_INIT),
        ),
        write_store_package(
            &env.store(),
            &StorePackage::new("uvicorn", "0.30.0")
                .file("uvicorn/__init__.py", "")
                .executable("bin/uvicorn", FAKE_LISTENER),
        ),
        write_store_package(
            &env.store(),
            &StorePackage::new("pytest", "8.1.1").file("pytest/__init__.py", PYTEST_INIT),
        ),
    ];
    let mut lock = Lockfile::new(PackageName::new("ledger-api").unwrap()).with_recorded(
        vec!["fastapi>=0.110".into(), "uvicorn==0.30.0".into()],
        vec!["pytest>=8".into()],
    );
    for package in packages {
        lock = lock.with_package(package);
    }
    env.write_context_file("stager.lock", &render_lockfile(&lock).unwrap());

    let result = env.run(&["build"]);
    assert!(result.is_success(), "output: {}", result.combined_output());
    assert!(result.stdout.contains("(built, 3 packages)"), "stdout: {}", result.stdout);

    let second_keys = env.pipeline().keys().unwrap();
    assert_ne!(first_keys.dependency_key, second_keys.dependency_key);
    assert_eq!(env.cache_entries().len(), 2);
    assert!(env.run(&["serve", "--no-exec"]).is_success());
}
