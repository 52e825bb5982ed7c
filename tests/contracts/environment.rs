//! Contract: the synchronized environment holds exactly the locked runtime set.

use std::fs;

use stager::domain::entities::InstallKind;
use stager::infrastructure::repositories::Workspace;

use crate::common::{StorePackage, TestEnvBuilder};

fn installed_names(env: &crate::common::TestEnv) -> Vec<String> {
    Workspace::new(env.workspace())
        .records()
        .read_all()
        .unwrap()
        .names()
        .map(|n| n.to_string())
        .collect()
}

/// CONTRACT: dev-only packages never reach the environment.
#[test]
fn contract_no_dev_dependency_leakage() {
    let env = TestEnvBuilder::web_service()
        .with_dev_dependency("pytest-cov>=5")
        .with_package(
            StorePackage::new("pytest-cov", "5.0.0")
                .file("pytest_cov/__init__.py", "")
                .depends_on("pytest"),
        )
        .build();

    env.pipeline().build().unwrap();

    let names = installed_names(&env);
    assert!(!names.contains(&"pytest".to_string()), "{:?}", names);
    assert!(!names.contains(&"pytest-cov".to_string()), "{:?}", names);
    assert!(!env.workspace_path("env/site-packages/pytest").exists());
    assert!(!env.workspace_path("env/site-packages/pytest_cov").exists());
}

/// CONTRACT: installing the application only adds the project.
#[test]
fn contract_payload_is_a_superset_of_dependencies() {
    let env = TestEnvBuilder::web_service().build();
    env.pipeline().build().unwrap();

    let installed = Workspace::new(env.workspace()).records().read_all().unwrap();
    let mut deps: Vec<String> = installed.dependencies().map(|(n, _)| n.to_string()).collect();
    deps.sort();
    assert_eq!(deps, vec!["fastapi", "starlette", "uvicorn"]);

    let (project, record) = installed.project().expect("project record");
    assert_eq!(project.as_str(), "ledger-api");
    assert_eq!(record.kind, InstallKind::Project);
    assert_eq!(record.files, vec!["site-packages/ledger_api.pth".to_string()]);

    let pth = env.read_workspace_file("env/site-packages/ledger_api.pth");
    assert!(pth.trim().ends_with("app"), "{}", pth);
    assert!(env.workspace_path("app/main.py").is_file());
}

/// CONTRACT: a declared import root missing from the context is an application error.
#[test]
fn contract_missing_package_root_is_a_payload_error() {
    let env = TestEnvBuilder::web_service()
        .with_package_root("ledger")
        .build();

    let result = env.run(&["build"]);
    assert_eq!(result.exit_code, 3, "output: {}", result.combined_output());
    assert!(!env.workspace_path("env/site-packages/ledger_api.pth").exists());

    env.write_context_file("ledger/__init__.py", "");
    let result = env.run(&["build"]);
    assert!(result.is_success(), "output: {}", result.combined_output());
}

/// CONTRACT: ignoring the lock in `.stagerignore` is reported as an application error.
#[test]
fn contract_ignored_lock_is_a_payload_error() {
    let env = TestEnvBuilder::web_service()
        .with_stagerignore("stager.lock\n")
        .build();

    let result = env.run(&["build"]);
    assert_eq!(result.exit_code, 3, "output: {}", result.combined_output());
    assert!(
        result.stderr.contains("'stager.lock' is excluded from the build context"),
        "stderr: {}",
        result.stderr
    );
}

/// CONTRACT: two builds of identical inputs produce identical environments.
#[test]
fn contract_builds_are_idempotent() {
    let env = TestEnvBuilder::web_service().build();
    let first = env.pipeline().build().unwrap();
    let names_after_first = installed_names(&env);
    let second = env.pipeline().build().unwrap();

    assert_eq!(first.fingerprint, second.fingerprint);
    assert_eq!(first.payload_key, second.payload_key);
    assert_eq!(installed_names(&env), names_after_first);
    assert_eq!(
        fs::read_to_string(env.workspace_path("env/site-packages/fastapi/__init__.py")).unwrap(),
        crate::common::FASTAPI_INIT
    );
}

/// CONTRACT: link mode changes the on-disk representation, never the content.
#[test]
fn contract_link_mode_does_not_change_content() {
    let copied = TestEnvBuilder::web_service().build();
    let linked = TestEnvBuilder::web_service()
        .with_build_setting("link_mode = \"hardlink\"")
        .build();

    let a = copied.pipeline().build().unwrap();
    let b = linked.pipeline().build().unwrap();
    assert_eq!(a.fingerprint, b.fingerprint);
}

/// CONTRACT: bytecode compilation never changes the environment fingerprint.
#[cfg(unix)]
#[test]
fn contract_compilation_does_not_change_fingerprint() {
    let plain = TestEnvBuilder::web_service().build();
    let compiled = TestEnvBuilder::web_service()
        .with_build_setting("compile_bytecode = true")
        .with_build_setting(
            r#"compiler = ["sh", "-c", "mkdir -p \"$0/__pycache__\" && echo bytecode > \"$0/__pycache__/stub.cpython-312.pyc\""]"#,
        )
        .build();

    let a = plain.pipeline().build().unwrap();
    let b = compiled.pipeline().build().unwrap();

    assert!(compiled
        .workspace_path("env/site-packages/__pycache__/stub.cpython-312.pyc")
        .is_file());
    assert_eq!(a.fingerprint, b.fingerprint);
}

/// CONTRACT: turning compilation on compiles an environment that is already up to date.
#[cfg(unix)]
#[test]
fn contract_compile_flag_applies_to_up_to_date_env() {
    let env = TestEnvBuilder::web_service()
        .with_build_setting(
            r#"compiler = ["sh", "-c", "mkdir -p \"$0/__pycache__\" && echo bytecode > \"$0/__pycache__/stub.cpython-312.pyc\""]"#,
        )
        .build();
    let pyc = env.workspace_path("env/site-packages/__pycache__/stub.cpython-312.pyc");

    let result = env.run(&["--json", "build"]);
    assert!(result.is_success(), "output: {}", result.combined_output());
    assert!(!pyc.exists());

    let result = env.run_with_env(&["--json", "build"], &[("STAGER_COMPILE_BYTECODE", "1")]);
    assert!(result.is_success(), "output: {}", result.combined_output());
    let synced = result
        .events()
        .into_iter()
        .find(|e| e["event"] == "dependencies_synced")
        .expect("dependencies_synced event");
    assert_eq!(synced["status"], "up_to_date");
    assert!(pyc.is_file());
}

/// CONTRACT: the CLI honors `STAGER_LINK_MODE`.
#[test]
fn contract_link_mode_env_override() {
    let env = TestEnvBuilder::web_service().build();
    let result = env.run_with_env(&["build"], &[("STAGER_LINK_MODE", "hardlink")]);
    assert!(result.is_success(), "output: {}", result.combined_output());

    let result = env.run_with_env(&["build"], &[("STAGER_LINK_MODE", "symlink")]);
    assert!(result.is_success());
    assert!(result.stderr.contains("STAGER_LINK_MODE"), "stderr: {}", result.stderr);
}
