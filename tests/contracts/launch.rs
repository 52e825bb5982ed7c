//! Contract: the listener starts from the activated environment with the
//! fixed bind arguments, and its exit code becomes stager's.

use std::fs;

use crate::common::{StorePackage, TestEnv, TestEnvBuilder, PYTHON_LISTENER};

fn built() -> TestEnv {
    let env = TestEnvBuilder::web_service().build();
    let result = env.run(&["build"]);
    assert!(result.is_success(), "build failed: {}", result.combined_output());
    env
}

fn line<'a>(stdout: &'a str, prefix: &str) -> &'a str {
    stdout
        .lines()
        .find_map(|l| l.strip_prefix(prefix))
        .unwrap_or_else(|| panic!("no '{}' line in:\n{}", prefix, stdout))
}

/// CONTRACT: one listener bound to all interfaces on the configured port,
/// serving `module:object`.
#[test]
fn contract_bind_arguments() {
    let env = built();

    for args in [&["serve"][..], &["serve", "--no-exec"][..]] {
        let result = env.run(args);
        assert!(result.is_success(), "output: {}", result.combined_output());
        assert_eq!(
            line(&result.stdout, "listener-argv: "),
            "main:app --host 0.0.0.0 --port 8000"
        );
    }
}

/// CONTRACT: the listener is resolved from the environment's bin dir and runs in the app copy.
#[test]
fn contract_listener_resolves_from_environment() {
    let env = built();
    let result = env.run(&["serve", "--no-exec"]);
    assert!(result.is_success(), "output: {}", result.combined_output());

    let bin = fs::canonicalize(env.workspace_path("env/bin/uvicorn")).unwrap();
    let app = fs::canonicalize(env.workspace_path("app")).unwrap();
    assert_eq!(line(&result.stdout, "listener-path: "), bin.display().to_string());
    assert_eq!(line(&result.stdout, "listener-cwd: "), app.display().to_string());
}

/// CONTRACT: the listener's import path is the environment's site-packages
/// followed by the installed application.
#[test]
fn contract_listener_imports_from_environment() {
    let env = built();
    let result = env.run(&["serve", "--no-exec"]);
    assert!(result.is_success(), "output: {}", result.combined_output());

    let site = fs::canonicalize(env.workspace_path("env/site-packages")).unwrap();
    let app = fs::canonicalize(env.workspace_path("app")).unwrap();
    let import_path: Vec<String> = line(&result.stdout, "listener-pythonpath: ")
        .split(':')
        .map(str::to_string)
        .collect();
    assert_eq!(
        import_path,
        vec![site.display().to_string(), app.display().to_string()]
    );

    let venv = fs::canonicalize(env.workspace_path("env")).unwrap();
    assert_eq!(line(&result.stdout, "listener-venv: "), venv.display().to_string());
}

/// CONTRACT: a real interpreter started by the listener resolves the synced
/// dependencies and the `module:object` target.
#[cfg(unix)]
#[test]
fn contract_runtime_resolves_target_and_dependencies() {
    if std::process::Command::new("python3").arg("--version").output().is_err() {
        eprintln!("python3 not available, skipping");
        return;
    }

    let env = TestEnvBuilder::web_service()
        .with_dependency("pylisten==1.0")
        .with_package(StorePackage::new("pylisten", "1.0").executable("bin/pylisten", PYTHON_LISTENER))
        .with_config("[service]\nlistener = \"pylisten\"\n")
        .build();
    let result = env.run(&["build"]);
    assert!(result.is_success(), "build failed: {}", result.combined_output());

    let result = env.run(&["serve", "--no-exec"]);
    assert!(result.is_success(), "output: {}", result.combined_output());
    assert_eq!(line(&result.stdout, "resolved-app: "), "True");
    assert_eq!(line(&result.stdout, "resolved-starlette: "), "0.37.2");

    let fastapi = env.workspace_path("env/site-packages/fastapi/__init__.py");
    assert_eq!(
        fs::canonicalize(line(&result.stdout, "resolved-fastapi: ")).unwrap(),
        fs::canonicalize(fastapi).unwrap()
    );
}

/// CONTRACT: the listener's exit status is propagated unchanged.
#[test]
fn contract_exit_code_is_delegated() {
    let env = built();
    for args in [&["serve"][..], &["serve", "--no-exec"][..]] {
        let result = env.run_with_env(args, &[("LISTENER_EXIT", "7")]);
        assert_eq!(result.exit_code, 7, "output: {}", result.combined_output());
    }
}

/// CONTRACT: `[service]` and `--port` choose the target and port.
#[test]
fn contract_service_config_and_port_flag() {
    let env = TestEnvBuilder::web_service()
        .with_config("[service]\nmodule = \"ledger.main\"\nobject = \"api\"\nport = 8080\n")
        .build();
    assert!(env.run(&["build"]).is_success());

    let result = env.run(&["serve", "--no-exec"]);
    assert_eq!(
        line(&result.stdout, "listener-argv: "),
        "ledger.main:api --host 0.0.0.0 --port 8080"
    );

    let result = env.run(&["serve", "--no-exec", "--port", "9000"]);
    assert_eq!(
        line(&result.stdout, "listener-argv: "),
        "ledger.main:api --host 0.0.0.0 --port 9000"
    );
}

/// CONTRACT: nothing is served from a workspace that was never built.
#[test]
fn contract_serve_requires_a_build() {
    let env = TestEnvBuilder::web_service().build();
    let result = env.run(&["serve"]);
    assert_eq!(result.exit_code, 4, "output: {}", result.combined_output());
    assert!(!result.stdout.contains("listener-argv"));
}

/// CONTRACT: `run` walks every stage in order, then launches.
#[test]
fn contract_run_reports_stages_in_order() {
    let env = TestEnvBuilder::web_service().build();
    let result = env.run(&["--json", "run", "--no-exec"]);
    assert!(result.is_success(), "output: {}", result.combined_output());

    let stages: Vec<String> = result
        .events()
        .iter()
        .filter(|e| e["event"] == "stage")
        .map(|e| e["stage"].as_str().unwrap_or_default().to_string())
        .collect();
    assert_eq!(
        stages,
        vec![
            "manifest_loaded",
            "deps_synced",
            "payload_installed",
            "runtime_activated",
            "serving"
        ]
    );

    let launching = result
        .events()
        .into_iter()
        .find(|e| e["event"] == "launching")
        .expect("launching event");
    assert!(launching["argv"]
        .as_str()
        .unwrap()
        .ends_with("uvicorn main:app --host 0.0.0.0 --port 8000"));
    assert!(result.stdout.contains("listener-argv: main:app"));
}
