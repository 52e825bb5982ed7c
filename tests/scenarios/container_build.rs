//! Scenario: Container image build
//!
//! Journey: an image recipe runs `stager build` in one layer and
//! `stager serve` as the entrypoint.
//!
//! Steps:
//! 1. First build populates the dependency cache
//! 2. A code-only change rebuilds without touching dependencies
//! 3. The entrypoint serves the new code
//!
//! Success Criteria:
//! - The second build reports dependencies as reused
//! - The served app copy contains the change

use crate::common::*;

/// SCENARIO: build, edit code, rebuild, serve
#[test]
fn scenario_code_change_rebuild_and_serve() {
    let env = TestEnvBuilder::web_service().build();

    // Step 1: cold build
    let result = env.run(&["build"]);
    assert!(result.is_success(), "output: {}", result.combined_output());
    assert!(result.stdout.starts_with("Built ledger-api"), "stdout: {}", result.stdout);
    assert!(result.stdout.contains("(built, 3 packages)"), "stdout: {}", result.stdout);

    // Step 2: code-only change
    env.write_context_file("main.py", "app = 'v2'\n");
    let result = env.run(&["build"]);
    assert!(result.is_success(), "output: {}", result.combined_output());
    assert!(result.stdout.contains("(up to date, 3 packages)"), "stdout: {}", result.stdout);

    // Step 3: serve the new code
    assert_eq!(env.read_workspace_file("app/main.py"), "app = 'v2'\n");
    let result = env.run(&["serve", "--no-exec"]);
    assert!(result.is_success(), "output: {}", result.combined_output());
    assert!(result.stdout.contains("listener-argv: main:app"));
}

/// SCENARIO: CI consumes NDJSON from a cold build
#[test]
fn scenario_ci_reads_json_events() {
    let env = TestEnvBuilder::web_service().build();
    let result = env.run(&["--json", "build"]);
    assert!(result.is_success(), "output: {}", result.combined_output());

    let events = result.events();
    let kinds: Vec<&str> = events.iter().filter_map(|e| e["event"].as_str()).collect();
    assert_eq!(kinds.first(), Some(&"stage"));
    assert_eq!(kinds.last(), Some(&"complete"));
    assert_eq!(kinds.iter().filter(|k| **k == "package_installed").count(), 3);
    assert!(events.iter().all(|e| e["command"] == "build"));

    let complete = events.last().unwrap();
    assert_eq!(complete["project"], "ledger-api");
    assert_eq!(complete["status"], "built");
    assert_eq!(complete["packages"], 3);
}

/// SCENARIO: the workspace lives outside the context (`--workspace`)
#[test]
fn scenario_external_workspace() {
    let env = TestEnvBuilder::web_service().build();
    let workspace = env.root.path().join("image-root");
    let workspace_arg = workspace.display().to_string();

    let result = env.run(&["build", "--workspace", &workspace_arg]);
    assert!(result.is_success(), "output: {}", result.combined_output());
    assert!(workspace.join("env/bin/uvicorn").is_file());
    assert!(!env.workspace().exists());

    let result = env.run(&["serve", "--no-exec", "--workspace", &workspace_arg]);
    assert!(result.is_success(), "output: {}", result.combined_output());
}

/// SCENARIO: a workspace placed inside the context but outside `.stager/` is refused
#[test]
fn scenario_workspace_inside_context_is_refused() {
    let env = TestEnvBuilder::web_service().build();
    let result = env.run(&["build", "--workspace", "build-out"]);
    assert_eq!(result.exit_code, 3, "output: {}", result.combined_output());
}
