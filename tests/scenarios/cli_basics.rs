//! Scenario: CLI surface
//!
//! Journey: an operator explores the binary and its configuration knobs.

use std::process::Command;

use crate::common::*;

#[test]
fn scenario_help_lists_every_command() {
    let output = Command::new(env!("CARGO_BIN_EXE_stager"))
        .arg("--help")
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    for command in ["build", "serve", "run", "keys"] {
        assert!(stdout.contains(command), "help should list '{}':\n{}", command, stdout);
    }
}

#[test]
fn scenario_version_flag() {
    let output = Command::new(env!("CARGO_BIN_EXE_stager"))
        .arg("--version")
        .output()
        .unwrap();
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn scenario_unknown_config_key_warns_with_suggestion() {
    let env = TestEnvBuilder::web_service()
        .with_config("[service]\nprot = 9000\n")
        .build();

    let result = env.run(&["keys"]);
    assert!(result.is_success(), "output: {}", result.combined_output());
    assert!(result.stderr.contains("prot"), "stderr: {}", result.stderr);
    assert!(result.stderr.contains("port"), "stderr: {}", result.stderr);
}

#[test]
fn scenario_invalid_config_fails_before_building() {
    let env = TestEnvBuilder::web_service()
        .with_config("[service]\nport = \"eighty\"\n")
        .build();

    let result = env.run(&["--json", "build"]);
    assert_eq!(result.exit_code, 1, "output: {}", result.combined_output());
    let events = result.events();
    assert_eq!(events.len(), 1, "{:?}", events);
    assert_eq!(events[0]["event"], "error");
    assert_eq!(events[0]["code"], "config_error");
    assert!(!env.workspace().exists());
}

#[test]
fn scenario_missing_manifest() {
    let env = TestEnvBuilder::web_service().build();
    std::fs::remove_file(env.context_path("pyproject.toml")).unwrap();

    let result = env.run(&["keys"]);
    assert_eq!(result.exit_code, 1);
    assert!(result.stderr.contains("pyproject.toml"), "stderr: {}", result.stderr);
}

#[test]
fn scenario_verbose_logging_goes_to_stderr() {
    let env = TestEnvBuilder::web_service().build();
    let result = env.run(&["-vv", "build"]);
    assert!(result.is_success(), "output: {}", result.combined_output());
    assert!(result.stderr.contains("build complete"), "stderr: {}", result.stderr);
    assert!(!result.stdout.contains("build complete"));
}
