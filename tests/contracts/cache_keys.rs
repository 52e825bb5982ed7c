//! Contract: the dependency cache key depends on the manifest and lock only.

use std::fs;

use stager::domain::ports::SyncStatus;

use crate::common::TestEnv;
use crate::common::TestEnvBuilder;

/// CONTRACT: editing application code never invalidates the dependency stage.
#[test]
fn contract_app_edits_keep_the_dependency_environment() {
    let env = TestEnvBuilder::web_service().build();

    let first = env.pipeline().build().unwrap();
    assert_eq!(first.sync_status, SyncStatus::Built);

    env.write_context_file("main.py", "async def app(scope, receive, send):\n    pass\n");
    env.write_context_file("routes/users.py", "USERS = []\n");

    let second = env.pipeline().build().unwrap();
    assert_eq!(second.dependency_key, first.dependency_key);
    assert_eq!(second.fingerprint, first.fingerprint);
    assert_eq!(second.sync_status, SyncStatus::UpToDate);
    assert_ne!(second.payload_key, first.payload_key);
    assert_eq!(env.cache_entries().len(), 1);
}

/// CONTRACT: a fresh workspace reuses the cached dependency environment byte-for-byte.
#[test]
fn contract_fresh_workspace_is_served_from_cache() {
    let env = TestEnvBuilder::web_service().build();
    let first = env.pipeline().build().unwrap();

    fs::remove_dir_all(env.workspace()).unwrap();
    env.write_context_file("main.py", "app = None\n");

    let second = env.pipeline().build().unwrap();
    assert_eq!(second.sync_status, SyncStatus::CacheHit);
    assert_eq!(second.fingerprint, first.fingerprint);
}

/// CONTRACT: touching the lock produces a new key and a new cache entry.
#[test]
fn contract_lock_edits_change_the_key() {
    let env = TestEnvBuilder::web_service().build();
    let before = env.pipeline().keys().unwrap();

    let lock = fs::read_to_string(env.context_path("stager.lock")).unwrap();
    env.write_context_file("stager.lock", &format!("{}\n# regenerated\n", lock));

    let after = env.pipeline().keys().unwrap();
    assert_ne!(before.dependency_key, after.dependency_key);

    env.pipeline().build().unwrap();
    assert_eq!(env.cache_entries().len(), 1);
}

/// CONTRACT: the CLI `keys` command agrees with the library.
#[test]
fn contract_keys_command_matches_library() {
    let env: TestEnv = TestEnvBuilder::web_service().build();
    let keys = env.pipeline().keys().unwrap();

    let result = env.run(&["--json", "keys"]);
    assert!(result.is_success(), "stderr: {}", result.stderr);

    let events = result.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["event"], "keys");
    assert_eq!(events[0]["dependency_key"], keys.dependency_key.as_str());
    assert_eq!(events[0]["payload_key"], keys.payload_key.as_str());
    assert_eq!(events[0]["lock_present"], true);
}

/// CONTRACT: ignored and reserved paths do not feed the payload key.
#[test]
fn contract_ignored_paths_do_not_change_payload_key() {
    let env = TestEnvBuilder::web_service()
        .with_stagerignore("*.log\n")
        .build();
    let before = env.pipeline().keys().unwrap();

    env.write_context_file("server.log", "GET / 200\n");
    env.write_context_file(".stager/scratch.txt", "tmp\n");

    let after = env.pipeline().keys().unwrap();
    assert_eq!(before.payload_key, after.payload_key);
}
