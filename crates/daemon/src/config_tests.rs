use super::*;
use serial_test::serial;
use tempfile::tempdir;

#[test]
fn load_missing_file_returns_default() {
    let dir = tempdir().unwrap();
    let config = DaemonConfig::load(&dir.path().join("absent.toml")).unwrap();
    assert_eq!(config.sync_max_batch, 1000);
    assert_eq!(config.pairing_timeout_secs, 300);
}

#[test]
fn load_parses_partial_overrides() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "sync_debounce_ms = 50\nrepo_id = \"thrum\"\n").unwrap();

    let config = DaemonConfig::load(&path).unwrap();
    assert_eq!(config.sync_debounce_ms, 50);
    assert_eq!(config.repo_id, "thrum");
    assert_eq!(config.sync_max_batch, 1000, "unset fields keep their default");
}

#[test]
fn load_rejects_malformed_toml() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "not valid = [toml").unwrap();

    assert!(matches!(DaemonConfig::load(&path), Err(ConfigError::Parse { .. })));
}

#[test]
#[serial]
fn paths_resolve_under_explicit_state_dir() {
    let dir = tempdir().unwrap();
    std::env::set_var("THRUM_STATE_DIR", dir.path());

    let paths = Paths::resolve("my-repo").unwrap();

    assert_eq!(paths.state_dir, dir.path().join("my-repo"));
    assert_eq!(paths.socket_path, dir.path().join("my-repo/daemon.sock"));

    std::env::remove_var("THRUM_STATE_DIR");
}
