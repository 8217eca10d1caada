use super::*;
use tempfile::tempdir;

#[test]
fn save_then_load_round_trips_state() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("snapshot.zst");

    let mut state = MaterializedState::default();
    let agent = thrum_core::test_support::test_agent("repo", "engineer", "core");
    state.agents.insert(agent.agent_id, agent.clone());

    let snapshot = Snapshot::new(42, state, Utc::now());
    snapshot.save(&path).unwrap();

    let registry = MigrationRegistry::new();
    let loaded = Snapshot::load(&path, &registry).unwrap();

    assert_eq!(loaded.seq, 42);
    assert_eq!(loaded.version, CURRENT_SNAPSHOT_VERSION);
    assert_eq!(loaded.state.agents.len(), 1);
}

#[test]
fn save_rotates_previous_file_to_bak() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("snapshot.zst");

    Snapshot::new(1, MaterializedState::default(), Utc::now()).save(&path).unwrap();
    Snapshot::new(2, MaterializedState::default(), Utc::now()).save(&path).unwrap();

    assert!(path.with_extension("bak").exists());
    let registry = MigrationRegistry::new();
    let loaded = Snapshot::load(&path, &registry).unwrap();
    assert_eq!(loaded.seq, 2);
}

#[test]
fn rotate_bak_path_caps_backup_count() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("snapshot.zst");
    std::fs::write(&path, b"stub").unwrap();
    std::fs::write(path.with_extension("bak"), b"1").unwrap();
    std::fs::write(path.with_extension("bak.2"), b"2").unwrap();
    std::fs::write(path.with_extension("bak.3"), b"3").unwrap();

    let next = rotate_bak_path(&path);

    assert_eq!(next, path.with_extension("bak"));
    assert!(path.with_extension("bak.2").exists());
    assert!(path.with_extension("bak.3").exists());
}
