use super::*;
use thrum_core::{AgentId, Scope};

fn test_state() -> (State<FakeClock>, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let wal = Wal::open(&dir.path().join("events.wal"), 0).unwrap();
    (State::new(DaemonId::new(), FakeClock::new(), wal, MaterializedState::default()), dir)
}

fn register_event(state: &State<FakeClock>, agent_id: AgentId) -> Event {
    state
        .write_event(EventBody::AgentRegister {
            agent_id,
            repo_id: "repo".to_string(),
            role: "planner".to_string(),
            module: "core".to_string(),
            name: None,
            display: None,
            kind: thrum_core::AgentKind::Tool,
        })
        .unwrap()
}

#[test]
fn write_event_assigns_increasing_sequence_numbers() {
    let (state, _dir) = test_state();
    let agent_id = AgentId::derive("repo", "planner", "core", None);
    let e1 = register_event(&state, agent_id);
    let e2 = register_event(&state, agent_id);
    assert_eq!(e1.seq, 1);
    assert_eq!(e2.seq, 2);
    assert_eq!(state.latest_seq(), 2);
}

#[test]
fn write_event_applies_to_materialized_state() {
    let (state, _dir) = test_state();
    let agent_id = AgentId::derive("repo", "planner", "core", None);
    register_event(&state, agent_id);
    state.read(|s| assert!(s.agents.contains_key(&agent_id)));
}

#[test]
fn apply_replicated_skips_a_duplicate_idempotency_key() {
    let (state, _dir) = test_state();
    let origin = DaemonId::new();
    let event_id = EventId::new();
    let agent_id = AgentId::derive("repo", "planner", "core", None);
    let event = Event {
        seq: 0,
        event_id,
        origin_daemon_id: origin,
        origin_event_id: event_id,
        recorded_at: FakeClock::new().event_timestamp(),
        body: EventBody::AgentRegister {
            agent_id,
            repo_id: "repo".to_string(),
            role: "planner".to_string(),
            module: "core".to_string(),
            name: None,
            display: None,
            kind: thrum_core::AgentKind::Tool,
        },
    };

    assert!(state.apply_replicated(event.clone()).unwrap());
    assert!(!state.apply_replicated(event).unwrap(), "duplicate origin key must be skipped");
    assert_eq!(state.latest_seq(), 1);
}

#[test]
fn apply_replicated_reassigns_local_seq() {
    let (state, _dir) = test_state();
    let agent_id = AgentId::derive("repo", "a", "core", None);
    register_event(&state, agent_id); // local seq 1

    let origin = DaemonId::new();
    let event_id = EventId::new();
    let foreign_agent = AgentId::derive("repo", "b", "core", None);
    let event = Event {
        seq: 999,
        event_id,
        origin_daemon_id: origin,
        origin_event_id: event_id,
        recorded_at: FakeClock::new().event_timestamp(),
        body: EventBody::AgentRegister {
            agent_id: foreign_agent,
            repo_id: "repo".to_string(),
            role: "b".to_string(),
            module: "core".to_string(),
            name: None,
            display: None,
            kind: thrum_core::AgentKind::Tool,
        },
    };
    assert!(state.apply_replicated(event).unwrap());
    assert_eq!(state.latest_seq(), 2, "local seq assignment ignores the foreign seq field");
}

#[test]
fn events_since_caps_batch_and_reports_more_available() {
    let (state, _dir) = test_state();
    for i in 0..5 {
        let agent_id = AgentId::derive("repo", &format!("role{i}"), "core", None);
        register_event(&state, agent_id);
    }

    let (batch, next_seq, more) = state.events_since(0, 3);
    assert_eq!(batch.len(), 3);
    assert_eq!(next_seq, 3);
    assert!(more);

    let (rest, next_seq2, more2) = state.events_since(next_seq, 10);
    assert_eq!(rest.len(), 2);
    assert_eq!(next_seq2, 5);
    assert!(!more2);
}

#[test]
fn bump_peer_cursor_is_monotonic_and_ignores_unknown_peers() {
    let mut materialized = MaterializedState::default();
    let peer_id = DaemonId::new();
    materialized.peers.insert(
        peer_id,
        thrum_core::Peer {
            peer_daemon_id: peer_id,
            repo_id: "repo".to_string(),
            address: "127.0.0.1:0".to_string(),
            status: thrum_core::PeerStatus::Paired,
            paired_at: None,
            last_pulled_seq: 5,
        },
    );
    let dir = tempfile::tempdir().unwrap();
    let wal = Wal::open(&dir.path().join("events.wal"), 0).unwrap();
    let state = State::new(DaemonId::new(), FakeClock::new(), wal, materialized);

    state.bump_peer_cursor(peer_id, 3);
    state.read(|s| assert_eq!(s.peers[&peer_id].last_pulled_seq, 5, "cursor never moves backward"));

    state.bump_peer_cursor(peer_id, 10);
    state.read(|s| assert_eq!(s.peers[&peer_id].last_pulled_seq, 10));

    state.bump_peer_cursor(DaemonId::new(), 99);
}

#[test]
fn apply_heartbeat_deltas_mutates_session_scopes_and_refs() {
    let (state, _dir) = test_state();
    let agent_id = AgentId::derive("repo", "planner", "core", None);
    register_event(&state, agent_id);
    let session_id = thrum_core::SessionId::new();
    state
        .write_event(EventBody::SessionStart {
            session_id,
            agent_id,
            started_at: FakeClock::new().event_timestamp(),
            scopes: vec![Scope::module("core")],
            refs: vec![],
        })
        .unwrap();

    let changed = state.apply_heartbeat_deltas(
        session_id,
        vec![Scope::role("reviewer")],
        vec![Scope::module("core")],
        vec![],
        vec![],
    );
    assert!(changed);
    state.read(|s| {
        let session = &s.sessions[&session_id];
        assert!(session.scopes.contains(&Scope::role("reviewer")));
        assert!(!session.scopes.contains(&Scope::module("core")));
    });
}

#[test]
fn apply_heartbeat_deltas_on_unknown_session_returns_false() {
    let (state, _dir) = test_state();
    assert!(!state.apply_heartbeat_deltas(
        thrum_core::SessionId::new(),
        vec![],
        vec![],
        vec![],
        vec![],
    ));
}

#[test]
fn upsert_work_context_text_tracks_update_timestamps() {
    let (state, _dir) = test_state();
    let agent_id = AgentId::derive("repo", "planner", "core", None);
    let session_id = thrum_core::SessionId::new();
    let now = FakeClock::new().event_timestamp();

    state.upsert_work_context_text(session_id, agent_id, Some("ship it".to_string()), None, now);
    state.read(|s| {
        let ctx = &s.work_contexts[&session_id];
        assert_eq!(ctx.intent.as_deref(), Some("ship it"));
        assert!(ctx.intent_updated_at.is_some());
        assert!(ctx.current_task.is_none());
    });
}
