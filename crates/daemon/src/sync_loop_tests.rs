use super::*;
use crate::peer_client::{PairResponse, SyncBatch};
use crate::peer_registry::PeerRegistry;
use crate::state::State;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use thrum_core::peer::PeerStatus;
use thrum_core::{FakeClock, Peer};
use thrum_storage::{MaterializedState, Wal};

struct CountingPeerClient {
    calls: Arc<AtomicUsize>,
    pull_delay: StdDuration,
}

#[async_trait::async_trait]
impl PeerClient for CountingPeerClient {
    async fn pair_request(
        &self,
        _address: &str,
        _code: &str,
        _daemon_id: DaemonId,
        _name: &str,
        _my_address: &str,
    ) -> Result<PairResponse, crate::error::DaemonError> {
        unimplemented!("not exercised by these tests")
    }

    async fn sync_pull(
        &self,
        _address: &str,
        _token: &str,
        after_sequence: u64,
        _max_batch: u32,
    ) -> Result<SyncBatch, crate::error::DaemonError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.pull_delay).await;
        Ok(SyncBatch { events: vec![], next_sequence: after_sequence, more_available: false })
    }

    async fn sync_notify(
        &self,
        _address: &str,
        _token: &str,
        _daemon_id: DaemonId,
        _latest_seq: u64,
        _event_count: u64,
    ) -> Result<String, crate::error::DaemonError> {
        Ok("ok".to_string())
    }
}

fn test_state() -> (Arc<State<FakeClock>>, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let wal = Wal::open(&dir.path().join("events.wal"), 0).unwrap();
    (Arc::new(State::new(DaemonId::new(), FakeClock::new(), wal, MaterializedState::default())), dir)
}

fn paired_peer(peer_id: DaemonId) -> Peer {
    Peer {
        peer_daemon_id: peer_id,
        repo_id: "repo".to_string(),
        address: "127.0.0.1:0".to_string(),
        status: PeerStatus::Paired,
        paired_at: Some(chrono::Utc::now()),
        last_pulled_seq: 0,
    }
}

#[tokio::test]
async fn debounced_notify_serializes_concurrent_triggers() {
    let peer_id = DaemonId::new();
    let mut materialized = MaterializedState::default();
    materialized.peers.insert(peer_id, paired_peer(peer_id));
    let dir = tempfile::tempdir().unwrap();
    let wal = Wal::open(&dir.path().join("events.wal"), 0).unwrap();
    let state = Arc::new(State::new(DaemonId::new(), FakeClock::new(), wal, materialized));

    let registry = Arc::new(PeerRegistry::new());
    registry.set_token(peer_id, "tok".to_string());

    let calls = Arc::new(AtomicUsize::new(0));
    let client = Arc::new(CountingPeerClient { calls: calls.clone(), pull_delay: StdDuration::from_millis(50) });

    let sync = SyncLoop::new(state, registry, client, FakeClock::new(), StdDuration::from_millis(10), 1000);

    assert_eq!(sync.on_notify(peer_id), "ok");
    tokio::time::sleep(StdDuration::from_millis(5)).await;
    assert_eq!(sync.on_notify(peer_id), "queued");

    // Wait for both the in-flight pull and the queued follow-up to finish.
    tokio::time::sleep(StdDuration::from_millis(250)).await;

    assert!(calls.load(Ordering::SeqCst) >= 2);
    assert!(!sync.is_syncing(peer_id));
}

#[tokio::test]
async fn notify_for_unknown_peer_still_starts_a_sync_attempt() {
    let (state, _dir) = test_state();
    let registry = Arc::new(PeerRegistry::new());
    let calls = Arc::new(AtomicUsize::new(0));
    let client = Arc::new(CountingPeerClient { calls, pull_delay: StdDuration::from_millis(1) });
    let sync = SyncLoop::new(state, registry, client, FakeClock::new(), StdDuration::from_millis(10), 1000);

    let daemon_id = DaemonId::new();
    assert_eq!(sync.on_notify(daemon_id), "ok");
    tokio::time::sleep(StdDuration::from_millis(20)).await;

    // No token/peer row recorded: pull_loop fails fast and records last_error.
    assert!(sync.last_error(daemon_id).is_some());
    assert!(!sync.is_syncing(daemon_id));
}
