//! Shared handler-test scaffolding: an in-memory `Handlers<FakeClock>` with
//! a temp-dir-backed journal and a no-op peer client, so handler tests
//! don't each hand-assemble the whole dependency graph.

use std::sync::Arc;
use std::time::Duration;

use thrum_core::{DaemonId, FakeClock};
use thrum_storage::{MaterializedState, Wal};

use crate::config::DaemonConfig;
use crate::error::DaemonError;
use crate::handlers::{ensure_everyone_group, Handlers};
use crate::pairing::PairingManager;
use crate::peer_client::{PairResponse, PeerClient, SyncBatch};
use crate::peer_registry::PeerRegistry;
use crate::state::State;
use crate::sync_loop::SyncLoop;
use crate::worktree::NullWorktreeInspector;

/// A [`PeerClient`] that never actually dials anything; used whenever a
/// test doesn't exercise peer replication.
pub struct NoopPeerClient;

#[async_trait::async_trait]
impl PeerClient for NoopPeerClient {
    async fn pair_request(
        &self,
        _address: &str,
        _code: &str,
        _daemon_id: DaemonId,
        _name: &str,
        _my_address: &str,
    ) -> Result<PairResponse, DaemonError> {
        Err(DaemonError::Handler(thrum_core::ThrumError::internal(
            "NoopPeerClient does not support pair_request",
        )))
    }

    async fn sync_pull(
        &self,
        _address: &str,
        _token: &str,
        after_sequence: u64,
        _max_batch: u32,
    ) -> Result<SyncBatch, DaemonError> {
        Ok(SyncBatch { events: vec![], next_sequence: after_sequence, more_available: false })
    }

    async fn sync_notify(
        &self,
        _address: &str,
        _token: &str,
        _daemon_id: DaemonId,
        _latest_seq: u64,
        _event_count: u64,
    ) -> Result<String, DaemonError> {
        Ok("ok".to_string())
    }
}

/// Build a fully-wired `Handlers<FakeClock>` over a fresh temp-dir journal.
/// The `TempDir` must be kept alive for as long as `Handlers` is used.
pub fn test_handlers(repo_id: &str) -> (Handlers<FakeClock>, tempfile::TempDir) {
    let dir = tempfile::tempdir().expect("tempdir");
    let wal = Wal::open(&dir.path().join("events.wal"), 0).expect("open wal");
    let clock = FakeClock::new();
    let state =
        Arc::new(State::new(DaemonId::new(), clock.clone(), wal, MaterializedState::default()));
    let peer_registry = Arc::new(PeerRegistry::new());
    let peer_client: Arc<dyn PeerClient> = Arc::new(NoopPeerClient);
    let sync = SyncLoop::new(
        state.clone(),
        peer_registry.clone(),
        peer_client.clone(),
        clock.clone(),
        Duration::from_millis(10),
        1000,
    );

    let config = DaemonConfig { repo_id: repo_id.to_string(), ..DaemonConfig::default() };

    let handlers = Handlers {
        state,
        clock,
        config,
        context_dir: dir.path().join("context"),
        peer_registry,
        pairing: Arc::new(PairingManager::new()),
        worktree: Arc::new(NullWorktreeInspector),
        peer_client,
        sync,
        hostname: "test-host".to_string(),
        my_address: "127.0.0.1:0".to_string(),
        pairing_rx: parking_lot::Mutex::new(None),
    };
    ensure_everyone_group(&handlers).expect("bootstrap everyone group");
    (handlers, dir)
}
