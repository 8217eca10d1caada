//! Debounced pull scheduler and push-side notifier (spec §4.4).
//!
//! Two responsibilities: serialize inbound `sync.notify` calls per peer so
//! at most one pull loop runs concurrently per peer, and best-effort
//! notify paired peers after a local write so they don't have to wait for
//! their periodic safety-net pull.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use thrum_core::peer::PeerStatus;
use thrum_core::{Clock, DaemonId};
use tracing::{debug, warn};

use crate::peer_client::PeerClient;
use crate::peer_registry::PeerRegistry;
use crate::state::State;

/// Per-peer debounce bookkeeping (spec §4.4 Debouncer), plus the status
/// fields `sync.status` surfaces.
#[derive(Debug, Default, Clone)]
struct PeerSyncState {
    syncing: bool,
    pending: Option<DateTime<Utc>>,
    last_synced_seq: u64,
    last_error: Option<String>,
}

pub struct SyncLoop<C: Clock> {
    state: Arc<State<C>>,
    peer_registry: Arc<PeerRegistry>,
    client: Arc<dyn PeerClient>,
    clock: C,
    debounce: StdDuration,
    max_batch: u32,
    peers: Mutex<HashMap<DaemonId, PeerSyncState>>,
}

impl<C: Clock + 'static> SyncLoop<C> {
    pub fn new(
        state: Arc<State<C>>,
        peer_registry: Arc<PeerRegistry>,
        client: Arc<dyn PeerClient>,
        clock: C,
        debounce: StdDuration,
        max_batch: u32,
    ) -> Arc<Self> {
        Arc::new(Self {
            state,
            peer_registry,
            client,
            clock,
            debounce,
            max_batch,
            peers: Mutex::new(HashMap::new()),
        })
    }

    pub fn last_synced_seq(&self, daemon_id: DaemonId) -> u64 {
        self.peers.lock().get(&daemon_id).map(|s| s.last_synced_seq).unwrap_or(0)
    }

    pub fn last_error(&self, daemon_id: DaemonId) -> Option<String> {
        self.peers.lock().get(&daemon_id).and_then(|s| s.last_error.clone())
    }

    pub fn is_syncing(&self, daemon_id: DaemonId) -> bool {
        self.peers.lock().get(&daemon_id).map(|s| s.syncing).unwrap_or(false)
    }

    /// Inbound `sync.notify(daemon_id)` (spec §4.4 Debouncer). Returns
    /// `"ok"` the first time (and spawns the pull loop) or `"queued"` if a
    /// pull for this peer is already in flight.
    pub fn on_notify(self: &Arc<Self>, daemon_id: DaemonId) -> &'static str {
        let mut should_spawn = false;
        {
            let mut peers = self.peers.lock();
            let entry = peers.entry(daemon_id).or_default();
            if !entry.syncing {
                entry.syncing = true;
                should_spawn = true;
            } else {
                entry.pending = Some(Utc::now());
            }
        }
        if should_spawn {
            let this = Arc::clone(self);
            tokio::spawn(async move { this.do_sync(daemon_id).await });
            "ok"
        } else {
            "queued"
        }
    }

    /// Push side: after a locally-originated write, best-effort notify
    /// every paired peer (spec §4.4 "Push side"). Never awaited by the
    /// caller — failures are logged and left to the next periodic pull.
    pub fn notify_peers_of_local_write(self: &Arc<Self>) {
        let paired: Vec<_> = self
            .state
            .read(|s| s.peers.values().filter(|p| p.status == PeerStatus::Paired).cloned().collect());
        let latest_seq = self.state.latest_seq();

        for peer in paired {
            let Some(token) = self.peer_registry.token_for(peer.peer_daemon_id) else { continue };
            let this = Arc::clone(self);
            let address = peer.address.clone();
            let my_daemon_id = self.state.daemon_id();
            tokio::spawn(async move {
                if let Err(e) =
                    this.client.sync_notify(&address, &token, my_daemon_id, latest_seq, 1).await
                {
                    warn!(peer = %peer.peer_daemon_id, error = %e, "sync.notify failed, deferring to next pull");
                }
            });
        }
    }

    /// Periodic safety-net pull: call for every paired peer on a timer
    /// from `thrumd`'s main loop, independent of any inbound notify.
    pub fn poll_all_paired(self: &Arc<Self>) {
        let paired: Vec<DaemonId> = self
            .state
            .read(|s| s.peers.values().filter(|p| p.status == PeerStatus::Paired).map(|p| p.peer_daemon_id).collect());
        for daemon_id in paired {
            self.on_notify(daemon_id);
        }
    }

    async fn do_sync(self: Arc<Self>, daemon_id: DaemonId) {
        loop {
            if let Err(e) = self.pull_loop(daemon_id).await {
                let mut peers = self.peers.lock();
                peers.entry(daemon_id).or_default().last_error = Some(e.to_string());
                warn!(peer = %daemon_id, error = %e, "sync pull failed");
            }

            let wait = {
                let mut peers = self.peers.lock();
                let entry = peers.entry(daemon_id).or_default();
                match entry.pending.take() {
                    None => {
                        entry.syncing = false;
                        None
                    }
                    Some(pending_at) => {
                        let elapsed = (Utc::now() - pending_at)
                            .to_std()
                            .unwrap_or(StdDuration::ZERO);
                        if elapsed >= self.debounce {
                            Some(StdDuration::ZERO)
                        } else {
                            Some(self.debounce - elapsed)
                        }
                    }
                }
            };

            match wait {
                None => break,
                Some(StdDuration::ZERO) => continue,
                Some(d) => {
                    tokio::time::sleep(d).await;
                    continue;
                }
            }
        }
    }

    /// Step 1 of `doSync` (spec §4.4): pull batches from `daemon_id` until
    /// `more_available` is false.
    async fn pull_loop(&self, daemon_id: DaemonId) -> Result<(), crate::error::DaemonError> {
        loop {
            let (address, token, after_sequence) = {
                let found = self.state.read(|s| s.peers.get(&daemon_id).cloned());
                let peer = found.ok_or_else(|| {
                    crate::error::DaemonError::Handler(thrum_core::ThrumError::not_found(
                        "peer removed during sync",
                    ))
                })?;
                let token = self.peer_registry.token_for(daemon_id).ok_or_else(|| {
                    crate::error::DaemonError::Handler(thrum_core::ThrumError::auth(
                        "no bearer token recorded for peer",
                    ))
                })?;
                (peer.address, token, peer.last_pulled_seq)
            };

            let batch =
                self.client.sync_pull(&address, &token, after_sequence, self.max_batch).await?;

            let mut applied_count = 0u64;
            for event in batch.events {
                if self.state.apply_replicated(event)? {
                    applied_count += 1;
                }
            }
            debug!(peer = %daemon_id, applied_count, next_sequence = batch.next_sequence, "sync pull batch applied");

            {
                let mut peers = self.peers.lock();
                let entry = peers.entry(daemon_id).or_default();
                entry.last_synced_seq = batch.next_sequence;
                entry.last_error = None;
            }
            self.advance_last_pulled_seq(daemon_id, batch.next_sequence);

            if !batch.more_available {
                return Ok(());
            }
        }
    }

    fn advance_last_pulled_seq(&self, daemon_id: DaemonId, seq: u64) {
        // `last_pulled_seq` lives on the replicated `Peer` row itself, but
        // advancing it is local bookkeeping, not an event — peers don't
        // need to agree on how far along a third party's sync got.
        self.state.bump_peer_cursor(daemon_id, seq);
    }
}

#[cfg(test)]
#[path = "sync_loop_tests.rs"]
mod tests;
