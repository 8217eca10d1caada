//! Paired-peer table with bearer tokens (spec §2 PeerRegistry).
//!
//! `Peer` rows themselves are replicated derived state (`peer.pair` /
//! `peer.remove` events), so they live in [`thrum_storage::MaterializedState`].
//! Bearer tokens are deliberately *not* part of that replicated state —
//! each side of a pairing mints its own token for the other to present,
//! and tokens must never be replayed onto a third daemon — so they live
//! here, in a daemon-local, non-replicated side table.

use parking_lot::RwLock;
use std::collections::HashMap;
use thrum_core::DaemonId;

/// Local-only bearer-token store, keyed both ways for O(1) lookup.
#[derive(Default)]
pub struct PeerRegistry {
    tokens_by_peer: RwLock<HashMap<DaemonId, String>>,
    peers_by_token: RwLock<HashMap<String, DaemonId>>,
    /// Display name exchanged during pairing (spec §3 Peer: `{..., name,
    /// ...}`). Not part of `thrum_core::Peer`'s replicated row — peers
    /// don't need to agree on what a third party calls this daemon.
    names_by_peer: RwLock<HashMap<DaemonId, String>>,
}

impl PeerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the token this daemon issued to `peer_daemon_id` (minted at
    /// `pair.request` time) or the token presented to us by the initiator
    /// (`peer.join` time) — both are looked up the same way afterward.
    pub fn set_token(&self, peer_daemon_id: DaemonId, token: String) {
        self.peers_by_token.write().insert(token.clone(), peer_daemon_id);
        self.tokens_by_peer.write().insert(peer_daemon_id, token);
    }

    pub fn token_for(&self, peer_daemon_id: DaemonId) -> Option<String> {
        self.tokens_by_peer.read().get(&peer_daemon_id).cloned()
    }

    /// Resolve a bearer token presented on an inbound `sync.pull` /
    /// `sync.notify` call to the peer it was issued to.
    pub fn peer_for_token(&self, token: &str) -> Option<DaemonId> {
        self.peers_by_token.read().get(token).copied()
    }

    pub fn revoke(&self, peer_daemon_id: DaemonId) {
        if let Some(token) = self.tokens_by_peer.write().remove(&peer_daemon_id) {
            self.peers_by_token.write().remove(&token);
        }
        self.names_by_peer.write().remove(&peer_daemon_id);
    }

    pub fn set_name(&self, peer_daemon_id: DaemonId, name: String) {
        self.names_by_peer.write().insert(peer_daemon_id, name);
    }

    pub fn name_for(&self, peer_daemon_id: DaemonId) -> Option<String> {
        self.names_by_peer.read().get(&peer_daemon_id).cloned()
    }

    pub fn peer_by_name(&self, name: &str) -> Option<DaemonId> {
        self.names_by_peer.read().iter().find(|(_, n)| n.as_str() == name).map(|(id, _)| *id)
    }
}

/// Mints a fresh bearer token. A plain random string is sufficient here —
/// spec §1 Non-goals excludes cryptographic peer auth beyond this shared
/// token, so there's no signature scheme to key.
pub fn mint_token() -> String {
    nanoid::nanoid!(32)
}

#[cfg(test)]
#[path = "peer_registry_tests.rs"]
mod tests;
