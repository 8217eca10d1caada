//! Peer daemon handlers.

use thrum_core::{EventBody, Peer, PeerStatus};

use super::MaterializedState;

pub(crate) fn apply(state: &mut MaterializedState, body: &EventBody) {
    match body {
        EventBody::PeerPair { peer_daemon_id, repo_id, address, paired_at } => {
            let entry = state.peers.entry(*peer_daemon_id).or_insert_with(|| Peer {
                peer_daemon_id: *peer_daemon_id,
                repo_id: repo_id.clone(),
                address: address.clone(),
                status: PeerStatus::Pending,
                paired_at: None,
                last_pulled_seq: 0,
            });
            entry.address = address.clone();
            entry.status = PeerStatus::Paired;
            entry.paired_at = Some(*paired_at);
        }

        EventBody::PeerRemove { peer_daemon_id } => {
            if let Some(peer) = state.peers.get_mut(peer_daemon_id) {
                peer.status = PeerStatus::Revoked;
            }
        }

        _ => {}
    }
}
