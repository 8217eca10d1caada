//! `sync.pull` / `sync.notify` / `sync.peer_info` / `sync.status` (spec
//! §4.1, §4.4).

use thrum_core::{Clock, DaemonId, ThrumError};
use thrum_wire::{EventEnvelope, Response};

use super::Handlers;

pub fn pull<C: Clock + 'static>(
    handlers: &Handlers<C>,
    token: &str,
    after_sequence: u64,
    max_batch: u32,
) -> Result<Response, ThrumError> {
    handlers
        .peer_registry
        .peer_for_token(token)
        .ok_or_else(|| ThrumError::auth("unknown or revoked sync token"))?;

    let (events, next_sequence, more_available) = handlers.state.events_since(after_sequence, max_batch);
    Ok(Response::SyncBatch {
        events: events.iter().map(EventEnvelope::from).collect(),
        next_sequence,
        more_available,
    })
}

pub fn notify<C: Clock + 'static>(
    handlers: &Handlers<C>,
    token: &str,
    daemon_id: &str,
    _latest_seq: u64,
    _event_count: u64,
) -> Result<Response, ThrumError> {
    let caller = handlers
        .peer_registry
        .peer_for_token(token)
        .ok_or_else(|| ThrumError::auth("unknown or revoked sync token"))?;
    let claimed = DaemonId::from_string(daemon_id);
    if caller != claimed {
        return Err(ThrumError::auth("token does not match the claimed daemon_id"));
    }

    let status = handlers.sync.on_notify(caller);
    Ok(Response::SyncNotifyAck { status: status.to_string() })
}

pub fn peer_info<C: Clock + 'static>(handlers: &Handlers<C>) -> Result<Response, ThrumError> {
    Ok(Response::PeerInfo {
        daemon_id: handlers.daemon_id().to_string(),
        hostname: handlers.hostname.clone(),
        public_key: String::new(),
    })
}

/// No peer id accepted on the wire (`Request::SyncStatus` takes no
/// fields), so this aggregates across every known peer: the highest
/// `last_synced_seq` and the first peer currently reporting an error.
pub fn status<C: Clock + 'static>(handlers: &Handlers<C>) -> Result<Response, ThrumError> {
    let peer_ids: Vec<DaemonId> = handlers.state.read(|s| s.peers.keys().copied().collect());
    let mut last_synced_seq = 0;
    let mut last_error = None;
    for peer_id in peer_ids {
        last_synced_seq = last_synced_seq.max(handlers.sync.last_synced_seq(peer_id));
        if last_error.is_none() {
            last_error = handlers.sync.last_error(peer_id);
        }
    }
    Ok(Response::SyncStatus { last_synced_seq, last_error })
}

#[cfg(test)]
#[path = "sync_tests.rs"]
mod tests;
