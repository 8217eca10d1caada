//! `peer.start_pairing` / `join` / `wait_pairing` / `remove` and the
//! server side of the handshake, `pair.request` (spec §4.5).

use thrum_core::{Clock, DaemonId, EventBody, ThrumError};
use thrum_wire::Response;

use super::Handlers;
use crate::pairing::JoinedPeer;

const PAIRING_CODE_DIGITS: u32 = 6;

pub fn start_pairing<C: Clock + 'static>(handlers: &Handlers<C>) -> Result<Response, ThrumError> {
    let now = handlers.clock.event_timestamp();
    let timeout = chrono::Duration::seconds(handlers.config.pairing_timeout_secs as i64);
    let (attempt, rx) =
        handlers.pairing.start(handlers.daemon_id(), PAIRING_CODE_DIGITS, timeout, now);
    *handlers.pairing_rx.lock() = Some(rx);
    Ok(Response::PairingStarted { code: attempt.code, expires_at: attempt.expires_at })
}

pub async fn join<C: Clock + 'static>(
    handlers: &Handlers<C>,
    address: &str,
    code: &str,
) -> Result<Response, ThrumError> {
    let response = handlers
        .peer_client
        .pair_request(address, code, handlers.daemon_id(), &handlers.hostname, &handlers.my_address)
        .await
        .map_err(|e| ThrumError::internal(e.to_string()))?;

    let paired_at = handlers.clock.event_timestamp();
    handlers.commit(EventBody::PeerPair {
        peer_daemon_id: response.daemon_id,
        repo_id: handlers.config.repo_id.clone(),
        address: address.to_string(),
        paired_at,
    })?;
    handlers.peer_registry.set_token(response.daemon_id, response.token.clone());
    handlers.peer_registry.set_name(response.daemon_id, response.name.clone());

    Ok(Response::Paired {
        daemon_id: response.daemon_id.to_string(),
        name: response.name,
        token: response.token,
    })
}

pub async fn wait_pairing<C: Clock + 'static>(handlers: &Handlers<C>) -> Result<Response, ThrumError> {
    let rx = handlers
        .pairing_rx
        .lock()
        .take()
        .ok_or_else(|| ThrumError::invalid_request("no pairing attempt in progress"))?;
    let joined: JoinedPeer =
        rx.await.map_err(|_| ThrumError::timeout("pairing attempt was cancelled or expired"))?;

    Ok(Response::Paired {
        daemon_id: joined.daemon_id.to_string(),
        name: joined.name,
        token: joined.token,
    })
}

pub fn remove<C: Clock + 'static>(
    handlers: &Handlers<C>,
    name: Option<String>,
    daemon_id: Option<String>,
) -> Result<Response, ThrumError> {
    let peer_daemon_id = match (daemon_id, name) {
        (Some(id), _) => DaemonId::from_string(id),
        (None, Some(name)) => handlers
            .peer_registry
            .peer_by_name(&name)
            .ok_or_else(|| ThrumError::not_found(format!("peer not found: {name}")))?,
        (None, None) => {
            return Err(ThrumError::invalid_request("peer.remove requires name or daemon_id"))
        }
    };
    handlers.commit(EventBody::PeerRemove { peer_daemon_id })?;
    handlers.peer_registry.revoke(peer_daemon_id);
    Ok(Response::Ok)
}

/// Server side of the handshake, driven by the joining daemon's
/// [`join`] call: verify the code, mint a bearer token for the joiner to
/// present on future `sync.*` calls, and record the peer as paired.
pub fn pair_request<C: Clock + 'static>(
    handlers: &Handlers<C>,
    code: &str,
    daemon_id: &str,
    name: &str,
    address: &str,
) -> Result<Response, ThrumError> {
    let joiner_daemon_id = DaemonId::from_string(daemon_id);
    let now = handlers.clock.event_timestamp();
    let token = crate::peer_registry::mint_token();
    handlers.pairing.complete(
        code,
        JoinedPeer {
            daemon_id: joiner_daemon_id,
            name: name.to_string(),
            address: address.to_string(),
            token: token.clone(),
        },
        now,
    )?;

    handlers.commit(EventBody::PeerPair {
        peer_daemon_id: joiner_daemon_id,
        repo_id: handlers.config.repo_id.clone(),
        address: address.to_string(),
        paired_at: now,
    })?;
    handlers.peer_registry.set_token(joiner_daemon_id, token.clone());
    handlers.peer_registry.set_name(joiner_daemon_id, name.to_string());

    Ok(Response::Paired { daemon_id: handlers.daemon_id().to_string(), name: handlers.hostname.clone(), token })
}

#[cfg(test)]
#[path = "peer_tests.rs"]
mod tests;
