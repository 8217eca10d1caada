//! Outbound peer RPC: the client side of `pair.request` and `sync.*`,
//! dialed by [`crate::pairing`] (joining side) and [`crate::sync_loop`]
//! (pull scheduler). Spec §1 excludes the concrete transport's security
//! properties (mTLS/overlay termination) from core scope; this is a bare
//! TCP dial using the same length-prefixed JSON framing as the client
//! listener.

use async_trait::async_trait;
use thrum_core::{DaemonId, Event};
use thrum_wire::{read_message, write_message, Request, Response};
use tokio::net::TcpStream;

use crate::error::DaemonError;

#[derive(Debug, Clone)]
pub struct PairResponse {
    pub daemon_id: DaemonId,
    pub name: String,
    pub token: String,
}

#[derive(Debug, Clone)]
pub struct SyncBatch {
    pub events: Vec<Event>,
    pub next_sequence: u64,
    pub more_available: bool,
}

/// Outbound peer RPC client. A trait so [`crate::sync_loop::SyncLoop`] and
/// [`crate::pairing`] tests can substitute an in-memory fake instead of
/// opening real sockets.
#[async_trait]
pub trait PeerClient: Send + Sync {
    async fn pair_request(
        &self,
        address: &str,
        code: &str,
        daemon_id: DaemonId,
        name: &str,
        my_address: &str,
    ) -> Result<PairResponse, DaemonError>;

    async fn sync_pull(
        &self,
        address: &str,
        token: &str,
        after_sequence: u64,
        max_batch: u32,
    ) -> Result<SyncBatch, DaemonError>;

    async fn sync_notify(
        &self,
        address: &str,
        token: &str,
        daemon_id: DaemonId,
        latest_seq: u64,
        event_count: u64,
    ) -> Result<String, DaemonError>;
}

/// Bare-TCP implementation of [`PeerClient`], reusing the wire crate's
/// length-prefixed framing.
pub struct TcpPeerClient;

async fn roundtrip(address: &str, request: &Request) -> Result<Response, DaemonError> {
    let mut stream = TcpStream::connect(address).await?;
    let payload = thrum_wire::encode(request)?;
    write_message(&mut stream, &payload).await?;
    let response_bytes = read_message(&mut stream).await?;
    Ok(thrum_wire::decode(&response_bytes)?)
}

#[async_trait]
impl PeerClient for TcpPeerClient {
    async fn pair_request(
        &self,
        address: &str,
        code: &str,
        daemon_id: DaemonId,
        name: &str,
        my_address: &str,
    ) -> Result<PairResponse, DaemonError> {
        let request = Request::PairRequest {
            code: code.to_string(),
            daemon_id: daemon_id.to_string(),
            name: name.to_string(),
            address: my_address.to_string(),
        };
        match roundtrip(address, &request).await? {
            Response::Paired { daemon_id, name, token } => {
                Ok(PairResponse { daemon_id: DaemonId::from_string(daemon_id), name, token })
            }
            Response::Error { error } => {
                Err(DaemonError::Handler(thrum_core::ThrumError::new(
                    error_kind_from_code(&error.code),
                    error.message,
                )))
            }
            other => Err(DaemonError::Handler(thrum_core::ThrumError::internal(format!(
                "unexpected response to pair.request: {other:?}"
            )))),
        }
    }

    async fn sync_pull(
        &self,
        address: &str,
        token: &str,
        after_sequence: u64,
        max_batch: u32,
    ) -> Result<SyncBatch, DaemonError> {
        let request = Request::SyncPull { token: token.to_string(), after_sequence, max_batch };
        match roundtrip(address, &request).await? {
            Response::SyncBatch { events, next_sequence, more_available } => {
                let events = events
                    .into_iter()
                    .map(Event::try_from)
                    .collect::<Result<Vec<Event>, _>>()
                    .map_err(|e| DaemonError::Protocol(thrum_wire::ProtocolError::Json(e)))?;
                Ok(SyncBatch { events, next_sequence, more_available })
            }
            Response::Error { error } => {
                Err(DaemonError::Handler(thrum_core::ThrumError::new(
                    error_kind_from_code(&error.code),
                    error.message,
                )))
            }
            other => Err(DaemonError::Handler(thrum_core::ThrumError::internal(format!(
                "unexpected response to sync.pull: {other:?}"
            )))),
        }
    }

    async fn sync_notify(
        &self,
        address: &str,
        token: &str,
        daemon_id: DaemonId,
        latest_seq: u64,
        event_count: u64,
    ) -> Result<String, DaemonError> {
        let request = Request::SyncNotify {
            token: token.to_string(),
            daemon_id: daemon_id.to_string(),
            latest_seq,
            event_count,
        };
        match roundtrip(address, &request).await? {
            Response::SyncNotifyAck { status } => Ok(status),
            Response::Error { error } => {
                Err(DaemonError::Handler(thrum_core::ThrumError::new(
                    error_kind_from_code(&error.code),
                    error.message,
                )))
            }
            other => Err(DaemonError::Handler(thrum_core::ThrumError::internal(format!(
                "unexpected response to sync.notify: {other:?}"
            )))),
        }
    }
}

fn error_kind_from_code(code: &str) -> thrum_core::ErrorKind {
    use thrum_core::ErrorKind::*;
    match code {
        "invalid_request" => InvalidRequest,
        "not_found" => NotFound,
        "conflict" => Conflict,
        "protected" => Protected,
        "auth" => Auth,
        "io" => Io,
        "timeout" => Timeout,
        _ => Internal,
    }
}
