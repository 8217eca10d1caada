//! Accept loops for the two transports the daemon serves (spec §4.1,
//! §9): a Unix socket for local CLI/agent clients, and a bare TCP
//! listener for `pair.request` / `sync.*` calls from paired peers.
//!
//! Both feed the same [`crate::handlers::dispatch`] — peers and local
//! clients speak the same framed [`Request`]/[`Response`] protocol, just
//! over different sockets, each connection getting its own fresh
//! [`ConnectionState`].

use std::sync::Arc;

use thrum_core::Clock;
use thrum_wire::{read_request, write_response, ProtocolError};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::{TcpListener, UnixListener};
use tracing::{debug, warn};

use crate::connection::ConnectionState;
use crate::handlers::{dispatch, Handlers};

/// Serve local client connections on a Unix domain socket until the
/// listener errors. The socket file is created by `bind`; the caller is
/// responsible for removing a stale one left behind by an unclean exit.
pub async fn serve_unix<C: Clock + 'static>(
    listener: UnixListener,
    handlers: Arc<Handlers<C>>,
) -> std::io::Result<()> {
    loop {
        let (stream, _addr) = listener.accept().await?;
        let handlers = handlers.clone();
        tokio::spawn(async move {
            serve_connection(stream, handlers).await;
        });
    }
}

/// Serve peer connections on a bare TCP listener (spec §1 Non-goals:
/// transport security such as mTLS is out of scope; authorization is the
/// bearer token carried in each `sync.*`/`pair.request` payload).
pub async fn serve_tcp<C: Clock + 'static>(
    listener: TcpListener,
    handlers: Arc<Handlers<C>>,
) -> std::io::Result<()> {
    loop {
        let (stream, addr) = listener.accept().await?;
        debug!(peer = %addr, "accepted peer connection");
        let handlers = handlers.clone();
        tokio::spawn(async move {
            serve_connection(stream, handlers).await;
        });
    }
}

async fn serve_connection<S, C>(mut stream: S, handlers: Arc<Handlers<C>>)
where
    S: AsyncRead + AsyncWrite + Unpin,
    C: Clock + 'static,
{
    let conn = ConnectionState::new();
    loop {
        let request = match read_request(&mut stream).await {
            Ok(request) => request,
            Err(ProtocolError::Io(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => return,
            Err(e) => {
                warn!(error = %e, "failed to read request, closing connection");
                return;
            }
        };

        let response = dispatch(&handlers, &conn, request).await;
        if let Err(e) = write_response(&mut stream, &response).await {
            warn!(error = %e, "failed to write response, closing connection");
            return;
        }
    }
}
