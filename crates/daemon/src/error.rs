//! The daemon's top-level error type: everything that can go wrong
//! starting up or servicing a connection, layered over the narrower
//! errors each dependency crate already defines.

use thiserror::Error;
use thrum_core::ThrumError;
use thrum_storage::StorageError;
use thrum_wire::ProtocolError;

#[derive(Debug, Error)]
pub enum DaemonError {
    #[error("config error: {0}")]
    Config(#[from] crate::config::ConfigError),
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),
    #[error("handler error: {0}")]
    Handler(#[from] ThrumError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("another daemon instance holds the lock file: {0}")]
    LockHeld(std::io::Error),
}
