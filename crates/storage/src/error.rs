//! The error type callers outside this crate see; internal modules keep
//! their own narrower error enums and convert into this one at the
//! boundary.

use crate::migration::MigrationError;
use crate::snapshot::SnapshotError;
use crate::wal::WalError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("journal error: {0}")]
    Wal(#[from] WalError),
    #[error("snapshot error: {0}")]
    Snapshot(#[from] SnapshotError),
    #[error("migration error: {0}")]
    Migration(#[from] MigrationError),
}
