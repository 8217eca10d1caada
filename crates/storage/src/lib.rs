#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! thrum-storage: the durable event journal, materialized state, and
//! snapshot persistence backing a single daemon's copy of the log.

pub mod error;
pub mod migration;
pub mod snapshot;
pub mod state;
pub mod wal;

pub use error::StorageError;
pub use migration::{Migration, MigrationError, MigrationRegistry};
pub use snapshot::{Snapshot, SnapshotError, CURRENT_SNAPSHOT_VERSION};
pub use state::MaterializedState;
pub use wal::{Wal, WalEntry, WalError};
