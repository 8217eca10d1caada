//! Snapshot persistence for crash recovery.
//!
//! Snapshots store the complete materialized state at a point in time,
//! identified by the journal sequence number. Recovery loads the snapshot
//! and replays journal entries after that sequence.

use crate::migration::{MigrationError, MigrationRegistry};
use crate::state::MaterializedState;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Current snapshot schema version.
pub const CURRENT_SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("compression error: {0}")]
    Zstd(std::io::Error),
    #[error("migration error: {0}")]
    Migration(#[from] MigrationError),
}

/// A snapshot of the materialized state at a point in time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    /// Schema version, for migrations.
    #[serde(rename = "v")]
    pub version: u32,
    /// Journal sequence number at the time of snapshot.
    pub seq: u64,
    /// The complete materialized state.
    pub state: MaterializedState,
    /// When this snapshot was created.
    pub created_at: DateTime<Utc>,
}

impl Snapshot {
    pub fn new(seq: u64, state: MaterializedState, created_at: DateTime<Utc>) -> Self {
        Self { version: CURRENT_SNAPSHOT_VERSION, seq, state, created_at }
    }

    /// Write as zstd-compressed JSON, rotating any existing file to `.bak`
    /// first so a crash mid-write never destroys the last good snapshot.
    pub fn save(&self, path: &Path) -> Result<(), SnapshotError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        if path.exists() {
            let bak = rotate_bak_path(path);
            fs::rename(path, bak)?;
        }

        let json = serde_json::to_vec(self)?;
        let tmp = path.with_extension("tmp");
        {
            let file = File::create(&tmp)?;
            let mut encoder =
                zstd::Encoder::new(BufWriter::new(file), 0).map_err(SnapshotError::Zstd)?;
            encoder.write_all(&json)?;
            let mut writer = encoder.finish().map_err(SnapshotError::Zstd)?;
            writer.flush()?;
        }
        fs::rename(&tmp, path)?;
        Ok(())
    }

    /// Load a snapshot from `path`, migrating forward to
    /// [`CURRENT_SNAPSHOT_VERSION`] if it was written by an older binary.
    pub fn load(path: &Path, migrations: &MigrationRegistry) -> Result<Self, SnapshotError> {
        let file = File::open(path)?;
        let mut decoder = zstd::Decoder::new(BufReader::new(file)).map_err(SnapshotError::Zstd)?;
        let mut json = Vec::new();
        decoder.read_to_end(&mut json)?;

        let value: serde_json::Value = serde_json::from_slice(&json)?;
        let migrated = migrations.migrate_to(value, CURRENT_SNAPSHOT_VERSION)?;
        Ok(serde_json::from_value(migrated)?)
    }
}

const MAX_BAK_FILES: u32 = 3;

/// Pick the next `.bak` / `.bak.N` path, rotating older backups out.
///
/// Keeps up to [`MAX_BAK_FILES`] backups: `.bak`, `.bak.2`, `.bak.3`. The
/// oldest backup is removed when the limit is reached.
pub(crate) fn rotate_bak_path(path: &Path) -> PathBuf {
    let bak = |n: u32| {
        if n == 1 {
            path.with_extension("bak")
        } else {
            path.with_extension(format!("bak.{n}"))
        }
    };

    let oldest = bak(MAX_BAK_FILES);
    if oldest.exists() {
        let _ = fs::remove_file(&oldest);
    }

    for n in (1..MAX_BAK_FILES).rev() {
        let src = bak(n);
        if src.exists() {
            let _ = fs::rename(&src, bak(n + 1));
        }
    }

    bak(1)
}

#[cfg(test)]
#[path = "snapshot_tests.rs"]
mod tests;
