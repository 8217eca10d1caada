//! Daemon configuration: a TOML file owned by the `thrumd` binary, with
//! environment overrides for the handful of values operators commonly
//! need to change without editing the file (state directory, log level).

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const PROTOCOL_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not determine a state directory: set THRUM_STATE_DIR or HOME")]
    NoStateDir,
    #[error("failed to read config file {path}: {source}")]
    Read { path: PathBuf, source: std::io::Error },
    #[error("failed to parse config file {path}: {source}")]
    Parse { path: PathBuf, source: toml::de::Error },
}

/// On-disk configuration for one repository's daemon instance.
///
/// Every field has a default, so an empty or absent TOML file is valid —
/// only the values an operator wants to override need to be present.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DaemonConfig {
    /// Identifies the repository this daemon coordinates, used in derived
    /// agent ids (spec §3 Agent).
    pub repo_id: String,
    /// How long a `sync.notify` debounce window stays open before
    /// triggering a pull (spec §4.4).
    pub sync_debounce_ms: u64,
    /// Max events returned per `sync.pull` batch.
    pub sync_max_batch: u32,
    /// How long a pairing code remains valid (spec §4.5).
    pub pairing_timeout_secs: u64,
    /// Staleness window for dropping ended sessions' work contexts
    /// (spec §9 Open Question).
    pub work_context_staleness_hours: i64,
    /// How many WAL entries accumulate before a snapshot is taken.
    pub snapshot_every_n_events: u64,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            repo_id: String::new(),
            sync_debounce_ms: 2000,
            sync_max_batch: 1000,
            pairing_timeout_secs: 300,
            work_context_staleness_hours: 24,
            snapshot_every_n_events: 500,
        }
    }
}

impl DaemonConfig {
    pub fn sync_debounce(&self) -> Duration {
        Duration::from_millis(self.sync_debounce_ms)
    }

    pub fn pairing_timeout(&self) -> Duration {
        Duration::from_secs(self.pairing_timeout_secs)
    }

    pub fn work_context_staleness(&self) -> chrono::Duration {
        chrono::Duration::hours(self.work_context_staleness_hours)
    }

    /// Load from `path`, or return the default config if the file doesn't
    /// exist yet (a fresh repository with no prior `thrumd` run).
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(contents) => toml::from_str(&contents)
                .map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(source) => Err(ConfigError::Read { path: path.to_path_buf(), source }),
        }
    }
}

/// Filesystem layout for one daemon instance's durable state, rooted at
/// `state_dir` (default `$THRUM_STATE_DIR` or `~/.local/state/thrum/<repo>`).
#[derive(Debug, Clone)]
pub struct Paths {
    pub state_dir: PathBuf,
    pub socket_path: PathBuf,
    pub lock_path: PathBuf,
    pub wal_path: PathBuf,
    pub snapshot_path: PathBuf,
    pub config_path: PathBuf,
    pub context_dir: PathBuf,
    pub daemon_id_path: PathBuf,
}

impl Paths {
    pub fn resolve(repo_id: &str) -> Result<Self, ConfigError> {
        let state_dir = state_dir_root()?.join(repo_id);
        Ok(Self {
            socket_path: state_dir.join("daemon.sock"),
            lock_path: state_dir.join("daemon.lock"),
            wal_path: state_dir.join("events.wal"),
            snapshot_path: state_dir.join("snapshot.zst"),
            config_path: state_dir.join("config.toml"),
            context_dir: state_dir.join("context"),
            daemon_id_path: state_dir.join("daemon_id"),
            state_dir,
        })
    }
}

/// `THRUM_STATE_DIR` > `XDG_STATE_HOME/thrum` > `~/.local/state/thrum`.
fn state_dir_root() -> Result<PathBuf, ConfigError> {
    if let Ok(dir) = std::env::var("THRUM_STATE_DIR") {
        return Ok(PathBuf::from(dir));
    }
    if let Ok(xdg) = std::env::var("XDG_STATE_HOME") {
        return Ok(PathBuf::from(xdg).join("thrum"));
    }
    let home = dirs::home_dir().ok_or(ConfigError::NoStateDir)?;
    Ok(home.join(".local/state/thrum"))
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
