//! This daemon's own identity: a `DaemonId` that must stay stable across
//! restarts (it is the key peers index their `last_synced_seq` under) and
//! the hostname reported by `sync.peer_info`.

use std::path::Path;
use thrum_core::DaemonId;

/// Load the daemon id from `path`, minting and persisting a fresh one if
/// this is the first run in this state directory.
pub fn load_or_create(path: &Path) -> std::io::Result<DaemonId> {
    match std::fs::read_to_string(path) {
        Ok(contents) => Ok(DaemonId::from_string(contents.trim().to_string())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            let id = DaemonId::new();
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, id.as_str())?;
            Ok(id)
        }
        Err(e) => Err(e),
    }
}

pub fn hostname() -> String {
    hostname_from_env().unwrap_or_else(|| "unknown-host".to_string())
}

fn hostname_from_env() -> Option<String> {
    std::env::var("HOSTNAME").ok().or_else(|| {
        let output = std::process::Command::new("hostname").output().ok()?;
        if output.status.success() {
            Some(String::from_utf8_lossy(&output.stdout).trim().to_string())
        } else {
            None
        }
    })
}
