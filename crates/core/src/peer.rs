//! Peer daemons and the pairing handshake (spec §3 Peer, §4.5 PairingFlow).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

crate::define_id! {
    /// Identifies one daemon instance, stable across restarts (persisted
    /// alongside the event log).
    pub struct DaemonId("dmn_");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeerStatus {
    Pending,
    Paired,
    Revoked,
}

/// A known peer daemon, paired or awaiting pairing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Peer {
    pub peer_daemon_id: DaemonId,
    pub repo_id: String,
    pub address: String,
    pub status: PeerStatus,
    pub paired_at: Option<DateTime<Utc>>,
    /// Event sequence number through which this peer's log has already
    /// been pulled; the next `sync.pull` resumes from here.
    #[serde(default)]
    pub last_pulled_seq: u64,
}

impl Peer {
    pub fn is_paired(&self) -> bool {
        matches!(self.status, PeerStatus::Paired)
    }
}

/// In-flight pairing code exchange (spec §4.5): short-lived, single-use,
/// verified by a human-readable code rather than a pre-shared secret.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PairingAttempt {
    pub peer_daemon_id: DaemonId,
    pub code: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl PairingAttempt {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Constant-time comparison so response timing doesn't leak how many
    /// leading digits of the code were guessed correctly.
    pub fn code_matches(&self, candidate: &str) -> bool {
        let a = self.code.as_bytes();
        let b = candidate.as_bytes();
        if a.len() != b.len() {
            return false;
        }
        a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
    }
}

#[cfg(test)]
#[path = "peer_tests.rs"]
mod tests;
