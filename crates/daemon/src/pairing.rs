//! Short-lived, code-verified pairing handshake (spec §4.5).
//!
//! `peer.start_pairing` mints a code and a [`PendingAttempt`] whose result
//! channel `peer.wait_pairing` blocks on; `pair.request` (driven by the
//! joining side) verifies the code and completes that channel.

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use thrum_core::{DaemonId, PairingAttempt, ThrumError};
use tokio::sync::oneshot;

/// Identity exchanged once a pairing handshake completes.
#[derive(Debug, Clone)]
pub struct JoinedPeer {
    pub daemon_id: DaemonId,
    pub name: String,
    pub address: String,
    pub token: String,
}

struct PendingAttempt {
    attempt: PairingAttempt,
    result_tx: Option<oneshot::Sender<JoinedPeer>>,
}

/// One in-flight pairing attempt at a time per daemon — starting a new one
/// replaces any prior attempt, matching the spec's single `PairingAttempt`
/// (not a collection).
#[derive(Default)]
pub struct PairingManager {
    current: Mutex<Option<PendingAttempt>>,
}

impl PairingManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// `peer.start_pairing`: generate a `digits`-digit code (6-8 per spec
    /// §4.5 / SPEC_FULL.md §3) and open a fresh attempt.
    pub fn start(
        &self,
        self_daemon_id: DaemonId,
        digits: u32,
        timeout: Duration,
        now: DateTime<Utc>,
    ) -> (PairingAttempt, oneshot::Receiver<JoinedPeer>) {
        let code = generate_code(digits);
        let attempt = PairingAttempt {
            peer_daemon_id: self_daemon_id,
            code,
            created_at: now,
            expires_at: now + timeout,
        };
        let (tx, rx) = oneshot::channel();
        *self.current.lock() =
            Some(PendingAttempt { attempt: attempt.clone(), result_tx: Some(tx) });
        (attempt, rx)
    }

    /// `pair.request`: verify `code` against the active attempt (constant
    /// time, via [`PairingAttempt::code_matches`]) and complete it with the
    /// joiner's identity.
    pub fn complete(&self, code: &str, joined: JoinedPeer, now: DateTime<Utc>) -> Result<(), ThrumError> {
        let mut guard = self.current.lock();
        let pending = guard.as_mut().ok_or_else(|| {
            ThrumError::invalid_request("no pairing attempt in progress")
        })?;

        if pending.attempt.is_expired(now) {
            *guard = None;
            return Err(ThrumError::timeout("pairing attempt expired"));
        }
        if !pending.attempt.code_matches(code) {
            return Err(ThrumError::invalid_request("pairing code did not match"));
        }

        let tx = pending.result_tx.take().ok_or_else(|| {
            ThrumError::conflict("pairing attempt already completed")
        })?;
        let _ = tx.send(joined);
        *guard = None;
        Ok(())
    }

    /// Whether a pairing attempt is currently open (used by `sync.status`
    /// style introspection and tests).
    pub fn is_pending(&self) -> bool {
        self.current.lock().is_some()
    }
}

const DIGIT_ALPHABET: [char; 10] = ['0', '1', '2', '3', '4', '5', '6', '7', '8', '9'];

fn generate_code(digits: u32) -> String {
    let digits = digits.clamp(6, 8) as usize;
    nanoid::nanoid!(digits, &DIGIT_ALPHABET)
}

#[cfg(test)]
#[path = "pairing_tests.rs"]
mod tests;
