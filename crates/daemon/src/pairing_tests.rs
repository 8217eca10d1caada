use super::*;
use chrono::Duration as ChronoDuration;
use thrum_core::DaemonId;

fn now() -> DateTime<Utc> {
    DateTime::from_timestamp(1_700_000_000, 0).unwrap()
}

#[test]
fn start_generates_code_of_requested_length() {
    let manager = PairingManager::new();
    let (attempt, _rx) = manager.start(DaemonId::new(), 6, ChronoDuration::minutes(5), now());
    assert_eq!(attempt.code.len(), 6);
    assert!(attempt.code.chars().all(|c| c.is_ascii_digit()));
}

#[tokio::test]
async fn complete_with_matching_code_resolves_wait_pairing() {
    let manager = PairingManager::new();
    let (attempt, rx) = manager.start(DaemonId::new(), 6, ChronoDuration::minutes(5), now());

    let joined = JoinedPeer {
        daemon_id: DaemonId::new(),
        name: "peer-a".to_string(),
        address: "127.0.0.1:9000".to_string(),
        token: "tok".to_string(),
    };
    manager.complete(&attempt.code, joined.clone(), now()).unwrap();

    let resolved = rx.await.unwrap();
    assert_eq!(resolved.daemon_id, joined.daemon_id);
    assert!(!manager.is_pending());
}

#[test]
fn complete_with_wrong_code_is_rejected_and_attempt_survives() {
    let manager = PairingManager::new();
    let (_attempt, _rx) = manager.start(DaemonId::new(), 6, ChronoDuration::minutes(5), now());

    let joined = JoinedPeer {
        daemon_id: DaemonId::new(),
        name: "peer-a".to_string(),
        address: "addr".to_string(),
        token: "tok".to_string(),
    };
    let err = manager.complete("000000", joined, now()).unwrap_err();
    assert_eq!(err.kind, thrum_core::ErrorKind::InvalidRequest);
    assert!(manager.is_pending());
}

#[test]
fn complete_after_expiry_times_out() {
    let manager = PairingManager::new();
    let (attempt, _rx) = manager.start(DaemonId::new(), 6, ChronoDuration::minutes(5), now());

    let joined = JoinedPeer {
        daemon_id: DaemonId::new(),
        name: "peer-a".to_string(),
        address: "addr".to_string(),
        token: "tok".to_string(),
    };
    let later = now() + ChronoDuration::minutes(6);
    let err = manager.complete(&attempt.code, joined, later).unwrap_err();
    assert_eq!(err.kind, thrum_core::ErrorKind::Timeout);
    assert!(!manager.is_pending());
}

#[test]
fn complete_with_no_attempt_in_progress_is_invalid() {
    let manager = PairingManager::new();
    let joined = JoinedPeer {
        daemon_id: DaemonId::new(),
        name: "peer-a".to_string(),
        address: "addr".to_string(),
        token: "tok".to_string(),
    };
    let err = manager.complete("123456", joined, now()).unwrap_err();
    assert_eq!(err.kind, thrum_core::ErrorKind::InvalidRequest);
}
