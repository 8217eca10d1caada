use super::*;
use crate::test_support::test_handlers;
use thrum_core::EventBody;

fn paired_peer(handlers: &Handlers<thrum_core::FakeClock>, token: &str) -> DaemonId {
    let peer_daemon_id = DaemonId::new();
    handlers
        .commit(EventBody::PeerPair {
            peer_daemon_id,
            repo_id: "repo1".to_string(),
            address: "127.0.0.1:9001".to_string(),
            paired_at: handlers.clock.event_timestamp(),
        })
        .unwrap();
    handlers.peer_registry.set_token(peer_daemon_id, token.to_string());
    peer_daemon_id
}

#[test]
fn pull_rejects_an_unknown_token() {
    let (handlers, _dir) = test_handlers("repo1");
    let err = pull(&handlers, "nope", 0, 100).unwrap_err();
    assert_eq!(err.kind, thrum_core::ErrorKind::Auth);
}

#[test]
fn pull_returns_events_after_the_given_sequence() {
    let (handlers, _dir) = test_handlers("repo1");
    paired_peer(&handlers, "tok_abc");
    // paired_peer's own PeerPair commit is seq 1; add one more event.
    handlers
        .commit(EventBody::PeerRemove { peer_daemon_id: DaemonId::new() })
        .unwrap();

    let Response::SyncBatch { events, next_sequence, more_available } =
        pull(&handlers, "tok_abc", 0, 100).unwrap()
    else {
        panic!("expected Response::SyncBatch")
    };
    assert_eq!(events.len(), 2);
    assert_eq!(next_sequence, 2);
    assert!(!more_available);
}

#[test]
fn notify_rejects_a_token_daemon_id_mismatch() {
    let (handlers, _dir) = test_handlers("repo1");
    paired_peer(&handlers, "tok_abc");
    let impostor = DaemonId::new();

    let err = notify(&handlers, "tok_abc", &impostor.to_string(), 5, 1).unwrap_err();
    assert_eq!(err.kind, thrum_core::ErrorKind::Auth);
}

#[test]
fn notify_with_a_matching_token_acks_ok() {
    let (handlers, _dir) = test_handlers("repo1");
    let peer_daemon_id = paired_peer(&handlers, "tok_abc");

    let Response::SyncNotifyAck { status } =
        notify(&handlers, "tok_abc", &peer_daemon_id.to_string(), 5, 1).unwrap()
    else {
        panic!("expected Response::SyncNotifyAck")
    };
    assert_eq!(status, "ok");
}

#[test]
fn peer_info_reports_this_daemons_identity() {
    let (handlers, _dir) = test_handlers("repo1");
    let Response::PeerInfo { daemon_id, hostname, .. } = peer_info(&handlers).unwrap() else {
        panic!("expected Response::PeerInfo")
    };
    assert_eq!(daemon_id, handlers.daemon_id().to_string());
    assert_eq!(hostname, "test-host");
}

#[test]
fn status_with_no_peers_reports_zero_and_no_error() {
    let (handlers, _dir) = test_handlers("repo1");
    let Response::SyncStatus { last_synced_seq, last_error } = status(&handlers).unwrap() else {
        panic!("expected Response::SyncStatus")
    };
    assert_eq!(last_synced_seq, 0);
    assert!(last_error.is_none());
}
