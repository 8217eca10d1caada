use super::*;
use thrum_core::DaemonId;

#[test]
fn set_token_resolves_both_directions() {
    let registry = PeerRegistry::new();
    let peer = DaemonId::new();
    registry.set_token(peer, "tok_abc".to_string());

    assert_eq!(registry.token_for(peer), Some("tok_abc".to_string()));
    assert_eq!(registry.peer_for_token("tok_abc"), Some(peer));
}

#[test]
fn revoke_clears_both_sides() {
    let registry = PeerRegistry::new();
    let peer = DaemonId::new();
    registry.set_token(peer, "tok_xyz".to_string());

    registry.revoke(peer);

    assert_eq!(registry.token_for(peer), None);
    assert_eq!(registry.peer_for_token("tok_xyz"), None);
}

#[test]
fn unknown_token_resolves_to_none() {
    let registry = PeerRegistry::new();
    assert_eq!(registry.peer_for_token("nope"), None);
}

#[test]
fn mint_token_produces_nonempty_unique_values() {
    let a = mint_token();
    let b = mint_token();
    assert!(!a.is_empty());
    assert_ne!(a, b);
}
