use super::*;

#[test]
fn derive_is_deterministic_for_same_tuple() {
    let a = AgentId::derive("repo1", "engineer", "auth", Some("alice"));
    let b = AgentId::derive("repo1", "engineer", "auth", Some("alice"));
    assert_eq!(a, b);
}

#[test]
fn derive_differs_when_any_component_differs() {
    let base = AgentId::derive("repo1", "engineer", "auth", Some("alice"));
    assert_ne!(base, AgentId::derive("repo2", "engineer", "auth", Some("alice")));
    assert_ne!(base, AgentId::derive("repo1", "reviewer", "auth", Some("alice")));
    assert_ne!(base, AgentId::derive("repo1", "engineer", "billing", Some("alice")));
    assert_ne!(base, AgentId::derive("repo1", "engineer", "auth", Some("bob")));
    assert_ne!(base, AgentId::derive("repo1", "engineer", "auth", None));
}

#[test]
fn derive_produces_ids_carrying_the_agent_prefix() {
    let id = AgentId::derive("repo1", "engineer", "auth", None);
    assert!(id.as_str().starts_with("agt_"));
}

#[test]
fn agent_kind_defaults_to_tool() {
    assert_eq!(AgentKind::default(), AgentKind::Tool);
}
