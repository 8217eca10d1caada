use super::*;

#[test]
fn scopes_with_same_kind_and_value_are_equal() {
    assert_eq!(Scope::module("auth"), Scope::module("auth"));
    assert_ne!(Scope::module("auth"), Scope::module("billing"));
    assert_ne!(Scope::module("auth"), Scope::group("auth"));
}

#[test]
fn scope_serializes_with_type_tag() {
    let s = Scope::group("engineering");
    let json = serde_json::to_value(&s).unwrap();
    assert_eq!(json["type"], "group");
    assert_eq!(json["value"], "engineering");
}

#[test]
fn ref_helpers_set_expected_kind() {
    assert_eq!(Ref::worktree("/repo").kind, "worktree");
    assert_eq!(Ref::reply_to("msg_1").kind, "reply_to");
}

#[test]
fn mention_target_helpers() {
    assert_eq!(MentionTarget::agent("a1").kind, MentionKind::Agent);
    assert_eq!(MentionTarget::role("lead").kind, MentionKind::Role);
    assert_eq!(MentionTarget::group("everyone").kind, MentionKind::Group);
}
