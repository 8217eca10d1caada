use super::*;
use chrono::Utc;

#[test]
fn everyone_group_id_is_stable() {
    assert_eq!(everyone_group_id(), everyone_group_id());
    assert_eq!(everyone_group_id().as_str(), "grp_everyone");
}

#[test]
fn is_everyone_detects_the_reserved_group() {
    let everyone = Group {
        group_id: everyone_group_id(),
        name: EVERYONE_GROUP_NAME.to_string(),
        description: String::new(),
        created_at: Utc::now(),
        members: [Member::role("*")].into_iter().collect(),
    };
    assert!(everyone.is_everyone());

    let other = Group {
        group_id: GroupId::new(),
        name: "engineering".to_string(),
        description: String::new(),
        created_at: Utc::now(),
        members: Default::default(),
    };
    assert!(!other.is_everyone());
}

#[test]
fn member_helpers_set_expected_kind() {
    assert_eq!(Member::agent("a").kind, MemberKind::Agent);
    assert_eq!(Member::role("r").kind, MemberKind::Role);
    assert_eq!(Member::group("g").kind, MemberKind::Group);
}
