use super::*;

#[test]
fn filter_variants_round_trip_through_json() {
    let filters = vec![
        Filter::Scope { scope: Scope::module("auth") },
        Filter::MentionRole { role: "lead".into() },
        Filter::MentionAgent { agent_id: "agt_x".into() },
        Filter::All,
    ];
    for f in filters {
        let json = serde_json::to_string(&f).unwrap();
        let back: Filter = serde_json::from_str(&json).unwrap();
        assert_eq!(f, back);
    }
}
