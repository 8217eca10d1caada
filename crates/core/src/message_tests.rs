use super::*;
use crate::clock::{Clock, FakeClock};

#[test]
fn content_str_decodes_utf8_bytes() {
    let clock = FakeClock::new();
    let m = Message {
        message_id: MessageId::new(),
        sender_agent_id: AgentId::derive("repo", "engineer", "auth", None),
        session_id: SessionId::new(),
        content: b"hello".to_vec(),
        created_at: clock.event_timestamp(),
        thread_id: None,
        reply_to: None,
        deleted: false,
        scopes: Default::default(),
        refs: Default::default(),
        mentions: Default::default(),
    };
    assert_eq!(m.content_str(), "hello");
}

#[test]
fn thread_id_has_its_own_prefix() {
    let id = ThreadId::new();
    assert!(id.as_str().starts_with("thr_"));
}
