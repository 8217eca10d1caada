//! Shared test helpers for use across crates.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`.

use crate::agent::{Agent, AgentId, AgentKind};
use crate::event::{Event, EventBody, EventId};
use crate::group::{Group, GroupId, Member};
use crate::message::Message;
use crate::peer::DaemonId;
use crate::session::{EndReason, Session, SessionId};
use chrono::Utc;
use std::collections::HashSet;

/// Proptest strategies for core state machine types.
#[cfg(any(test, feature = "proptest"))]
pub mod strategies {
    use crate::event::EventBody;
    use crate::group::Member;
    use proptest::prelude::*;

    pub fn arb_member() -> impl Strategy<Value = Member> {
        prop_oneof![
            "[a-z]{3,8}".prop_map(Member::agent),
            "[a-z]{3,8}".prop_map(Member::role),
            "[a-z]{3,8}".prop_map(Member::group),
        ]
    }

    /// A same-origin sequence of events with strictly increasing `seq`,
    /// as `MaterializedState::replay` expects.
    pub fn arb_seq_sequence(len: usize) -> impl Strategy<Value = Vec<u64>> {
        Just((1..=len as u64).collect::<Vec<_>>())
    }

    pub fn arb_group_create() -> impl Strategy<Value = EventBody> {
        ("[a-z]{3,10}", proptest::collection::vec(arb_member(), 0..5)).prop_map(
            |(name, members)| EventBody::GroupCreate {
                group_id: crate::group::GroupId::new(),
                name,
                description: String::new(),
                created_at: chrono::Utc::now(),
                members,
            },
        )
    }
}

// ── Domain builders ──────────────────────────────────────────────────────

pub fn test_agent(repo_id: &str, role: &str, module: &str) -> Agent {
    Agent {
        agent_id: AgentId::derive(repo_id, role, module, None),
        repo_id: repo_id.to_string(),
        role: role.to_string(),
        module: module.to_string(),
        name: None,
        display: None,
        kind: AgentKind::Tool,
    }
}

pub fn test_session(agent_id: AgentId) -> Session {
    let now = Utc::now();
    Session {
        session_id: SessionId::new(),
        agent_id,
        started_at: now,
        ended_at: None,
        end_reason: None,
        last_seen_at: now,
        scopes: HashSet::new(),
        refs: HashSet::new(),
    }
}

pub fn ended_session(agent_id: AgentId) -> Session {
    let mut session = test_session(agent_id);
    let now = Utc::now();
    session.ended_at = Some(now);
    session.end_reason = Some(EndReason::Normal);
    session
}

pub fn test_message(sender_agent_id: AgentId, session_id: SessionId, content: &str) -> Message {
    Message {
        message_id: crate::message::MessageId::new(),
        sender_agent_id,
        session_id,
        content: content.as_bytes().to_vec(),
        created_at: Utc::now(),
        thread_id: None,
        reply_to: None,
        deleted: false,
        scopes: HashSet::new(),
        refs: HashSet::new(),
        mentions: HashSet::new(),
    }
}

pub fn test_group(name: &str, members: Vec<Member>) -> Group {
    Group {
        group_id: GroupId::new(),
        name: name.to_string(),
        description: String::new(),
        created_at: Utc::now(),
        members: members.into_iter().collect(),
    }
}

/// Wraps an `EventBody` in an `Event` with fresh ids, as if freshly
/// appended by the local daemon.
pub fn local_event(origin: DaemonId, seq: u64, body: EventBody) -> Event {
    let event_id = EventId::new();
    Event {
        seq,
        event_id,
        origin_daemon_id: origin,
        origin_event_id: event_id,
        recorded_at: Utc::now(),
        body,
    }
}

pub fn agent_register_event(origin: DaemonId, seq: u64, agent: &Agent) -> Event {
    local_event(
        origin,
        seq,
        EventBody::AgentRegister {
            agent_id: agent.agent_id,
            repo_id: agent.repo_id.clone(),
            role: agent.role.clone(),
            module: agent.module.clone(),
            name: agent.name.clone(),
            display: agent.display.clone(),
            kind: agent.kind,
        },
    )
}

pub fn session_start_event(origin: DaemonId, seq: u64, session: &Session) -> Event {
    local_event(
        origin,
        seq,
        EventBody::SessionStart {
            session_id: session.session_id,
            agent_id: session.agent_id,
            started_at: session.started_at,
            scopes: session.scopes.iter().cloned().collect(),
            refs: session.refs.iter().cloned().collect(),
        },
    )
}

pub fn message_send_event(origin: DaemonId, seq: u64, message: &Message) -> Event {
    local_event(
        origin,
        seq,
        EventBody::MessageSend {
            message_id: message.message_id,
            sender_agent_id: message.sender_agent_id,
            session_id: message.session_id,
            content: message.content.clone(),
            created_at: message.created_at,
            thread_id: message.thread_id,
            reply_to: message.reply_to,
            scopes: message.scopes.iter().cloned().collect(),
            refs: message.refs.iter().cloned().collect(),
            mentions: message.mentions.iter().cloned().collect(),
        },
    )
}
