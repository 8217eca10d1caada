//! RPC responses (spec §6): `{type: ..., ...}` on success, `{error: {code,
//! message}}` on failure — the latter handled by [`crate::ProtocolError`]
//! rather than folded into this enum.

use serde::{Deserialize, Serialize};
use thrum_core::{ErrorKind, Event, Member};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

impl ErrorBody {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self { code: kind.code().to_string(), message: message.into() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MessageSummary {
    pub message_id: String,
    pub sender_agent_id: String,
    pub content: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    #[serde(default)]
    pub thread_id: Option<String>,
    #[serde(default)]
    pub reply_to: Option<String>,
    #[serde(default)]
    pub deleted: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GroupSummary {
    pub group_id: String,
    pub name: String,
    pub description: String,
    pub members: Vec<Member>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EventEnvelope {
    pub seq: u64,
    pub event_id: String,
    pub origin_daemon_id: String,
    pub origin_event_id: String,
    pub recorded_at: chrono::DateTime<chrono::Utc>,
    pub body: serde_json::Value,
}

impl From<&Event> for EventEnvelope {
    fn from(event: &Event) -> Self {
        Self {
            seq: event.seq,
            event_id: event.event_id.to_string(),
            origin_daemon_id: event.origin_daemon_id.to_string(),
            origin_event_id: event.origin_event_id.to_string(),
            recorded_at: event.recorded_at,
            body: serde_json::to_value(&event.body).unwrap_or(serde_json::Value::Null),
        }
    }
}

impl TryFrom<EventEnvelope> for Event {
    type Error = serde_json::Error;

    fn try_from(envelope: EventEnvelope) -> Result<Self, Self::Error> {
        Ok(Event {
            seq: envelope.seq,
            event_id: envelope.event_id.into(),
            origin_daemon_id: envelope.origin_daemon_id.into(),
            origin_event_id: envelope.origin_event_id.into(),
            recorded_at: envelope.recorded_at,
            body: serde_json::from_value(envelope.body)?,
        })
    }
}

/// Responses returned by the daemon, tagged by kind.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Response {
    Ok,
    Pong,
    Hello { version: String },

    Error { error: ErrorBody },

    Agent { agent_id: String, repo_id: String, role: String, module: String },

    Session { session_id: String, agent_id: String },
    SessionEnded { session_id: String, duration_ms: i64 },
    Heartbeat { last_seen_at: chrono::DateTime<chrono::Utc> },

    MessageSent { message_id: String, thread_id: Option<String> },
    Message { message: Option<Box<MessageSummary>> },
    Messages { messages: Vec<MessageSummary>, next_cursor: Option<String> },
    MessageDeleted { message_id: String },

    Subscribed { subscription_id: u64, session_id: String },
    Unsubscribed { subscription_id: u64 },

    Group { group: Option<Box<GroupSummary>> },
    Groups { groups: Vec<GroupSummary> },
    GroupMembers { members: Vec<Member> },
    GroupDeleted { name: String, messages_deleted: usize },

    Context { content: Option<String> },

    PairingStarted { code: String, expires_at: chrono::DateTime<chrono::Utc> },
    Paired { daemon_id: String, name: String, token: String },

    SyncBatch { events: Vec<EventEnvelope>, next_sequence: u64, more_available: bool },
    SyncNotifyAck { status: String },
    SyncStatus { last_synced_seq: u64, last_error: Option<String> },
    PeerInfo { daemon_id: String, hostname: String, public_key: String },
}

#[cfg(test)]
#[path = "response_tests.rs"]
mod tests;
