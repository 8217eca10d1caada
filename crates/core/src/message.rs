//! Messages and threads (spec §3 Message, invariant 3 on `reply_to`).

use crate::agent::AgentId;
use crate::scope::{MentionTarget, Ref, Scope};
use crate::session::SessionId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

crate::define_id! {
    pub struct MessageId("msg_");
}

crate::define_id! {
    pub struct ThreadId("thr_");
}

/// A message sent by an agent within an active session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub message_id: MessageId,
    pub sender_agent_id: AgentId,
    pub session_id: SessionId,
    pub content: Vec<u8>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thread_id: Option<ThreadId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<MessageId>,
    #[serde(default)]
    pub deleted: bool,
    #[serde(default)]
    pub scopes: HashSet<Scope>,
    #[serde(default)]
    pub refs: HashSet<Ref>,
    #[serde(default)]
    pub mentions: HashSet<MentionTarget>,
}

impl Message {
    pub fn content_str(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.content)
    }
}

#[cfg(test)]
#[path = "message_tests.rs"]
mod tests;
