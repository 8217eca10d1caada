//! Session tracking (spec §3 Session, §4.3 session.* handlers).

use crate::agent::AgentId;
use crate::scope::{Ref, Scope};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

crate::define_id! {
    /// A session identifies one continuous working period of an agent.
    pub struct SessionId("ses_");
}

/// Why a session ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    Normal,
    CrashRecovered,
    Kicked,
}

impl Default for EndReason {
    fn default() -> Self {
        EndReason::Normal
    }
}

/// Exactly one active session may exist per agent at a time (invariant 3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub session_id: SessionId,
    pub agent_id: AgentId,
    pub started_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_reason: Option<EndReason>,
    pub last_seen_at: DateTime<Utc>,
    #[serde(default)]
    pub scopes: HashSet<Scope>,
    #[serde(default)]
    pub refs: HashSet<Ref>,
}

impl Session {
    pub fn is_active(&self) -> bool {
        self.ended_at.is_none()
    }

    pub fn worktree_path(&self) -> Option<&str> {
        self.refs.iter().find(|r| r.kind == "worktree").map(|r| r.value.as_str())
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
