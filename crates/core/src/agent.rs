//! Agent identity and the deterministic `agent_id` hash (spec §3 Agent,
//! SPEC_FULL.md §3).

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

crate::define_id! {
    /// Deterministic identity of a principal: `agent_id = hash(repo_id, role, module, name)`.
    pub struct AgentId("agt_");
}

impl AgentId {
    /// Derive the deterministic id for `(repo_id, role, module, name)`.
    ///
    /// Registering the same tuple twice yields the same id, making
    /// `agent.register` idempotent unless the caller passes `force=true`.
    pub fn derive(repo_id: &str, role: &str, module: &str, name: Option<&str>) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(repo_id.as_bytes());
        hasher.update(b"\0");
        hasher.update(role.as_bytes());
        hasher.update(b"\0");
        hasher.update(module.as_bytes());
        hasher.update(b"\0");
        hasher.update(name.unwrap_or("").as_bytes());
        let digest = hasher.finalize();
        let hex = format!("{digest:x}");
        Self::from_string(format!("{}{}", Self::PREFIX, &hex[..19]))
    }
}

/// Whether an agent is a human operator or an automated tool/assistant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentKind {
    Human,
    Tool,
}

impl Default for AgentKind {
    fn default() -> Self {
        AgentKind::Tool
    }
}

/// An agent identity (spec §3 Agent). Never deleted; may be re-registered,
/// which replaces `display`/`kind` but keeps the same `agent_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agent {
    pub agent_id: AgentId,
    pub repo_id: String,
    pub role: String,
    pub module: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
    pub kind: AgentKind,
}

#[cfg(test)]
#[path = "agent_tests.rs"]
mod tests;
