//! Per-session work context and the staleness policy resolving spec §9's
//! Open Question (see SPEC_FULL.md §3).

use crate::agent::AgentId;
use crate::session::SessionId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A worktree/intent/task snapshot for one session, refreshed on each
/// heartbeat and synced to peers as an aggregated `agent.update` event on
/// session end.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkContext {
    pub session_id: SessionId,
    pub agent_id: AgentId,
    #[serde(default)]
    pub branch: Option<String>,
    #[serde(default)]
    pub worktree_path: Option<String>,
    #[serde(default)]
    pub unmerged_commits: u32,
    #[serde(default)]
    pub uncommitted_files: u32,
    #[serde(default)]
    pub changed_files: Vec<String>,
    pub git_updated_at: DateTime<Utc>,
    #[serde(default)]
    pub intent: Option<String>,
    #[serde(default)]
    pub intent_updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub current_task: Option<String>,
    #[serde(default)]
    pub task_updated_at: Option<DateTime<Utc>>,
    /// Whether the owning session has ended. Set by `session.end` just
    /// before aggregation; `filter_stale_contexts` reads it.
    #[serde(default)]
    pub session_ended: bool,
}

/// How stale a work context must be before it's dropped during
/// `session.end` aggregation (spec §9 Open Question, resolved in
/// SPEC_FULL.md §3): the session has ended AND `git_updated_at` is more
/// than `max_age` old relative to `now`.
pub fn filter_stale_contexts(
    contexts: Vec<WorkContext>,
    now: DateTime<Utc>,
    max_age: chrono::Duration,
) -> Vec<WorkContext> {
    contexts
        .into_iter()
        .filter(|ctx| !(ctx.session_ended && now - ctx.git_updated_at > max_age))
        .collect()
}

/// Default staleness window: 24 hours, per the spec's suggested rule.
pub fn default_staleness_window() -> chrono::Duration {
    chrono::Duration::hours(24)
}

#[cfg(test)]
#[path = "work_context_tests.rs"]
mod tests;
