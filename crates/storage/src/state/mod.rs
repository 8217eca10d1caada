//! Materialized state derived from event-log replay (spec §2).

mod agents;
mod groups;
mod helpers;
mod messages;
mod peers;
mod sessions;
mod subscriptions;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use thrum_core::peer::DaemonId;
use thrum_core::{
    Agent, AgentId, Event, EventId, Group, GroupId, Message, MessageId, Peer, Session, SessionId,
    Subscription, SubscriptionId, WorkContext,
};

/// The full set of materialized views rebuilt by replaying the event log.
///
/// Every field here is derived data — safe to discard and rebuild from the
/// journal at any time. Nothing is the source of truth except the log.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct MaterializedState {
    pub agents: HashMap<AgentId, Agent>,
    pub sessions: HashMap<SessionId, Session>,
    pub messages: HashMap<MessageId, Message>,
    pub groups: HashMap<GroupId, Group>,
    pub subscriptions: HashMap<SubscriptionId, Subscription>,
    pub peers: HashMap<DaemonId, Peer>,
    pub work_contexts: HashMap<SessionId, WorkContext>,
    /// Idempotency ledger for replicated-event apply (spec §4.4): every
    /// `(origin_daemon_id, origin_event_id)` this log has already folded in.
    #[serde(default)]
    applied: HashSet<(DaemonId, EventId)>,
}

impl MaterializedState {
    pub fn get_agent(&self, id: &str) -> Option<&Agent> {
        helpers::find_by_prefix(&self.agents, id)
    }

    pub fn get_session(&self, id: &str) -> Option<&Session> {
        helpers::find_by_prefix(&self.sessions, id)
    }

    pub fn get_message(&self, id: &str) -> Option<&Message> {
        helpers::find_by_prefix(&self.messages, id)
    }

    pub fn get_group(&self, id: &str) -> Option<&Group> {
        helpers::find_by_prefix(&self.groups, id)
    }

    pub fn active_session_for_agent(&self, agent_id: &AgentId) -> Option<&Session> {
        self.sessions.values().find(|s| &s.agent_id == agent_id && s.is_active())
    }

    /// Whether this event's idempotency key has already been folded in.
    /// Handlers for locally-originated events skip this check (a local
    /// event can never collide with itself); replicated apply always
    /// calls it first.
    pub fn already_applied(&self, event: &Event) -> bool {
        self.applied.contains(&event.idempotency_key())
    }

    /// Apply one event to the materialized views. Idempotent: replaying
    /// the same event (by `idempotency_key`) twice is a no-op the second
    /// time.
    pub fn apply_event(&mut self, event: &Event) {
        if !self.applied.insert(event.idempotency_key()) {
            return;
        }
        use thrum_core::EventBody::*;
        match &event.body {
            AgentRegister { .. } => agents::apply(self, &event.body),
            SessionStart { .. } | SessionHeartbeat { .. } | SessionEnd { .. } => {
                sessions::apply(self, &event.body)
            }
            MessageSend { .. } | MessageDelete { .. } | ThreadAssign { .. } => {
                messages::apply(self, &event.body)
            }
            SubscriptionAdd { .. } | SubscriptionRemove { .. } => {
                subscriptions::apply(self, &event.body)
            }
            GroupCreate { .. } | GroupDelete { .. } | GroupMemberAdd { .. }
            | GroupMemberRemove { .. } => groups::apply(self, &event.body),
            PeerPair { .. } | PeerRemove { .. } => peers::apply(self, &event.body),
        }
    }

    /// Drop work contexts whose owning session ended more than `max_age`
    /// ago (spec §9 Open Question, resolved in SPEC_FULL.md §3).
    pub fn gc_stale_work_contexts(&mut self, now: DateTime<Utc>, max_age: chrono::Duration) {
        let contexts = std::mem::take(&mut self.work_contexts).into_values().collect();
        let kept = thrum_core::filter_stale_contexts(contexts, now, max_age);
        self.work_contexts = kept.into_iter().map(|c| (c.session_id, c)).collect();
    }
}

#[cfg(test)]
#[path = "../state_tests.rs"]
mod tests;
