//! The append-only event log's element type (spec §2, §4). Every
//! state-changing operation is recorded as one `Event`; `MaterializedState`
//! is rebuilt by replaying them in order, and replication ships them
//! between daemons verbatim.

use crate::agent::{AgentId, AgentKind};
use crate::group::{GroupId, Member};
use crate::message::{MessageId, ThreadId};
use crate::peer::DaemonId;
use crate::scope::{MentionTarget, Ref, Scope};
use crate::session::{EndReason, SessionId};
use crate::subscription::{Filter, SubscriptionId};
use crate::work_context::WorkContext;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

crate::define_id! {
    /// Unique per origin daemon; combined with `origin_daemon_id` it forms
    /// the idempotency key replicated events are deduplicated on.
    pub struct EventId("evt_");
}

/// The body of an event, one variant per state-changing operation named
/// in spec §4. Tagged so the wire format and the on-disk journal agree.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data")]
#[serde(rename_all = "snake_case")]
pub enum EventBody {
    AgentRegister {
        agent_id: AgentId,
        repo_id: String,
        role: String,
        module: String,
        name: Option<String>,
        display: Option<String>,
        kind: AgentKind,
    },
    SessionStart {
        session_id: SessionId,
        agent_id: AgentId,
        started_at: DateTime<Utc>,
        scopes: Vec<Scope>,
        refs: Vec<Ref>,
    },
    SessionHeartbeat {
        session_id: SessionId,
        last_seen_at: DateTime<Utc>,
    },
    SessionEnd {
        session_id: SessionId,
        ended_at: DateTime<Utc>,
        end_reason: EndReason,
        /// Aggregated work-context snapshot, carried on the terminal event
        /// rather than synced continuously (spec §9 Design Notes).
        work_context: Option<WorkContext>,
    },
    MessageSend {
        message_id: MessageId,
        sender_agent_id: AgentId,
        session_id: SessionId,
        content: Vec<u8>,
        created_at: DateTime<Utc>,
        thread_id: Option<ThreadId>,
        reply_to: Option<MessageId>,
        scopes: Vec<Scope>,
        refs: Vec<Ref>,
        mentions: Vec<MentionTarget>,
    },
    MessageDelete {
        message_id: MessageId,
        deleted_at: DateTime<Utc>,
    },
    ThreadAssign {
        message_id: MessageId,
        thread_id: ThreadId,
    },
    SubscriptionAdd {
        sub_id: SubscriptionId,
        session_id: SessionId,
        filter: Filter,
    },
    SubscriptionRemove {
        sub_id: SubscriptionId,
        session_id: SessionId,
    },
    GroupCreate {
        group_id: GroupId,
        name: String,
        description: String,
        created_at: DateTime<Utc>,
        members: Vec<Member>,
    },
    GroupDelete {
        group_id: GroupId,
    },
    GroupMemberAdd {
        group_id: GroupId,
        member: Member,
    },
    GroupMemberRemove {
        group_id: GroupId,
        member: Member,
    },
    PeerPair {
        peer_daemon_id: DaemonId,
        repo_id: String,
        address: String,
        paired_at: DateTime<Utc>,
    },
    PeerRemove {
        peer_daemon_id: DaemonId,
    },
}

impl EventBody {
    /// The dotted operation name this event corresponds to, matching the
    /// wire protocol's RPC method names (spec §6).
    pub fn method_name(&self) -> &'static str {
        match self {
            EventBody::AgentRegister { .. } => "agent.register",
            EventBody::SessionStart { .. } => "session.start",
            EventBody::SessionHeartbeat { .. } => "session.heartbeat",
            EventBody::SessionEnd { .. } => "session.end",
            EventBody::MessageSend { .. } => "message.send",
            EventBody::MessageDelete { .. } => "message.delete",
            EventBody::ThreadAssign { .. } => "thread.assign",
            EventBody::SubscriptionAdd { .. } => "subscription.add",
            EventBody::SubscriptionRemove { .. } => "subscription.remove",
            EventBody::GroupCreate { .. } => "group.create",
            EventBody::GroupDelete { .. } => "group.delete",
            EventBody::GroupMemberAdd { .. } => "group.member.add",
            EventBody::GroupMemberRemove { .. } => "group.member.remove",
            EventBody::PeerPair { .. } => "peer.pair",
            EventBody::PeerRemove { .. } => "peer.remove",
        }
    }
}

/// One entry in the append-only log.
///
/// `(origin_daemon_id, origin_event_id)` is the idempotency key a peer
/// applying a replicated batch dedupes on (spec §4.4); `seq` is local to
/// the log it's stored in and is reassigned, never replicated, when a
/// peer appends a foreign event to its own log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub seq: u64,
    pub event_id: EventId,
    pub origin_daemon_id: DaemonId,
    pub origin_event_id: EventId,
    pub recorded_at: DateTime<Utc>,
    pub body: EventBody,
}

impl Event {
    /// The key replicated-apply idempotency is keyed on.
    pub fn idempotency_key(&self) -> (DaemonId, EventId) {
        (self.origin_daemon_id, self.origin_event_id)
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
