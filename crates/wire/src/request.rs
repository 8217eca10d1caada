//! RPC requests (spec §6): one variant per dotted method name.

use serde::{Deserialize, Serialize};
use thrum_core::{AgentKind, Filter, MentionTarget, Member, Ref, Scope};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum SortOrder {
    #[serde(rename = "asc")]
    Ascending,
    #[serde(rename = "desc")]
    Descending,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MessageFilters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<Scope>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thread_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub since: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub until: Option<chrono::DateTime<chrono::Utc>>,
}

/// Requests sent from a client to the daemon, tagged by dotted method name
/// matching the RPC wire format in spec §6.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "method", content = "params")]
pub enum Request {
    #[serde(rename = "agent.register")]
    AgentRegister {
        role: String,
        module: String,
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        display: Option<String>,
        #[serde(default)]
        kind: Option<AgentKind>,
        #[serde(default)]
        force: bool,
    },

    #[serde(rename = "session.start")]
    SessionStart {
        agent_id: String,
        #[serde(default)]
        scopes: Vec<Scope>,
        #[serde(default)]
        refs: Vec<Ref>,
    },

    #[serde(rename = "session.end")]
    SessionEnd {
        session_id: String,
        #[serde(default)]
        reason: Option<String>,
    },

    #[serde(rename = "session.heartbeat")]
    SessionHeartbeat {
        session_id: String,
        #[serde(default)]
        add_scopes: Vec<Scope>,
        #[serde(default)]
        remove_scopes: Vec<Scope>,
        #[serde(default)]
        add_refs: Vec<Ref>,
        #[serde(default)]
        remove_refs: Vec<Ref>,
    },

    #[serde(rename = "session.setIntent")]
    SessionSetIntent { session_id: String, intent: String },

    #[serde(rename = "session.setTask")]
    SessionSetTask { session_id: String, current_task: String },

    #[serde(rename = "message.send")]
    MessageSend {
        content: String,
        #[serde(default)]
        scopes: Vec<Scope>,
        #[serde(default)]
        refs: Vec<Ref>,
        #[serde(default)]
        reply_to: Option<String>,
        #[serde(default)]
        mentions: Vec<MentionTarget>,
    },

    #[serde(rename = "message.get")]
    MessageGet { message_id: String },

    #[serde(rename = "message.list")]
    MessageList {
        #[serde(default)]
        page_size: Option<u32>,
        #[serde(default)]
        cursor: Option<String>,
        #[serde(default)]
        sort_order: Option<SortOrder>,
        #[serde(default)]
        filters: MessageFilters,
    },

    #[serde(rename = "message.delete")]
    MessageDelete { message_id: String },

    #[serde(rename = "subscribe")]
    Subscribe {
        #[serde(default)]
        scope: Option<Scope>,
        #[serde(default)]
        mention_role: Option<String>,
        #[serde(default)]
        mention_agent: Option<String>,
        #[serde(default)]
        all: bool,
    },

    #[serde(rename = "unsubscribe")]
    Unsubscribe { subscription_id: u64 },

    #[serde(rename = "group.create")]
    GroupCreate {
        name: String,
        #[serde(default)]
        description: String,
        #[serde(default)]
        members: Vec<Member>,
    },

    #[serde(rename = "group.delete")]
    GroupDelete {
        name: String,
        #[serde(default)]
        delete_messages: bool,
    },

    #[serde(rename = "group.member.add")]
    GroupMemberAdd { name: String, member: Member },

    #[serde(rename = "group.member.remove")]
    GroupMemberRemove { name: String, member: Member },

    #[serde(rename = "group.list")]
    GroupList,

    #[serde(rename = "group.info")]
    GroupInfo { name: String },

    #[serde(rename = "group.members")]
    GroupMembers { name: String },

    #[serde(rename = "context.save")]
    ContextSave { agent_name: String, content: String },

    #[serde(rename = "context.show")]
    ContextShow { agent_name: String },

    #[serde(rename = "context.clear")]
    ContextClear { agent_name: String },

    #[serde(rename = "peer.start_pairing")]
    PeerStartPairing,

    #[serde(rename = "peer.join")]
    PeerJoin { address: String, code: String },

    #[serde(rename = "peer.wait_pairing")]
    PeerWaitPairing,

    #[serde(rename = "peer.remove")]
    PeerRemove { name: Option<String>, daemon_id: Option<String> },

    #[serde(rename = "pair.request")]
    PairRequest { code: String, daemon_id: String, name: String, address: String },

    #[serde(rename = "sync.pull")]
    SyncPull { token: String, after_sequence: u64, max_batch: u32 },

    #[serde(rename = "sync.notify")]
    SyncNotify { token: String, daemon_id: String, latest_seq: u64, event_count: u64 },

    #[serde(rename = "sync.peer_info")]
    SyncPeerInfo,

    #[serde(rename = "sync.status")]
    SyncStatus,

    #[serde(rename = "ping")]
    Ping,

    #[serde(rename = "hello")]
    Hello { version: String },
}

/// Build the `subscribe` request's filter from one of its mutually
/// exclusive fields (spec §4.3: "exactly one").
pub fn filter_from_request(
    scope: Option<Scope>,
    mention_role: Option<String>,
    mention_agent: Option<String>,
    all: bool,
) -> Option<Filter> {
    match (scope, mention_role, mention_agent, all) {
        (Some(scope), None, None, false) => Some(Filter::Scope { scope }),
        (None, Some(role), None, false) => Some(Filter::MentionRole { role }),
        (None, None, Some(agent_id), false) => Some(Filter::MentionAgent { agent_id }),
        (None, None, None, true) => Some(Filter::All),
        _ => None,
    }
}

#[cfg(test)]
#[path = "request_tests.rs"]
mod tests;
