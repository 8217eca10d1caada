//! Subscriptions (spec §3 Subscription, §4.6 SubscriptionMatcher).

use crate::scope::Scope;
use crate::session::SessionId;
use serde::{Deserialize, Serialize};

/// Per-daemon subscription id. Not globally unique like the other entity
/// ids — subscriptions never replicate to peers, so a simple counter
/// suffices (spec §3: "sub_id: int (per-daemon)").
pub type SubscriptionId = u64;

/// What a subscription matches against inbound messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Filter {
    Scope { scope: Scope },
    MentionRole { role: String },
    MentionAgent { agent_id: String },
    All,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    pub sub_id: SubscriptionId,
    pub session_id: SessionId,
    pub filter: Filter,
}

#[cfg(test)]
#[path = "subscription_tests.rs"]
mod tests;
