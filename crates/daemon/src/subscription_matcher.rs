//! Computes which subscriptions match a newly committed `message.send`
//! event (spec §4.6). Fan-out to clients is the transport's job; this
//! module only decides *who* should receive the message.

use std::collections::HashSet;
use thrum_core::group::{GroupId, Member, MemberKind};
use thrum_core::{Filter, Message, Scope, ScopeKind, Subscription};
use thrum_storage::MaterializedState;

/// One delivery row: a subscription that should receive `message_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delivery {
    pub subscription_id: u64,
}

/// Compute the set of subscriptions matching `message` (spec §4.6).
pub fn matches(state: &MaterializedState, message: &Message) -> Vec<Delivery> {
    state
        .subscriptions
        .values()
        .filter(|sub| subscription_matches(state, sub, message))
        .map(|sub| Delivery { subscription_id: sub.sub_id })
        .collect()
}

fn subscription_matches(state: &MaterializedState, sub: &Subscription, message: &Message) -> bool {
    match &sub.filter {
        Filter::All => true,
        Filter::Scope { scope } => message.scopes.iter().any(|msg_scope| {
            msg_scope == scope || group_closure_contains(state, msg_scope, scope)
        }),
        Filter::MentionRole { role } => {
            message.mentions.iter().any(|m| m.kind == thrum_core::MentionKind::Role && &m.value == role)
        }
        Filter::MentionAgent { agent_id } => message
            .mentions
            .iter()
            .any(|m| m.kind == thrum_core::MentionKind::Agent && &m.value == agent_id),
    }
}

/// Whether `subscriber_scope` (an `agent` or `role` scope on a
/// subscription) falls within the transitive membership closure of
/// `message_scope`, when the latter is a `group` scope (spec §4.6: "group
/// scopes are expanded through the group's transitive membership...").
fn group_closure_contains(
    state: &MaterializedState,
    message_scope: &Scope,
    subscriber_scope: &Scope,
) -> bool {
    if message_scope.kind != ScopeKind::Group {
        return false;
    }
    let Some(group) = find_group_by_name(state, &message_scope.value) else {
        return false;
    };
    let mut visited = HashSet::new();
    let members = group_closure_members(state, group.group_id, &mut visited);

    match subscriber_scope.kind {
        ScopeKind::Agent => members.contains(&Member::agent(&subscriber_scope.value)),
        ScopeKind::Role => members.contains(&Member::role(&subscriber_scope.value)),
        _ => false,
    }
}

fn find_group_by_name<'a>(
    state: &'a MaterializedState,
    name: &str,
) -> Option<&'a thrum_core::Group> {
    state.groups.values().find(|g| g.name == name)
}

/// Flattens a group's membership, resolving nested `group` members
/// recursively. `visited` guards against cycles (spec §9: "group
/// expansion must detect cycles").
fn group_closure_members(
    state: &MaterializedState,
    group_id: GroupId,
    visited: &mut HashSet<GroupId>,
) -> HashSet<Member> {
    if !visited.insert(group_id) {
        return HashSet::new();
    }
    let Some(group) = state.groups.get(&group_id) else {
        return HashSet::new();
    };

    let mut out = HashSet::new();
    for member in &group.members {
        match member.kind {
            MemberKind::Group => {
                if let Some(child) = find_group_by_name(state, &member.value) {
                    out.extend(group_closure_members(state, child.group_id, visited));
                }
            }
            MemberKind::Agent | MemberKind::Role => {
                out.insert(member.clone());
            }
        }
    }
    out
}

#[cfg(test)]
#[path = "subscription_matcher_tests.rs"]
mod tests;
