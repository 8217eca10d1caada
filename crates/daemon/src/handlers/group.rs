//! `group.create` / `delete` / `member.add` / `member.remove` / `list` /
//! `info` / `members` (spec §4.3, invariant 4 on `everyone`).

use thrum_core::group::{everyone_group_id, Member, MemberKind, EVERYONE_GROUP_NAME};
use thrum_core::{Clock, EventBody, GroupId, Scope, ThrumError};
use thrum_wire::{GroupSummary, Response};

use super::Handlers;

/// Bootstraps the reserved `everyone` group if it isn't already there
/// (spec §3 Group, invariant 4: every agent is implicitly a member via the
/// synthetic `role:*` member). Idempotent — safe to call on every daemon
/// startup and from test scaffolding.
pub fn ensure_everyone_group<C: Clock + 'static>(handlers: &Handlers<C>) -> Result<(), ThrumError> {
    let exists = handlers.state.read(|s| s.groups.contains_key(&everyone_group_id()));
    if exists {
        return Ok(());
    }
    let created_at = handlers.clock.event_timestamp();
    handlers.commit(EventBody::GroupCreate {
        group_id: everyone_group_id(),
        name: EVERYONE_GROUP_NAME.to_string(),
        description: "every registered agent".to_string(),
        created_at,
        members: vec![Member::role("*")],
    })?;
    Ok(())
}

pub fn create<C: Clock + 'static>(
    handlers: &Handlers<C>,
    name: String,
    description: String,
    members: Vec<Member>,
) -> Result<Response, ThrumError> {
    if name.trim().is_empty() {
        return Err(ThrumError::invalid_request("group name is required"));
    }
    let exists = handlers.state.read(|s| s.groups.values().any(|g| g.name == name));
    if exists {
        return Err(ThrumError::conflict(format!("group already exists: {name}")));
    }
    for member in &members {
        validate_member_exists(handlers, member)?;
    }

    let group_id = GroupId::new();
    let created_at = handlers.clock.event_timestamp();
    handlers.commit(EventBody::GroupCreate {
        group_id,
        name: name.clone(),
        description: description.clone(),
        created_at,
        members: members.clone(),
    })?;

    Ok(Response::Group { group: Some(Box::new(GroupSummary { group_id: group_id.to_string(), name, description, members })) })
}

pub fn delete<C: Clock + 'static>(
    handlers: &Handlers<C>,
    name: &str,
    delete_messages: bool,
) -> Result<Response, ThrumError> {
    let group = find_by_name(handlers, name)?;
    if group.is_everyone() {
        return Err(ThrumError::protected("the everyone group cannot be deleted"));
    }

    let mut messages_deleted = 0;
    if delete_messages {
        let scope = Scope::group(group.name.clone());
        let message_ids: Vec<thrum_core::message::MessageId> = handlers.state.read(|s| {
            s.messages
                .values()
                .filter(|m| !m.deleted && m.scopes.contains(&scope))
                .map(|m| m.message_id)
                .collect()
        });
        for message_id in message_ids {
            let deleted_at = handlers.clock.event_timestamp();
            handlers.commit(EventBody::MessageDelete { message_id, deleted_at })?;
            messages_deleted += 1;
        }
    }

    handlers.commit(EventBody::GroupDelete { group_id: group.group_id })?;
    Ok(Response::GroupDeleted { name: name.to_string(), messages_deleted })
}

pub fn member_add<C: Clock + 'static>(
    handlers: &Handlers<C>,
    name: &str,
    member: Member,
) -> Result<Response, ThrumError> {
    let group = find_by_name(handlers, name)?;
    if group.is_everyone() {
        return Err(ThrumError::protected("the everyone group's membership is computed, not edited"));
    }
    validate_member_exists(handlers, &member)?;
    handlers.commit(EventBody::GroupMemberAdd { group_id: group.group_id, member })?;
    Ok(Response::Group { group: Some(Box::new(to_summary(&find_by_name(handlers, name)?))) })
}

pub fn member_remove<C: Clock + 'static>(
    handlers: &Handlers<C>,
    name: &str,
    member: Member,
) -> Result<Response, ThrumError> {
    let group = find_by_name(handlers, name)?;
    if group.is_everyone() {
        return Err(ThrumError::protected("the everyone group's membership is computed, not edited"));
    }
    handlers.commit(EventBody::GroupMemberRemove { group_id: group.group_id, member })?;
    Ok(Response::Group { group: Some(Box::new(to_summary(&find_by_name(handlers, name)?))) })
}

pub fn list<C: Clock + 'static>(handlers: &Handlers<C>) -> Result<Response, ThrumError> {
    let groups = handlers.state.read(|s| s.groups.values().map(to_summary).collect());
    Ok(Response::Groups { groups })
}

pub fn info<C: Clock + 'static>(handlers: &Handlers<C>, name: &str) -> Result<Response, ThrumError> {
    let group = handlers.state.read(|s| s.groups.values().find(|g| g.name == name).cloned());
    Ok(Response::Group { group: group.map(|g| Box::new(to_summary(&g))) })
}

pub fn members<C: Clock + 'static>(handlers: &Handlers<C>, name: &str) -> Result<Response, ThrumError> {
    let group = find_by_name(handlers, name)?;
    Ok(Response::GroupMembers { members: group.members.into_iter().collect() })
}

fn find_by_name<C: Clock + 'static>(
    handlers: &Handlers<C>,
    name: &str,
) -> Result<thrum_core::Group, ThrumError> {
    handlers
        .state
        .read(|s| s.groups.values().find(|g| g.name == name).cloned())
        .ok_or_else(|| ThrumError::not_found(format!("group not found: {name}")))
}

fn validate_member_exists<C: Clock + 'static>(
    handlers: &Handlers<C>,
    member: &Member,
) -> Result<(), ThrumError> {
    let valid = handlers.state.read(|s| match member.kind {
        MemberKind::Agent => s.agents.contains_key(&member.value.clone().into()),
        MemberKind::Role => s.groups.values().any(|g| g.name == member.value),
        MemberKind::Group => s.groups.values().any(|g| g.name == member.value),
    });
    if valid {
        Ok(())
    } else {
        Err(ThrumError::invalid_request(format!(
            "group member does not exist: {:?} {}",
            member.kind, member.value
        )))
    }
}

fn to_summary(group: &thrum_core::Group) -> GroupSummary {
    GroupSummary {
        group_id: group.group_id.to_string(),
        name: group.name.clone(),
        description: group.description.clone(),
        members: group.members.iter().cloned().collect(),
    }
}

#[cfg(test)]
#[path = "group_tests.rs"]
mod tests;
