//! `agent.register` (spec §4.3).

use thrum_core::group::{Member, MemberKind};
use thrum_core::{AgentId, AgentKind, Clock, EventBody, ThrumError};
use thrum_wire::Response;

use super::Handlers;

#[allow(clippy::too_many_arguments)]
pub fn register<C: Clock + 'static>(
    handlers: &Handlers<C>,
    role: String,
    module: String,
    name: Option<String>,
    display: Option<String>,
    kind: Option<AgentKind>,
    force: bool,
) -> Result<Response, ThrumError> {
    if role.trim().is_empty() || module.trim().is_empty() {
        return Err(ThrumError::invalid_request("role and module are required"));
    }

    let agent_id = AgentId::derive(&handlers.config.repo_id, &role, &module, name.as_deref());
    let existing = handlers.state.read(|s| s.agents.get(&agent_id).cloned());

    if let Some(agent) = existing {
        if !force {
            ensure_role_group(handlers, &role, agent_id)?;
            return Ok(Response::Agent {
                agent_id: agent.agent_id.to_string(),
                repo_id: agent.repo_id,
                role: agent.role,
                module: agent.module,
            });
        }
    }

    let kind = kind.unwrap_or_default();
    handlers.commit(EventBody::AgentRegister {
        agent_id,
        repo_id: handlers.config.repo_id.clone(),
        role: role.clone(),
        module: module.clone(),
        name,
        display,
        kind,
    })?;

    ensure_role_group(handlers, &role, agent_id)?;

    Ok(Response::Agent {
        agent_id: agent_id.to_string(),
        repo_id: handlers.config.repo_id.clone(),
        role,
        module,
    })
}

/// Every agent belongs to a group named after its role, created lazily on
/// first registration (spec §4.3: "ensures a group named `role` exists and
/// that the agent is a member of it").
fn ensure_role_group<C: Clock + 'static>(
    handlers: &Handlers<C>,
    role: &str,
    agent_id: AgentId,
) -> Result<(), ThrumError> {
    let group_id = handlers.state.read(|s| {
        s.groups.values().find(|g| g.name == role).map(|g| g.group_id)
    });

    let group_id = match group_id {
        Some(id) => id,
        None => {
            let group_id = thrum_core::GroupId::new();
            handlers.commit(EventBody::GroupCreate {
                group_id,
                name: role.to_string(),
                description: format!("agents with role {role}"),
                created_at: handlers.clock.event_timestamp(),
                members: vec![],
            })?;
            group_id
        }
    };

    let already_member = handlers.state.read(|s| {
        s.groups
            .get(&group_id)
            .map(|g| g.members.contains(&Member::new(MemberKind::Agent, agent_id.to_string())))
            .unwrap_or(false)
    });

    if !already_member {
        handlers.commit(EventBody::GroupMemberAdd {
            group_id,
            member: Member::agent(agent_id.to_string()),
        })?;
    }

    Ok(())
}

#[cfg(test)]
#[path = "agent_tests.rs"]
mod tests;
