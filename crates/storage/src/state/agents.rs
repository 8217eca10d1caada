//! Agent registration handler.

use thrum_core::{Agent, EventBody};

use super::MaterializedState;

pub(crate) fn apply(state: &mut MaterializedState, body: &EventBody) {
    if let EventBody::AgentRegister { agent_id, repo_id, role, module, name, display, kind } = body
    {
        // Re-registering the same agent_id replaces display/kind in place;
        // the id itself never changes since it's a deterministic hash.
        state.agents.insert(
            *agent_id,
            Agent {
                agent_id: *agent_id,
                repo_id: repo_id.clone(),
                role: role.clone(),
                module: module.clone(),
                name: name.clone(),
                display: display.clone(),
                kind: *kind,
            },
        );
    }
}
