//! Group handlers.
//!
//! Membership edits and the `everyone` group's protection are validated by
//! the daemon handler before an event is ever appended (spec invariant 4);
//! by the time an event reaches here it's a fact, applied unconditionally.

use thrum_core::{EventBody, Group};

use super::MaterializedState;

pub(crate) fn apply(state: &mut MaterializedState, body: &EventBody) {
    match body {
        EventBody::GroupCreate { group_id, name, description, created_at, members } => {
            state.groups.entry(*group_id).or_insert_with(|| Group {
                group_id: *group_id,
                name: name.clone(),
                description: description.clone(),
                created_at: *created_at,
                members: members.iter().cloned().collect(),
            });
        }

        EventBody::GroupDelete { group_id } => {
            state.groups.remove(group_id);
        }

        EventBody::GroupMemberAdd { group_id, member } => {
            if let Some(group) = state.groups.get_mut(group_id) {
                group.members.insert(member.clone());
            }
        }

        EventBody::GroupMemberRemove { group_id, member } => {
            if let Some(group) = state.groups.get_mut(group_id) {
                group.members.remove(member);
            }
        }

        _ => {}
    }
}
