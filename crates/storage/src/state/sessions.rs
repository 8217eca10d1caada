//! Session lifecycle handlers, including work-context aggregation on end.

use thrum_core::{EventBody, Session};

use super::MaterializedState;

pub(crate) fn apply(state: &mut MaterializedState, body: &EventBody) {
    match body {
        EventBody::SessionStart { session_id, agent_id, started_at, scopes, refs } => {
            // Idempotent: a replayed start on an already-open session is a no-op.
            if state.sessions.contains_key(session_id) {
                return;
            }
            state.sessions.insert(
                *session_id,
                Session {
                    session_id: *session_id,
                    agent_id: *agent_id,
                    started_at: *started_at,
                    ended_at: None,
                    end_reason: None,
                    last_seen_at: *started_at,
                    scopes: scopes.iter().cloned().collect(),
                    refs: refs.iter().cloned().collect(),
                },
            );
        }

        EventBody::SessionHeartbeat { session_id, last_seen_at } => {
            if let Some(session) = state.sessions.get_mut(session_id) {
                // Idempotent by construction: always the newer timestamp wins.
                if *last_seen_at > session.last_seen_at {
                    session.last_seen_at = *last_seen_at;
                }
            }
        }

        EventBody::SessionEnd { session_id, ended_at, end_reason, work_context } => {
            if let Some(session) = state.sessions.get_mut(session_id) {
                if session.ended_at.is_none() {
                    session.ended_at = Some(*ended_at);
                    session.end_reason = Some(end_reason.clone());
                }
            }
            if let Some(mut ctx) = work_context.clone() {
                ctx.session_ended = true;
                state.work_contexts.insert(*session_id, ctx);
            }
        }

        _ => {}
    }
}
