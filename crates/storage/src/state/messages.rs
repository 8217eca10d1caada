//! Message, thread, and subscription handlers.

use thrum_core::{EventBody, Message};

use super::MaterializedState;

pub(crate) fn apply(state: &mut MaterializedState, body: &EventBody) {
    match body {
        EventBody::MessageSend {
            message_id,
            sender_agent_id,
            session_id,
            content,
            created_at,
            thread_id,
            reply_to,
            scopes,
            refs,
            mentions,
        } => {
            // Idempotent: an already-applied message_id is left untouched
            // rather than overwritten, so a later `message.delete` replay
            // can't be undone by a duplicate send.
            if state.messages.contains_key(message_id) {
                return;
            }
            state.messages.insert(
                *message_id,
                Message {
                    message_id: *message_id,
                    sender_agent_id: *sender_agent_id,
                    session_id: *session_id,
                    content: content.clone(),
                    created_at: *created_at,
                    thread_id: *thread_id,
                    reply_to: *reply_to,
                    deleted: false,
                    scopes: scopes.iter().cloned().collect(),
                    refs: refs.iter().cloned().collect(),
                    mentions: mentions.iter().cloned().collect(),
                },
            );
        }

        EventBody::MessageDelete { message_id, .. } => {
            if let Some(message) = state.messages.get_mut(message_id) {
                message.deleted = true;
            }
        }

        EventBody::ThreadAssign { message_id, thread_id } => {
            if let Some(message) = state.messages.get_mut(message_id) {
                message.thread_id = Some(*thread_id);
            }
        }

        _ => {}
    }
}
