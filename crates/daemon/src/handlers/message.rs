//! `message.send` / `get` / `list` / `delete` (spec §4.3).

use thrum_core::message::MessageId;
use thrum_core::{Clock, EventBody, MentionTarget, Ref, Scope, ThrumError};
use thrum_wire::{MessageFilters, MessageSummary, Response, SortOrder};

use super::Handlers;
use crate::connection::ConnectionState;

#[allow(clippy::too_many_arguments)]
pub fn send<C: Clock + 'static>(
    handlers: &Handlers<C>,
    conn: &ConnectionState,
    content: String,
    scopes: Vec<Scope>,
    mut refs: Vec<Ref>,
    reply_to: Option<String>,
    mentions: Vec<MentionTarget>,
) -> Result<Response, ThrumError> {
    let session_id = conn
        .current_session()
        .ok_or_else(|| ThrumError::invalid_request("no active session on this connection"))?;
    let session = handlers
        .state
        .read(|s| s.sessions.get(&session_id).cloned())
        .ok_or_else(|| ThrumError::not_found("active session no longer exists"))?;
    if session.ended_at.is_some() {
        return Err(ThrumError::invalid_request("session has already ended"));
    }

    let reply_to_id = reply_to
        .map(|id| {
            handlers
                .state
                .read(|s| s.get_message(&id).cloned())
                .filter(|m| !m.deleted)
                .map(|m| m.message_id)
                .ok_or_else(|| ThrumError::not_found(format!("reply_to message not found: {id}")))
        })
        .transpose()?;

    // A message starts carrying no thread_id; it only joins a thread once
    // it gains a reply. If the parent already has a thread, the reply
    // inherits it; otherwise a new thread is minted and assigned to both.
    let thread_id: Option<thrum_core::message::ThreadId> = match reply_to_id {
        Some(parent_id) => {
            let parent_thread = handlers.state.read(|s| s.messages[&parent_id].thread_id);
            let thread_id = match parent_thread {
                Some(existing) => existing,
                None => {
                    let new_thread = thrum_core::message::ThreadId::new();
                    handlers.commit(EventBody::ThreadAssign {
                        message_id: parent_id,
                        thread_id: new_thread,
                    })?;
                    new_thread
                }
            };
            refs.push(Ref::reply_to(parent_id.to_string()));
            Some(thread_id)
        }
        None => None,
    };

    let message_id = MessageId::new();
    let created_at = handlers.clock.event_timestamp();
    handlers.commit(EventBody::MessageSend {
        message_id,
        sender_agent_id: session.agent_id,
        session_id,
        content: content.into_bytes(),
        created_at,
        thread_id,
        reply_to: reply_to_id,
        scopes,
        refs,
        mentions,
    })?;

    let deliveries = handlers.state.read(|s| {
        let message = &s.messages[&message_id];
        crate::subscription_matcher::matches(s, message)
    });
    tracing::debug!(message_id = %message_id, recipients = deliveries.len(), "message.send matched subscriptions");

    Ok(Response::MessageSent {
        message_id: message_id.to_string(),
        thread_id: thread_id.map(|t| t.to_string()),
    })
}

pub fn get<C: Clock + 'static>(
    handlers: &Handlers<C>,
    message_id: &str,
) -> Result<Response, ThrumError> {
    let message = handlers.state.read(|s| s.get_message(message_id).cloned());
    Ok(Response::Message { message: message.map(|m| Box::new(to_summary(&m))) })
}

pub fn list<C: Clock + 'static>(
    handlers: &Handlers<C>,
    page_size: Option<u32>,
    cursor: Option<String>,
    sort_order: Option<SortOrder>,
    filters: MessageFilters,
) -> Result<Response, ThrumError> {
    let page_size = page_size.unwrap_or(50).clamp(1, 500) as usize;
    let sort_order = sort_order.unwrap_or(SortOrder::Descending);
    let cursor_created_at = cursor
        .as_deref()
        .map(|c| {
            c.parse::<chrono::DateTime<chrono::Utc>>()
                .map_err(|_| ThrumError::invalid_request("invalid cursor"))
        })
        .transpose()?;

    let mut messages: Vec<thrum_core::Message> = handlers.state.read(|s| {
        s.messages
            .values()
            .filter(|m| {
                if let Some(scope) = &filters.scope {
                    if !m.scopes.contains(scope) {
                        return false;
                    }
                }
                if let Some(thread_id) = &filters.thread_id {
                    if m.thread_id.map(|t| t.to_string()).as_deref() != Some(thread_id.as_str()) {
                        return false;
                    }
                }
                if let Some(sender) = &filters.sender {
                    if m.sender_agent_id.as_str() != sender {
                        return false;
                    }
                }
                if let Some(since) = filters.since {
                    if m.created_at < since {
                        return false;
                    }
                }
                if let Some(until) = filters.until {
                    if m.created_at > until {
                        return false;
                    }
                }
                true
            })
            .cloned()
            .collect()
    });

    match sort_order {
        SortOrder::Ascending => messages.sort_by_key(|m| m.created_at),
        SortOrder::Descending => messages.sort_by_key(|m| std::cmp::Reverse(m.created_at)),
    }

    if let Some(cursor_at) = cursor_created_at {
        messages.retain(|m| match sort_order {
            SortOrder::Ascending => m.created_at > cursor_at,
            SortOrder::Descending => m.created_at < cursor_at,
        });
    }

    let next_cursor = if messages.len() > page_size {
        messages.get(page_size - 1).map(|m| m.created_at.to_rfc3339())
    } else {
        None
    };
    messages.truncate(page_size);

    Ok(Response::Messages {
        messages: messages.iter().map(to_summary).collect(),
        next_cursor,
    })
}

pub fn delete<C: Clock + 'static>(
    handlers: &Handlers<C>,
    message_id: &str,
) -> Result<Response, ThrumError> {
    let message = handlers
        .state
        .read(|s| s.get_message(message_id).cloned())
        .ok_or_else(|| ThrumError::not_found(format!("message not found: {message_id}")))?;
    let deleted_at = handlers.clock.event_timestamp();
    handlers.commit(EventBody::MessageDelete { message_id: message.message_id, deleted_at })?;
    Ok(Response::MessageDeleted { message_id: message.message_id.to_string() })
}

fn to_summary(message: &thrum_core::Message) -> MessageSummary {
    MessageSummary {
        message_id: message.message_id.to_string(),
        sender_agent_id: message.sender_agent_id.to_string(),
        content: message.content_str().into_owned(),
        created_at: message.created_at,
        thread_id: message.thread_id.map(|t| t.to_string()),
        reply_to: message.reply_to.map(|r| r.to_string()),
        deleted: message.deleted,
    }
}

#[cfg(test)]
#[path = "message_tests.rs"]
mod tests;
