//! `subscribe` / `unsubscribe` (spec §4.3, §4.6).

use thrum_core::{Clock, Scope, ThrumError};
use thrum_wire::{filter_from_request, Response};

use super::Handlers;
use crate::connection::ConnectionState;

pub fn subscribe<C: Clock + 'static>(
    handlers: &Handlers<C>,
    conn: &ConnectionState,
    scope: Option<Scope>,
    mention_role: Option<String>,
    mention_agent: Option<String>,
    all: bool,
) -> Result<Response, ThrumError> {
    let session_id = conn
        .current_session()
        .ok_or_else(|| ThrumError::invalid_request("no active session on this connection"))?;
    handlers
        .state
        .read(|s| s.sessions.contains_key(&session_id))
        .then_some(())
        .ok_or_else(|| ThrumError::not_found("active session no longer exists"))?;

    let filter = filter_from_request(scope, mention_role, mention_agent, all).ok_or_else(|| {
        ThrumError::invalid_request(
            "exactly one of scope, mention_role, mention_agent, or all=true is required",
        )
    })?;

    let sub_id = handlers.commit_subscription_add(session_id, filter)?;
    Ok(Response::Subscribed { subscription_id: sub_id, session_id: session_id.to_string() })
}

pub fn unsubscribe<C: Clock + 'static>(
    handlers: &Handlers<C>,
    subscription_id: u64,
) -> Result<Response, ThrumError> {
    let Some(session_id) = handlers
        .state
        .read(|s| s.subscriptions.get(&subscription_id).map(|sub| sub.session_id))
    else {
        return Ok(Response::Unsubscribed { subscription_id });
    };
    handlers.commit(thrum_core::EventBody::SubscriptionRemove {
        sub_id: subscription_id,
        session_id,
    })?;
    Ok(Response::Unsubscribed { subscription_id })
}

#[cfg(test)]
#[path = "subscription_tests.rs"]
mod tests;
