//! `session.start` / `session.end` / `session.heartbeat` / `session.setIntent`
//! / `session.setTask` (spec §4.3).

use thrum_core::session::SessionId;
use thrum_core::{Clock, EndReason, EventBody, Ref, Scope, ThrumError};
use thrum_wire::Response;

use super::Handlers;
use crate::connection::ConnectionState;

pub fn start<C: Clock + 'static>(
    handlers: &Handlers<C>,
    conn: &ConnectionState,
    agent_id: &str,
    scopes: Vec<Scope>,
    refs: Vec<Ref>,
) -> Result<Response, ThrumError> {
    let agent = handlers
        .state
        .read(|s| s.get_agent(agent_id).cloned())
        .ok_or_else(|| ThrumError::not_found(format!("agent not found: {agent_id}")))?;

    let orphaned: Vec<SessionId> = handlers.state.read(|s| {
        s.sessions
            .values()
            .filter(|sess| sess.agent_id == agent.agent_id && sess.ended_at.is_none())
            .map(|sess| sess.session_id)
            .collect()
    });
    for session_id in orphaned {
        end_session(handlers, session_id, EndReason::CrashRecovered)?;
    }

    let session_id = SessionId::new();
    let started_at = handlers.clock.event_timestamp();
    handlers.commit(EventBody::SessionStart {
        session_id,
        agent_id: agent.agent_id,
        started_at,
        scopes,
        refs,
    })?;
    conn.set_current_session(Some(session_id));

    Ok(Response::Session { session_id: session_id.to_string(), agent_id: agent.agent_id.to_string() })
}

pub fn end<C: Clock + 'static>(
    handlers: &Handlers<C>,
    conn: &ConnectionState,
    session_id: &str,
    reason: Option<String>,
) -> Result<Response, ThrumError> {
    let session = handlers
        .state
        .read(|s| s.get_session(session_id).cloned())
        .ok_or_else(|| ThrumError::not_found(format!("session not found: {session_id}")))?;
    if session.ended_at.is_some() {
        return Err(ThrumError::conflict(format!("session already ended: {session_id}")));
    }

    let end_reason = match reason.as_deref() {
        None | Some("normal") => EndReason::Normal,
        Some("crash_recovered") => EndReason::CrashRecovered,
        Some("kicked") => EndReason::Kicked,
        Some(other) => {
            return Err(ThrumError::invalid_request(format!("unknown end reason: {other}")))
        }
    };

    let started_at = session.started_at;
    let ended_at = end_session(handlers, session.session_id, end_reason)?;
    if conn.current_session() == Some(session.session_id) {
        conn.set_current_session(None);
    }

    let duration_ms = (ended_at - started_at).num_milliseconds();
    Ok(Response::SessionEnded { session_id: session.session_id.to_string(), duration_ms })
}

/// Shared by `session.end` and orphan recovery: appends `session.end`
/// carrying the aggregated WorkContext snapshot (if any) and cascades
/// subscription deletion for the session (spec §4.3, invariant 5).
fn end_session<C: Clock + 'static>(
    handlers: &Handlers<C>,
    session_id: SessionId,
    reason: EndReason,
) -> Result<chrono::DateTime<chrono::Utc>, ThrumError> {
    let work_context = handlers.state.read(|s| s.work_contexts.get(&session_id).cloned());
    let ended_at = handlers.clock.event_timestamp();
    handlers.commit(EventBody::SessionEnd {
        session_id,
        ended_at,
        end_reason: reason,
        work_context,
    })?;

    let sub_ids: Vec<u64> = handlers.state.read(|s| {
        s.subscriptions.values().filter(|sub| sub.session_id == session_id).map(|sub| sub.sub_id).collect()
    });
    for sub_id in sub_ids {
        handlers.commit(EventBody::SubscriptionRemove { sub_id, session_id })?;
    }

    Ok(ended_at)
}

#[allow(clippy::too_many_arguments)]
pub async fn heartbeat<C: Clock + 'static>(
    handlers: &Handlers<C>,
    session_id: &str,
    add_scopes: Vec<Scope>,
    remove_scopes: Vec<Scope>,
    add_refs: Vec<Ref>,
    remove_refs: Vec<Ref>,
) -> Result<Response, ThrumError> {
    let session = handlers
        .state
        .read(|s| s.get_session(session_id).cloned())
        .ok_or_else(|| ThrumError::not_found(format!("session not found: {session_id}")))?;
    if session.ended_at.is_some() {
        return Err(ThrumError::conflict(format!("session already ended: {session_id}")));
    }

    let last_seen_at = handlers.clock.event_timestamp();
    handlers.commit(EventBody::SessionHeartbeat {
        session_id: session.session_id,
        last_seen_at,
    })?;

    let merged_refs: Vec<Ref> =
        session.refs.iter().cloned().chain(add_refs.iter().cloned()).collect();
    handlers.state.apply_heartbeat_deltas(
        session.session_id,
        add_scopes,
        remove_scopes,
        add_refs,
        remove_refs,
    );

    if let Some(worktree_ref) = merged_refs.iter().find(|r| r.kind == "worktree") {
        if let Ok(snapshot) = handlers.worktree.inspect(&worktree_ref.value).await {
            handlers.state.apply_worktree_snapshot(
                session.session_id,
                session.agent_id,
                &worktree_ref.value,
                snapshot,
                last_seen_at,
            );
        }
    }

    Ok(Response::Heartbeat { last_seen_at })
}

pub fn set_intent<C: Clock + 'static>(
    handlers: &Handlers<C>,
    session_id: &str,
    intent: String,
) -> Result<Response, ThrumError> {
    let session = handlers
        .state
        .read(|s| s.get_session(session_id).cloned())
        .ok_or_else(|| ThrumError::not_found(format!("session not found: {session_id}")))?;
    let now = handlers.clock.event_timestamp();
    handlers.state.upsert_work_context_text(
        session.session_id,
        session.agent_id,
        Some(intent),
        None,
        now,
    );
    Ok(Response::Ok)
}

pub fn set_task<C: Clock + 'static>(
    handlers: &Handlers<C>,
    session_id: &str,
    current_task: String,
) -> Result<Response, ThrumError> {
    let session = handlers
        .state
        .read(|s| s.get_session(session_id).cloned())
        .ok_or_else(|| ThrumError::not_found(format!("session not found: {session_id}")))?;
    let now = handlers.clock.event_timestamp();
    handlers.state.upsert_work_context_text(
        session.session_id,
        session.agent_id,
        None,
        Some(current_task),
        now,
    );
    Ok(Response::Ok)
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
