//! Per-connection state the transport keeps alongside the shared
//! [`crate::handlers::Handlers`] (spec §4.3, §9: "caller-identifying
//! environment ... is presented by the transport with each RPC").
//!
//! A client pins itself to a session by calling `session.start`; every
//! later RPC on the same connection that needs "the caller's active
//! session" (`message.send`, `subscribe`) reads it from here rather than
//! re-deriving identity per call.

use parking_lot::Mutex;
use thrum_core::session::SessionId;

#[derive(Default)]
pub struct ConnectionState {
    current_session: Mutex<Option<SessionId>>,
}

impl ConnectionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_session(&self) -> Option<SessionId> {
        *self.current_session.lock()
    }

    pub fn set_current_session(&self, session_id: Option<SessionId>) {
        *self.current_session.lock() = session_id;
    }
}

#[cfg(test)]
#[path = "connection_tests.rs"]
mod tests;
