//! Per-domain RPC handlers (spec §4.3). Each validates its request,
//! mutates state through [`crate::state::State`], and returns a
//! [`Response`]. Handlers never invent failure shapes — everything maps
//! onto [`thrum_core::ErrorKind`] (spec §7).

mod agent;
mod context;
mod group;
mod message;
mod peer;
mod session;
mod subscription;
mod sync;

pub use group::ensure_everyone_group;

use std::path::PathBuf;
use std::sync::Arc;

use thrum_core::{Clock, DaemonId, ThrumError};
use thrum_wire::{Request, Response};
use tracing::{error, instrument};

use parking_lot::Mutex;
use tokio::sync::oneshot;

use crate::config::DaemonConfig;
use crate::connection::ConnectionState;
use crate::pairing::{JoinedPeer, PairingManager};
use crate::peer_client::PeerClient;
use crate::peer_registry::PeerRegistry;
use crate::state::State;
use crate::sync_loop::SyncLoop;
use crate::worktree::WorktreeInspector;

/// Everything a handler needs, bundled so `dispatch` can pass one
/// reference instead of threading half a dozen arguments through.
pub struct Handlers<C: Clock + 'static> {
    pub state: Arc<State<C>>,
    pub clock: C,
    pub config: DaemonConfig,
    pub context_dir: PathBuf,
    pub peer_registry: Arc<PeerRegistry>,
    pub pairing: Arc<PairingManager>,
    pub worktree: Arc<dyn WorktreeInspector>,
    pub peer_client: Arc<dyn PeerClient>,
    pub sync: Arc<SyncLoop<C>>,
    pub hostname: String,
    pub my_address: String,
    /// Bridges `peer.start_pairing` and `peer.wait_pairing`, which arrive
    /// as separate RPCs: the receiver half of the oneshot channel
    /// [`PairingManager::start`] hands back has nowhere else to live
    /// between the two calls.
    pub pairing_rx: Mutex<Option<oneshot::Receiver<JoinedPeer>>>,
}

impl<C: Clock + 'static> Handlers<C> {
    pub fn daemon_id(&self) -> DaemonId {
        self.state.daemon_id()
    }

    /// Append an event and, having released the write lock, tell the
    /// SyncLoop about it (spec §4.2 point 3: "notify any local observers
    /// ... after the lock is released").
    fn commit(&self, body: thrum_core::EventBody) -> Result<thrum_core::Event, ThrumError> {
        let event = self.state.write_event(body).map_err(|e| ThrumError::io(e.to_string()))?;
        self.sync.notify_peers_of_local_write();
        Ok(event)
    }

    /// Same shape as [`Self::commit`], for `subscription.add`'s seq-derived
    /// `sub_id` (see [`crate::state::State::write_subscription_add`]).
    fn commit_subscription_add(
        &self,
        session_id: thrum_core::session::SessionId,
        filter: thrum_core::Filter,
    ) -> Result<thrum_core::subscription::SubscriptionId, ThrumError> {
        let (sub_id, _event) = self
            .state
            .write_subscription_add(session_id, filter)
            .map_err(|e| ThrumError::io(e.to_string()))?;
        self.sync.notify_peers_of_local_write();
        Ok(sub_id)
    }
}

/// Dispatch one request to its handler, converting any [`ThrumError`] into
/// a `Response::Error` (spec §6: "Errors are returned as `{error: {code,
/// message}}`"). `conn` is the calling connection's pinned-session state
/// (spec §9: "caller-identifying environment ... is presented by the
/// transport with each RPC") — one per connection, owned by the listener.
#[instrument(skip(handlers, conn, request), fields(method = request_method(&request)))]
pub async fn dispatch<C: Clock + 'static>(
    handlers: &Handlers<C>,
    conn: &ConnectionState,
    request: Request,
) -> Response {
    let result = dispatch_inner(handlers, conn, request).await;
    match result {
        Ok(response) => response,
        Err(e) => {
            error!(kind = e.kind.code(), message = %e.message, "handler error");
            Response::Error { error: thrum_wire::ErrorBody::new(e.kind, e.message) }
        }
    }
}

fn request_method(request: &Request) -> &'static str {
    match request {
        Request::AgentRegister { .. } => "agent.register",
        Request::SessionStart { .. } => "session.start",
        Request::SessionEnd { .. } => "session.end",
        Request::SessionHeartbeat { .. } => "session.heartbeat",
        Request::SessionSetIntent { .. } => "session.setIntent",
        Request::SessionSetTask { .. } => "session.setTask",
        Request::MessageSend { .. } => "message.send",
        Request::MessageGet { .. } => "message.get",
        Request::MessageList { .. } => "message.list",
        Request::MessageDelete { .. } => "message.delete",
        Request::Subscribe { .. } => "subscribe",
        Request::Unsubscribe { .. } => "unsubscribe",
        Request::GroupCreate { .. } => "group.create",
        Request::GroupDelete { .. } => "group.delete",
        Request::GroupMemberAdd { .. } => "group.member.add",
        Request::GroupMemberRemove { .. } => "group.member.remove",
        Request::GroupList => "group.list",
        Request::GroupInfo { .. } => "group.info",
        Request::GroupMembers { .. } => "group.members",
        Request::ContextSave { .. } => "context.save",
        Request::ContextShow { .. } => "context.show",
        Request::ContextClear { .. } => "context.clear",
        Request::PeerStartPairing => "peer.start_pairing",
        Request::PeerJoin { .. } => "peer.join",
        Request::PeerWaitPairing => "peer.wait_pairing",
        Request::PeerRemove { .. } => "peer.remove",
        Request::PairRequest { .. } => "pair.request",
        Request::SyncPull { .. } => "sync.pull",
        Request::SyncNotify { .. } => "sync.notify",
        Request::SyncPeerInfo => "sync.peer_info",
        Request::SyncStatus => "sync.status",
        Request::Ping => "ping",
        Request::Hello { .. } => "hello",
    }
}

async fn dispatch_inner<C: Clock + 'static>(
    handlers: &Handlers<C>,
    conn: &ConnectionState,
    request: Request,
) -> Result<Response, ThrumError> {
    match request {
        Request::Ping => Ok(Response::Pong),
        Request::Hello { version: _ } => {
            Ok(Response::Hello { version: crate::config::PROTOCOL_VERSION.to_string() })
        }

        Request::AgentRegister { role, module, name, display, kind, force } => {
            agent::register(handlers, role, module, name, display, kind, force)
        }

        Request::SessionStart { agent_id, scopes, refs } => {
            session::start(handlers, conn, &agent_id, scopes, refs)
        }
        Request::SessionEnd { session_id, reason } => {
            session::end(handlers, conn, &session_id, reason)
        }
        Request::SessionHeartbeat { session_id, add_scopes, remove_scopes, add_refs, remove_refs } => {
            session::heartbeat(handlers, &session_id, add_scopes, remove_scopes, add_refs, remove_refs).await
        }
        Request::SessionSetIntent { session_id, intent } => {
            session::set_intent(handlers, &session_id, intent)
        }
        Request::SessionSetTask { session_id, current_task } => {
            session::set_task(handlers, &session_id, current_task)
        }

        Request::MessageSend { content, scopes, refs, reply_to, mentions } => {
            message::send(handlers, conn, content, scopes, refs, reply_to, mentions)
        }
        Request::MessageGet { message_id } => message::get(handlers, &message_id),
        Request::MessageList { page_size, cursor, sort_order, filters } => {
            message::list(handlers, page_size, cursor, sort_order, filters)
        }
        Request::MessageDelete { message_id } => message::delete(handlers, &message_id),

        Request::Subscribe { scope, mention_role, mention_agent, all } => {
            subscription::subscribe(handlers, conn, scope, mention_role, mention_agent, all)
        }
        Request::Unsubscribe { subscription_id } => {
            subscription::unsubscribe(handlers, subscription_id)
        }

        Request::GroupCreate { name, description, members } => {
            group::create(handlers, name, description, members)
        }
        Request::GroupDelete { name, delete_messages } => {
            group::delete(handlers, &name, delete_messages)
        }
        Request::GroupMemberAdd { name, member } => group::member_add(handlers, &name, member),
        Request::GroupMemberRemove { name, member } => group::member_remove(handlers, &name, member),
        Request::GroupList => group::list(handlers),
        Request::GroupInfo { name } => group::info(handlers, &name),
        Request::GroupMembers { name } => group::members(handlers, &name),

        Request::ContextSave { agent_name, content } => context::save(handlers, &agent_name, content),
        Request::ContextShow { agent_name } => context::show(handlers, &agent_name),
        Request::ContextClear { agent_name } => context::clear(handlers, &agent_name),

        Request::PeerStartPairing => peer::start_pairing(handlers),
        Request::PeerJoin { address, code } => peer::join(handlers, &address, &code).await,
        Request::PeerWaitPairing => peer::wait_pairing(handlers).await,
        Request::PeerRemove { name, daemon_id } => peer::remove(handlers, name, daemon_id),
        Request::PairRequest { code, daemon_id, name, address } => {
            peer::pair_request(handlers, &code, &daemon_id, &name, &address)
        }

        Request::SyncPull { token, after_sequence, max_batch } => {
            sync::pull(handlers, &token, after_sequence, max_batch)
        }
        Request::SyncNotify { token, daemon_id, latest_seq, event_count } => {
            sync::notify(handlers, &token, &daemon_id, latest_seq, event_count)
        }
        Request::SyncPeerInfo => sync::peer_info(handlers),
        Request::SyncStatus => sync::status(handlers),
    }
}
