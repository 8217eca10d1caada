// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! thrum-core: shared domain types for the Thrum coordination daemon.

pub mod macros;

pub mod agent;
pub mod clock;
pub mod error;
pub mod event;
pub mod group;
pub mod id;
pub mod message;
pub mod peer;
pub mod scope;
pub mod session;
pub mod subscription;
pub mod work_context;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use agent::{Agent, AgentId, AgentKind};
pub use clock::{Clock, FakeClock, SystemClock};
pub use error::{ErrorKind, Result, ThrumError};
pub use event::{Event, EventBody, EventId};
pub use group::{everyone_group_id, Group, GroupId, Member, MemberKind, EVERYONE_GROUP_NAME};
pub use id::{short, IdBuf};
pub use message::{Message, MessageId, ThreadId};
pub use peer::{DaemonId, PairingAttempt, Peer, PeerStatus};
pub use scope::{MentionKind, MentionTarget, Ref, Scope, ScopeKind};
pub use session::{EndReason, Session, SessionId};
pub use subscription::{Filter, Subscription, SubscriptionId};
pub use work_context::{default_staleness_window, filter_stale_contexts, WorkContext};
