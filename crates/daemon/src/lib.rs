//! Thrum daemon library.
//!
//! The binary (`src/main.rs`) wires these pieces together: load
//! [`config::DaemonConfig`], open the journal and rebuild
//! [`thrum_storage::MaterializedState`], construct [`state::State`] and
//! [`handlers::Handlers`], then run [`listener`]'s accept loop.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod config;
pub mod connection;
pub mod error;
pub mod handlers;
pub mod identity;
pub mod listener;
pub mod pairing;
pub mod peer_client;
pub mod peer_registry;
pub mod state;
pub mod subscription_matcher;
pub mod sync_loop;
pub mod worktree;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use error::DaemonError;
pub use handlers::{dispatch, Handlers};
pub use state::State;
