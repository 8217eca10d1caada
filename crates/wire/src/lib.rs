//! IPC Protocol for daemon communication.
//!
//! Wire format: 4-byte length prefix (big-endian) + JSON payload

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod request;
mod response;
#[allow(clippy::module_inception)]
mod wire;

pub use request::{filter_from_request, MessageFilters, Request, SortOrder};
pub use response::{ErrorBody, EventEnvelope, GroupSummary, MessageSummary, Response};
pub use wire::{decode, encode, read_message, write_message, ProtocolError};
pub use wire::{read_request, write_response};
