//! Subscription handlers. Subscriptions are per-daemon and never
//! replicated, but still flow through the same event/apply pipeline so
//! the daemon's own restart recovers them from its journal.

use thrum_core::{EventBody, Subscription};

use super::MaterializedState;

pub(crate) fn apply(state: &mut MaterializedState, body: &EventBody) {
    match body {
        EventBody::SubscriptionAdd { sub_id, session_id, filter } => {
            state.subscriptions.insert(
                *sub_id,
                Subscription { sub_id: *sub_id, session_id: *session_id, filter: filter.clone() },
            );
        }

        EventBody::SubscriptionRemove { sub_id, .. } => {
            state.subscriptions.remove(sub_id);
        }

        _ => {}
    }
}
