//! Single-writer guard over the journal and materialized state (spec
//! §4.2). Mutations take the write lock; reads take the read lock;
//! notifying local observers (SubscriptionMatcher, SyncLoop) happens only
//! after the lock is released, never from inside `write_event`.

use parking_lot::RwLock;
use thrum_core::peer::DaemonId;
use thrum_core::session::SessionId;
use thrum_core::subscription::{Filter, SubscriptionId};
use thrum_core::{Clock, Event, EventBody, EventId, Ref, Scope};
use thrum_storage::{MaterializedState, Wal, WalError};

struct Inner {
    wal: Wal,
    materialized: MaterializedState,
}

/// Owns the journal and its derived tables behind one `RwLock`, matching
/// spec §4.2/§5: "a single readers-writer lock guards the event log and
/// all derived tables."
pub struct State<C: Clock> {
    daemon_id: DaemonId,
    clock: C,
    inner: RwLock<Inner>,
}

impl<C: Clock> State<C> {
    pub fn new(daemon_id: DaemonId, clock: C, wal: Wal, materialized: MaterializedState) -> Self {
        Self { daemon_id, clock, inner: RwLock::new(Inner { wal, materialized }) }
    }

    pub fn daemon_id(&self) -> DaemonId {
        self.daemon_id
    }

    /// Take the read lock and run `f` against the materialized views.
    pub fn read<R>(&self, f: impl FnOnce(&MaterializedState) -> R) -> R {
        let inner = self.inner.read();
        f(&inner.materialized)
    }

    /// `WriteEvent`: assigns a sequence number, appends to the journal,
    /// and applies to the derived tables in one critical section. On I/O
    /// failure the derived tables are left untouched (append happens
    /// first; apply only runs once the append has succeeded).
    pub fn write_event(&self, body: EventBody) -> Result<Event, WalError> {
        let mut inner = self.inner.write();
        let event_id = EventId::new();
        let draft = Event {
            seq: 0,
            event_id,
            origin_daemon_id: self.daemon_id,
            origin_event_id: event_id,
            recorded_at: self.clock.event_timestamp(),
            body,
        };
        let seq = inner.wal.append(&draft)?;
        let event = Event { seq, ..draft };
        inner.materialized.apply_event(&event);
        if inner.wal.needs_flush() {
            inner.wal.flush()?;
        }
        Ok(event)
    }

    /// Fold a replicated event (foreign `origin_daemon_id`) into this
    /// daemon's log under a freshly assigned local `seq`, keeping its
    /// original idempotency key intact. Returns `false` if the event's
    /// `(origin_daemon_id, origin_event_id)` pair was already applied —
    /// spec §4.4's "silently dropped and counted as skipped."
    pub fn apply_replicated(&self, event: Event) -> Result<bool, WalError> {
        let mut inner = self.inner.write();
        if inner.materialized.already_applied(&event) {
            return Ok(false);
        }
        let seq = inner.wal.append(&event)?;
        let event = Event { seq, ..event };
        inner.materialized.apply_event(&event);
        if inner.wal.needs_flush() {
            inner.wal.flush()?;
        }
        Ok(true)
    }

    /// `Subscribe`: commits a `subscription.add` event whose `sub_id` is
    /// the event's own `seq`, so subscription ids come from the journal's
    /// existing monotonic counter instead of a second id scheme.
    pub fn write_subscription_add(
        &self,
        session_id: SessionId,
        filter: Filter,
    ) -> Result<(SubscriptionId, Event), WalError> {
        let mut inner = self.inner.write();
        // `Wal::append` assigns `write_seq + 1`; computing it here under
        // the same write-lock critical section lets the event embed its
        // own seq as `sub_id` before it's ever written out.
        let sub_id = inner.wal.write_seq() + 1;
        let event_id = EventId::new();
        let draft = Event {
            seq: 0,
            event_id,
            origin_daemon_id: self.daemon_id,
            origin_event_id: event_id,
            recorded_at: self.clock.event_timestamp(),
            body: EventBody::SubscriptionAdd { sub_id, session_id, filter },
        };
        let seq = inner.wal.append(&draft)?;
        debug_assert_eq!(seq, sub_id);
        let event = Event { seq, ..draft };
        inner.materialized.apply_event(&event);
        if inner.wal.needs_flush() {
            inner.wal.flush()?;
        }
        Ok((sub_id, event))
    }

    /// Advance a peer's `last_pulled_seq` bookkeeping without appending an
    /// event — how far along a local sync got is this daemon's own
    /// business, not a fact peers need to agree on (spec §3 Peer
    /// lifecycle: "`last_synced_seq` advances monotonically").
    pub fn bump_peer_cursor(&self, peer_daemon_id: DaemonId, seq: u64) {
        let mut inner = self.inner.write();
        if let Some(peer) = inner.materialized.peers.get_mut(&peer_daemon_id) {
            peer.last_pulled_seq = peer.last_pulled_seq.max(seq);
        }
    }

    /// Apply a `session.heartbeat` scope/ref set-delta directly to the
    /// session row. Not event-sourced: like [`Self::bump_peer_cursor`],
    /// this is local bookkeeping refreshed constantly by live sessions,
    /// not a fact peers need to replay (spec §4.3: "applies set-delta").
    /// Returns `false` if the session doesn't exist.
    pub fn apply_heartbeat_deltas(
        &self,
        session_id: SessionId,
        add_scopes: Vec<Scope>,
        remove_scopes: Vec<Scope>,
        add_refs: Vec<Ref>,
        remove_refs: Vec<Ref>,
    ) -> bool {
        let mut inner = self.inner.write();
        let Some(session) = inner.materialized.sessions.get_mut(&session_id) else {
            return false;
        };
        for scope in remove_scopes {
            session.scopes.remove(&scope);
        }
        for scope in add_scopes {
            session.scopes.insert(scope);
        }
        for r in remove_refs {
            session.refs.remove(&r);
        }
        for r in add_refs {
            session.refs.insert(r);
        }
        true
    }

    /// Upsert the `intent`/`current_task` fields on a session's WorkContext
    /// (spec §4.3: "No event is produced until `session.end`"). Creates a
    /// fresh WorkContext row if this session has never had one.
    pub fn upsert_work_context_text(
        &self,
        session_id: SessionId,
        agent_id: thrum_core::AgentId,
        intent: Option<String>,
        current_task: Option<String>,
        now: chrono::DateTime<chrono::Utc>,
    ) {
        let mut inner = self.inner.write();
        let ctx = inner.materialized.work_contexts.entry(session_id).or_insert_with(|| {
            thrum_core::WorkContext {
                session_id,
                agent_id,
                branch: None,
                worktree_path: None,
                unmerged_commits: 0,
                uncommitted_files: 0,
                changed_files: Vec::new(),
                git_updated_at: now,
                intent: None,
                intent_updated_at: None,
                current_task: None,
                task_updated_at: None,
                session_ended: false,
            }
        });
        if let Some(intent) = intent {
            ctx.intent = Some(intent);
            ctx.intent_updated_at = Some(now);
        }
        if let Some(task) = current_task {
            ctx.current_task = Some(task);
            ctx.task_updated_at = Some(now);
        }
    }

    /// Fold a [`crate::worktree::WorktreeSnapshot`] into a session's
    /// WorkContext row (best-effort heartbeat side effect, spec §4.3).
    pub fn apply_worktree_snapshot(
        &self,
        session_id: SessionId,
        agent_id: thrum_core::AgentId,
        worktree_path: &str,
        snapshot: crate::worktree::WorktreeSnapshot,
        now: chrono::DateTime<chrono::Utc>,
    ) {
        let mut inner = self.inner.write();
        let ctx = inner.materialized.work_contexts.entry(session_id).or_insert_with(|| {
            thrum_core::WorkContext {
                session_id,
                agent_id,
                branch: None,
                worktree_path: None,
                unmerged_commits: 0,
                uncommitted_files: 0,
                changed_files: Vec::new(),
                git_updated_at: now,
                intent: None,
                intent_updated_at: None,
                current_task: None,
                task_updated_at: None,
                session_ended: false,
            }
        });
        crate::worktree::apply_snapshot(ctx, worktree_path, snapshot, now);
    }

    pub fn latest_seq(&self) -> u64 {
        self.inner.read().wal.write_seq()
    }

    /// `GetEventsSince(after_seq, limit)`, batch-capped at 1000 (spec §4.1).
    ///
    /// Subscriptions are per-daemon and never replicated (see
    /// `thrum_storage::state::subscriptions`), so `subscription.add`/
    /// `subscription.remove` events are dropped from the batch before it's
    /// handed to a peer. `next_seq` still advances past their real WAL
    /// `seq`, computed from the capped-but-unfiltered batch, so a filtered
    /// trailing run of subscription events can't make a peer re-pull the
    /// same entries forever.
    ///
    /// Takes the write lock rather than the read lock: `Wal::entries_after`
    /// seeks the shared journal file handle, so concurrent readers would
    /// race on its cursor. Readers of the materialized views still use
    /// [`Self::read`] and aren't blocked by this.
    pub fn events_since(&self, after_seq: u64, limit: u32) -> (Vec<Event>, u64, bool) {
        let cap = limit.min(1000) as usize;
        let mut inner = self.inner.write();
        let all = inner.wal.entries_after(after_seq).unwrap_or_default();
        let more_available = all.len() > cap;
        let capped: Vec<Event> = all.into_iter().take(cap).map(|entry| entry.event).collect();
        let next_seq = capped.last().map(|e| e.seq).unwrap_or(after_seq);
        let batch: Vec<Event> = capped
            .into_iter()
            .filter(|e| {
                !matches!(e.body, EventBody::SubscriptionAdd { .. } | EventBody::SubscriptionRemove { .. })
            })
            .collect();
        (batch, next_seq, more_available)
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
