use super::*;
use crate::agent::AgentId;
use crate::session::SessionId;
use chrono::Duration;

fn ctx(session_ended: bool, git_updated_at: DateTime<Utc>) -> WorkContext {
    WorkContext {
        session_id: SessionId::new(),
        agent_id: AgentId::derive("repo", "engineer", "core", None),
        branch: Some("main".into()),
        worktree_path: None,
        unmerged_commits: 0,
        uncommitted_files: 0,
        changed_files: Vec::new(),
        git_updated_at,
        intent: None,
        intent_updated_at: None,
        current_task: None,
        task_updated_at: None,
        session_ended,
    }
}

#[test]
fn keeps_contexts_from_active_sessions_regardless_of_age() {
    let now = Utc::now();
    let old = now - Duration::hours(48);
    let kept = filter_stale_contexts(vec![ctx(false, old)], now, default_staleness_window());
    assert_eq!(kept.len(), 1);
}

#[test]
fn keeps_recently_updated_contexts_from_ended_sessions() {
    let now = Utc::now();
    let recent = now - Duration::hours(1);
    let kept = filter_stale_contexts(vec![ctx(true, recent)], now, default_staleness_window());
    assert_eq!(kept.len(), 1);
}

#[test]
fn drops_contexts_both_ended_and_stale() {
    let now = Utc::now();
    let old = now - Duration::hours(25);
    let kept = filter_stale_contexts(vec![ctx(true, old)], now, default_staleness_window());
    assert!(kept.is_empty());
}

#[test]
fn boundary_at_exactly_24_hours_is_not_stale() {
    let now = Utc::now();
    let boundary = now - Duration::hours(24);
    let kept = filter_stale_contexts(vec![ctx(true, boundary)], now, default_staleness_window());
    assert_eq!(kept.len(), 1, "strictly greater-than is the drop condition");
}
