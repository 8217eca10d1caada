use super::*;
use thrum_core::peer::DaemonId;
use thrum_core::test_support::{agent_register_event, message_send_event, session_start_event, test_agent, test_message, test_session};
use thrum_core::{EventBody, GroupId};

fn origin() -> DaemonId {
    DaemonId::new()
}

#[test]
fn agent_register_populates_agents_map() {
    let mut state = MaterializedState::default();
    let agent = test_agent("repo", "engineer", "core");
    let event = agent_register_event(origin(), 1, &agent);

    state.apply_event(&event);

    assert_eq!(state.agents.len(), 1);
    assert_eq!(state.get_agent(agent.agent_id.as_str()).unwrap().role, "engineer");
}

#[test]
fn apply_event_is_idempotent_by_origin_and_event_id() {
    let mut state = MaterializedState::default();
    let agent = test_agent("repo", "engineer", "core");
    let event = agent_register_event(origin(), 1, &agent);

    state.apply_event(&event);
    state.apply_event(&event);

    assert_eq!(state.agents.len(), 1);
}

#[test]
fn session_start_then_end_marks_inactive_and_keeps_fresh_work_context() {
    let mut state = MaterializedState::default();
    let agent = test_agent("repo", "engineer", "core");
    let session = test_session(agent.agent_id);
    let origin = origin();

    state.apply_event(&agent_register_event(origin, 1, &agent));
    state.apply_event(&session_start_event(origin, 2, &session));
    assert!(state.get_session(session.session_id.as_str()).unwrap().is_active());

    let ctx = thrum_core::WorkContext {
        session_id: session.session_id,
        agent_id: agent.agent_id,
        branch: Some("main".into()),
        worktree_path: None,
        unmerged_commits: 0,
        uncommitted_files: 0,
        changed_files: Vec::new(),
        git_updated_at: chrono::Utc::now(),
        intent: None,
        intent_updated_at: None,
        current_task: None,
        task_updated_at: None,
        session_ended: false,
    };
    let end_event = thrum_core::test_support::local_event(
        origin,
        3,
        EventBody::SessionEnd {
            session_id: session.session_id,
            ended_at: chrono::Utc::now(),
            end_reason: thrum_core::EndReason::Normal,
            work_context: Some(ctx),
        },
    );
    state.apply_event(&end_event);

    let stored = state.get_session(session.session_id.as_str()).unwrap();
    assert!(!stored.is_active());
    assert!(state.work_contexts.contains_key(&session.session_id));
}

#[test]
fn gc_stale_work_contexts_drops_only_ended_and_old() {
    let mut state = MaterializedState::default();
    let now = chrono::Utc::now();
    let stale_session = thrum_core::SessionId::new();
    state.work_contexts.insert(
        stale_session,
        thrum_core::WorkContext {
            session_id: stale_session,
            agent_id: thrum_core::AgentId::new(),
            branch: None,
            worktree_path: None,
            unmerged_commits: 0,
            uncommitted_files: 0,
            changed_files: Vec::new(),
            git_updated_at: now - chrono::Duration::hours(48),
            intent: None,
            intent_updated_at: None,
            current_task: None,
            task_updated_at: None,
            session_ended: true,
        },
    );

    state.gc_stale_work_contexts(now, thrum_core::default_staleness_window());

    assert!(state.work_contexts.is_empty());
}

#[test]
fn message_send_is_not_overwritten_by_replay() {
    let mut state = MaterializedState::default();
    let agent = test_agent("repo", "engineer", "core");
    let session = test_session(agent.agent_id);
    let message = test_message(agent.agent_id, session.session_id, "hello");
    let origin = origin();
    let event = message_send_event(origin, 1, &message);

    state.apply_event(&event);
    state.apply_event(&event);

    assert_eq!(state.messages.len(), 1);
    assert!(!state.messages[&message.message_id].deleted);
}

#[test]
fn group_create_then_delete_removes_it() {
    let mut state = MaterializedState::default();
    let origin = origin();
    let group_id = GroupId::new();
    let create = thrum_core::test_support::local_event(
        origin,
        1,
        EventBody::GroupCreate {
            group_id,
            name: "engineering".into(),
            description: String::new(),
            created_at: chrono::Utc::now(),
            members: Vec::new(),
        },
    );
    state.apply_event(&create);
    assert!(state.groups.contains_key(&group_id));

    let delete = thrum_core::test_support::local_event(origin, 2, EventBody::GroupDelete { group_id });
    state.apply_event(&delete);
    assert!(!state.groups.contains_key(&group_id));
}
