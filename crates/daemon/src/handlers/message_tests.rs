use super::*;
use crate::connection::ConnectionState;
use crate::test_support::test_handlers;
use thrum_wire::MessageFilters;

fn agent_with_session(handlers: &Handlers<thrum_core::FakeClock>) -> (ConnectionState, String) {
    let response = super::super::agent::register(
        handlers,
        "planner".to_string(),
        "core".to_string(),
        None,
        None,
        None,
        false,
    )
    .unwrap();
    let Response::Agent { agent_id, .. } = response else { panic!("expected Response::Agent") };

    let conn = ConnectionState::new();
    super::super::session::start(handlers, &conn, &agent_id, vec![], vec![]).unwrap();
    (conn, agent_id)
}

#[test]
fn send_without_an_active_session_is_rejected() {
    let (handlers, _dir) = test_handlers("repo1");
    let conn = ConnectionState::new();
    let err = send(&handlers, &conn, "hi".to_string(), vec![], vec![], None, vec![]).unwrap_err();
    assert_eq!(err.kind, thrum_core::ErrorKind::InvalidRequest);
}

#[test]
fn send_without_reply_to_carries_no_thread() {
    let (handlers, _dir) = test_handlers("repo1");
    let (conn, _agent_id) = agent_with_session(&handlers);

    let response =
        send(&handlers, &conn, "hello".to_string(), vec![], vec![], None, vec![]).unwrap();
    let Response::MessageSent { thread_id, .. } = response else {
        panic!("expected Response::MessageSent")
    };
    assert!(thread_id.is_none());
}

#[test]
fn first_reply_mints_a_thread_shared_with_the_parent() {
    let (handlers, _dir) = test_handlers("repo1");
    let (conn, _agent_id) = agent_with_session(&handlers);

    let Response::MessageSent { message_id: parent_id, thread_id: parent_thread, .. } =
        send(&handlers, &conn, "root".to_string(), vec![], vec![], None, vec![]).unwrap()
    else {
        panic!("expected Response::MessageSent")
    };
    assert!(parent_thread.is_none());

    let Response::MessageSent { thread_id: reply_thread, .. } = send(
        &handlers,
        &conn,
        "a reply".to_string(),
        vec![],
        vec![],
        Some(parent_id.clone()),
        vec![],
    )
    .unwrap() else {
        panic!("expected Response::MessageSent")
    };
    assert!(reply_thread.is_some());

    let Response::Message { message } = get(&handlers, &parent_id).unwrap() else {
        panic!("expected Response::Message")
    };
    assert_eq!(message.unwrap().thread_id, reply_thread);
}

#[test]
fn second_reply_inherits_the_existing_thread() {
    let (handlers, _dir) = test_handlers("repo1");
    let (conn, _agent_id) = agent_with_session(&handlers);

    let Response::MessageSent { message_id: parent_id, .. } =
        send(&handlers, &conn, "root".to_string(), vec![], vec![], None, vec![]).unwrap()
    else {
        panic!("expected Response::MessageSent")
    };
    let Response::MessageSent { thread_id: first_reply_thread, .. } = send(
        &handlers,
        &conn,
        "reply one".to_string(),
        vec![],
        vec![],
        Some(parent_id.clone()),
        vec![],
    )
    .unwrap() else {
        panic!("expected Response::MessageSent")
    };
    let Response::MessageSent { thread_id: second_reply_thread, .. } = send(
        &handlers,
        &conn,
        "reply two".to_string(),
        vec![],
        vec![],
        Some(parent_id),
        vec![],
    )
    .unwrap() else {
        panic!("expected Response::MessageSent")
    };

    assert_eq!(first_reply_thread, second_reply_thread);
}

#[test]
fn reply_to_a_missing_message_is_not_found() {
    let (handlers, _dir) = test_handlers("repo1");
    let (conn, _agent_id) = agent_with_session(&handlers);

    let err = send(
        &handlers,
        &conn,
        "a reply".to_string(),
        vec![],
        vec![],
        Some("msg_doesnotexist".to_string()),
        vec![],
    )
    .unwrap_err();
    assert_eq!(err.kind, thrum_core::ErrorKind::NotFound);
}

#[test]
fn reply_to_a_deleted_message_is_not_found() {
    let (handlers, _dir) = test_handlers("repo1");
    let (conn, _agent_id) = agent_with_session(&handlers);

    let Response::MessageSent { message_id: parent_id, .. } =
        send(&handlers, &conn, "root".to_string(), vec![], vec![], None, vec![]).unwrap()
    else {
        panic!("expected Response::MessageSent")
    };
    delete(&handlers, &parent_id).unwrap();

    let err = send(
        &handlers,
        &conn,
        "a reply".to_string(),
        vec![],
        vec![],
        Some(parent_id),
        vec![],
    )
    .unwrap_err();
    assert_eq!(err.kind, thrum_core::ErrorKind::NotFound);
}

#[test]
fn delete_marks_a_message_deleted_but_get_still_returns_it() {
    let (handlers, _dir) = test_handlers("repo1");
    let (conn, _agent_id) = agent_with_session(&handlers);

    let Response::MessageSent { message_id, .. } =
        send(&handlers, &conn, "root".to_string(), vec![], vec![], None, vec![]).unwrap()
    else {
        panic!("expected Response::MessageSent")
    };
    delete(&handlers, &message_id).unwrap();

    let Response::Message { message } = get(&handlers, &message_id).unwrap() else {
        panic!("expected Response::Message")
    };
    assert!(message.unwrap().deleted);
}

#[test]
fn list_paginates_and_orders_descending_by_default() {
    let (handlers, _dir) = test_handlers("repo1");
    let (conn, _agent_id) = agent_with_session(&handlers);

    for i in 0..5 {
        send(&handlers, &conn, format!("message {i}"), vec![], vec![], None, vec![]).unwrap();
        handlers.clock.advance(std::time::Duration::from_millis(1));
    }

    let Response::Messages { messages, next_cursor } =
        list(&handlers, Some(2), None, None, MessageFilters::default()).unwrap()
    else {
        panic!("expected Response::Messages")
    };
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].content, "message 4");
    assert!(next_cursor.is_some());

    let Response::Messages { messages: page2, .. } =
        list(&handlers, Some(2), next_cursor, None, MessageFilters::default()).unwrap()
    else {
        panic!("expected Response::Messages")
    };
    assert_eq!(page2[0].content, "message 2");
}

#[test]
fn list_filters_by_sender() {
    let (handlers, _dir) = test_handlers("repo1");
    let (conn, agent_id) = agent_with_session(&handlers);
    send(&handlers, &conn, "mine".to_string(), vec![], vec![], None, vec![]).unwrap();

    let filters = MessageFilters { sender: Some(agent_id), ..MessageFilters::default() };
    let Response::Messages { messages, .. } =
        list(&handlers, None, None, None, filters).unwrap()
    else {
        panic!("expected Response::Messages")
    };
    assert_eq!(messages.len(), 1);

    let filters = MessageFilters { sender: Some("agt_someoneelse".to_string()), ..MessageFilters::default() };
    let Response::Messages { messages, .. } =
        list(&handlers, None, None, None, filters).unwrap()
    else {
        panic!("expected Response::Messages")
    };
    assert!(messages.is_empty());
}
