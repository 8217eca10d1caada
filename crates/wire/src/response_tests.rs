use super::*;

#[test]
fn ok_serializes_with_type_tag_only() {
    let json = serde_json::to_value(Response::Ok).unwrap();
    assert_eq!(json, serde_json::json!({"type": "Ok"}));
}

#[test]
fn error_response_carries_code_and_message() {
    let response =
        Response::Error { error: ErrorBody::new(ErrorKind::NotFound, "no such message") };
    let json = serde_json::to_value(&response).unwrap();
    assert_eq!(json["error"]["code"], "not_found");
    assert_eq!(json["error"]["message"], "no such message");
}

#[test]
fn sync_batch_round_trips() {
    let response = Response::SyncBatch {
        events: vec![EventEnvelope {
            seq: 1,
            event_id: "evt_x".into(),
            origin_daemon_id: "dmn_x".into(),
            origin_event_id: "evt_x".into(),
            recorded_at: chrono::Utc::now(),
            body: serde_json::json!({"kind": "group_delete", "data": {"group_id": "grp_x"}}),
        }],
        next_sequence: 2,
        more_available: false,
    };
    let json = serde_json::to_string(&response).unwrap();
    let back: Response = serde_json::from_str(&json).unwrap();
    assert_eq!(back, response);
}
