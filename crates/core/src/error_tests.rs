use super::*;

#[test]
fn error_kind_codes_match_spec_names() {
    assert_eq!(ErrorKind::InvalidRequest.code(), "invalid_request");
    assert_eq!(ErrorKind::NotFound.code(), "not_found");
    assert_eq!(ErrorKind::Conflict.code(), "conflict");
    assert_eq!(ErrorKind::Protected.code(), "protected");
    assert_eq!(ErrorKind::Auth.code(), "auth");
    assert_eq!(ErrorKind::Io.code(), "io");
    assert_eq!(ErrorKind::Timeout.code(), "timeout");
    assert_eq!(ErrorKind::Internal.code(), "internal");
}

#[test]
fn constructors_set_the_matching_kind() {
    assert_eq!(ThrumError::not_found("x").kind, ErrorKind::NotFound);
    assert_eq!(ThrumError::protected("x").kind, ErrorKind::Protected);
    assert_eq!(ThrumError::conflict("x").kind, ErrorKind::Conflict);
}

#[test]
fn io_error_converts_to_io_kind() {
    let io_err = std::io::Error::other("disk gone");
    let err: ThrumError = io_err.into();
    assert_eq!(err.kind, ErrorKind::Io);
}

#[test]
fn serde_round_trips_snake_case() {
    let json = serde_json::to_string(&ErrorKind::NotFound).unwrap();
    assert_eq!(json, "\"not_found\"");
    let parsed: ErrorKind = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, ErrorKind::NotFound);
}
