use super::*;
use std::collections::HashMap;

crate::define_id! {
    /// Test ID type for macro verification.
    pub struct TestId("tst_");
}

#[test]
fn define_id_hash_map_lookup() {
    let mut map = HashMap::new();
    let id = TestId::new();
    map.insert(id, 42);
    assert_eq!(map.get(id.as_str()), Some(&42));
}

#[test]
fn define_id_round_trips_through_string() {
    let id = TestId::new();
    let parsed = TestId::from_string(id.as_str());
    assert_eq!(id, parsed);
}

#[test]
fn define_id_carries_its_prefix() {
    let id = TestId::new();
    assert!(id.as_str().starts_with(TestId::PREFIX));
    assert_eq!(TestId::PREFIX, "tst_");
}

#[test]
fn define_id_short_truncates_the_suffix() {
    let id = TestId::from_string("tst_abcdefghijklmnop");
    assert_eq!(id.short(4), "abcd");
}

#[test]
fn define_id_short_returns_full_when_shorter() {
    let id = TestId::from_string("tst_abc");
    assert_eq!(id.short(8), "abc");
}

#[test]
fn short_fn_on_str() {
    let s = "abcdefghijklmnop";
    assert_eq!(short(s, 8), "abcdefgh");
    assert_eq!(short(s, 100), s);
    assert_eq!(short("abc", 8), "abc");
}

#[test]
fn idbuf_new_truncates_to_capacity() {
    let long = "x".repeat(ID_MAX_LEN + 1);
    let buf = IdBuf::new(&long[..ID_MAX_LEN]);
    assert_eq!(buf.as_str().len(), ID_MAX_LEN);
}
