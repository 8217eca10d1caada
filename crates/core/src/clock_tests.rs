use super::*;

#[test]
fn system_clock_returns_increasing_time() {
    let clock = SystemClock::default();
    let t1 = clock.now();
    std::thread::sleep(Duration::from_millis(1));
    let t2 = clock.now();
    assert!(t2 > t1);
}

#[test]
fn system_clock_default() {
    let clock = SystemClock::default();
    let _ = clock.now();
}

#[test]
fn system_clock_event_timestamp_strictly_increases() {
    let clock = SystemClock::default();
    let t1 = clock.event_timestamp();
    let t2 = clock.event_timestamp();
    assert!(t2 > t1);
}

#[test]
fn fake_clock_can_be_advanced() {
    let clock = FakeClock::new();
    let t1 = clock.now();
    clock.advance(Duration::from_secs(60));
    let t2 = clock.now();
    assert!(t2.duration_since(t1) >= Duration::from_secs(60));
}

#[test]
fn fake_clock_is_cloneable_and_shared() {
    let clock1 = FakeClock::new();
    let clock2 = clock1.clone();
    let t1 = clock1.now();
    clock2.advance(Duration::from_secs(30));
    let t2 = clock1.now();
    assert!(t2.duration_since(t1) >= Duration::from_secs(30));
}

#[test]
fn fake_clock_default() {
    let clock = FakeClock::default();
    let _ = clock.now();
}

#[test]
fn fake_clock_set() {
    let clock = FakeClock::new();
    let future = Instant::now() + Duration::from_secs(3600);
    clock.set(future);
    assert!(clock.now() >= future);
}

#[test]
fn fake_clock_event_timestamp_ticks_even_when_epoch_ms_is_frozen() {
    let clock = FakeClock::new();
    let t1 = clock.event_timestamp();
    let t2 = clock.event_timestamp();
    assert!(t2 > t1, "nanosecond counter must break ties within the same millisecond");
}

#[test]
fn fake_clock_event_timestamp_reflects_set_epoch_ms() {
    let clock = FakeClock::new();
    clock.set_epoch_ms(2_000_000);
    let ts = clock.event_timestamp();
    assert_eq!(ts.timestamp_millis(), 2_000_000);
}
