//! Tests for the notification decision engine

use std::collections::HashSet;
use std::io::Write;
use std::sync::Arc;

use bm_monitor::{
    CallEvent, CallRecord, Callbook, Decision, DecisionEngine, Phase, Suppression, WatchConfig,
};

fn record(callsign: &str, tg: u32, start: u64, stop: u64, event: CallEvent) -> CallRecord {
    CallRecord {
        session_id: 1001,
        destination_id: tg,
        destination_name: "World-wide".to_string(),
        source_call: callsign.to_string(),
        source_id: 3106213,
        source_name: "Hiram".to_string(),
        start,
        stop,
        event,
    }
}

fn engine_with(watch: WatchConfig) -> DecisionEngine {
    DecisionEngine::new(watch, Arc::new(Callbook::empty()))
}

#[test]
fn test_first_qualifying_event_notifies_exactly_once() {
    // Given: a monitored callsign that has never been seen
    let mut engine = engine_with(WatchConfig {
        callsigns: HashSet::from(["W1AW".to_string()]),
        min_silence_secs: 300,
        ..Default::default()
    });

    // When: the first qualifying event arrives
    let first = engine.evaluate(record("W1AW", 91, 1000, 1020, CallEvent::SessionStop), 1020, false);

    // Then: exactly one Ended notification, and an immediate repeat is debounced
    match first {
        Decision::Notify(event) => assert_eq!(event.phase, Phase::Ended),
        other => panic!("expected notify, got {:?}", other),
    }
    let repeat = engine.evaluate(record("W1AW", 91, 1030, 1040, CallEvent::SessionStop), 1040, false);
    assert!(matches!(repeat, Decision::Suppress(Suppression::QuietWindow)));
}

#[test]
fn test_silence_window_boundary() {
    let mut engine = engine_with(WatchConfig {
        callsigns: HashSet::from(["W1AW".to_string()]),
        min_silence_secs: 300,
        ..Default::default()
    });

    assert!(matches!(
        engine.evaluate(record("W1AW", 91, 1000, 1010, CallEvent::SessionStop), 1000, false),
        Decision::Notify(_)
    ));

    // 299 seconds later: still inside the window
    assert!(matches!(
        engine.evaluate(record("W1AW", 91, 1299, 1300, CallEvent::SessionStop), 1299, false),
        Decision::Suppress(Suppression::QuietWindow)
    ));

    // exactly 300 seconds later: eligible again
    assert!(matches!(
        engine.evaluate(record("W1AW", 91, 1300, 1310, CallEvent::SessionStop), 1300, false),
        Decision::Notify(_)
    ));
}

#[test]
fn test_talkgroup_stop_without_open_session_is_suppressed() {
    // Given: a monitored talkgroup and no open session notification
    let mut engine = engine_with(WatchConfig {
        talkgroups: HashSet::from([91]),
        ..Default::default()
    });

    // When: a Session-Stop arrives for a session nobody has seen start
    let decision = engine.evaluate(
        record("DL1ABC", 91, 1000, 1042, CallEvent::SessionStop),
        1042,
        false,
    );

    // Then: no notification is synthesized
    assert!(matches!(
        decision,
        Decision::Suppress(Suppression::UnknownSession)
    ));
}

#[test]
fn test_talkgroup_full_lifecycle_phases() {
    let mut engine = engine_with(WatchConfig {
        talkgroups: HashSet::from([91]),
        ..Default::default()
    });

    // Session-Start and Session-Update are both live updates
    let phases: Vec<Phase> = [
        (record("DL1ABC", 91, 1000, 0, CallEvent::SessionStart), false),
        (record("DL1ABC", 91, 1000, 0, CallEvent::SessionUpdate), true),
        (record("DL1ABC", 91, 1000, 1042, CallEvent::SessionStop), true),
    ]
    .into_iter()
    .map(|(rec, open)| match engine.evaluate(rec, 1050, open) {
        Decision::Notify(event) => event.phase,
        other => panic!("expected notify, got {:?}", other),
    })
    .collect();

    assert_eq!(phases, vec![Phase::InProgress, Phase::InProgress, Phase::Ended]);
}

#[test]
fn test_noisy_callsign_never_notifies() {
    let mut engine = engine_with(WatchConfig {
        callsigns: HashSet::from(["N0ISY".to_string()]),
        talkgroups: HashSet::from([91]),
        noisy_calls: HashSet::from(["N0ISY".to_string()]),
        min_silence_secs: 300,
        ..Default::default()
    });

    // Noisy wins over both the callsign and the talkgroup watchlists
    let decision = engine.evaluate(record("N0ISY", 91, 1000, 0, CallEvent::SessionStart), 1000, false);
    assert!(matches!(decision, Decision::Suppress(Suppression::NoisyCall)));
}

#[test]
fn test_unresolvable_source_is_suppressed() {
    let mut engine = engine_with(WatchConfig {
        talkgroups: HashSet::from([91]),
        ..Default::default()
    });

    // Empty callsign and an id the callbook does not know
    let decision = engine.evaluate(record("", 91, 1000, 0, CallEvent::SessionStart), 1000, false);
    assert!(matches!(
        decision,
        Decision::Suppress(Suppression::Unidentified)
    ));
}

#[test]
fn test_callsign_burst_records_monitored_talkgroup() {
    // Given: W1AW is monitored and so is talkgroup 91
    let mut engine = engine_with(WatchConfig {
        callsigns: HashSet::from(["W1AW".to_string()]),
        talkgroups: HashSet::from([91]),
        min_silence_secs: 300,
        ..Default::default()
    });

    // When: a finished burst from W1AW on 91 triggers the callsign path
    let decision = engine.evaluate(
        record("W1AW", 91, 1000, 1020, CallEvent::SessionStop),
        1020,
        false,
    );
    assert!(matches!(decision, Decision::Notify(_)));

    // Then: a later event from someone else on 91 still follows the
    // talkgroup lifecycle (the cross-recording only touches the tracker,
    // not the talkgroup watch rules)
    let other = engine.evaluate(record("DL1ABC", 91, 1100, 0, CallEvent::SessionStart), 1100, false);
    assert!(matches!(other, Decision::Notify(_)));
}

#[test]
fn test_identity_resolution_feeds_the_watchlist() {
    // Given: a dmrid table mapping 4001 to a monitored callsign
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"4001;W1AW;x\n").unwrap();
    let callbook = Arc::new(Callbook::load(file.path()).unwrap());

    let mut engine = DecisionEngine::new(
        WatchConfig {
            callsigns: HashSet::from(["W1AW".to_string()]),
            min_silence_secs: 300,
            ..Default::default()
        },
        callbook,
    );

    // When: a record arrives with an empty SourceCall
    let mut rec = record("", 91, 1000, 1020, CallEvent::SessionStop);
    rec.source_id = 4001;

    // Then: the resolved callsign matches the watchlist
    match engine.evaluate(rec, 1020, false) {
        Decision::Notify(event) => {
            assert_eq!(event.record.source_call, "W1AW");
            assert_eq!(event.phase, Phase::Ended);
        }
        other => panic!("expected notify, got {:?}", other),
    }
}
