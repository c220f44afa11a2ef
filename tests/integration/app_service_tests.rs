//! Integration tests for the AppService → scheduler / FSM → ports pipeline.
//!
//! These run on the host (x86_64) and drive whole main-loop iterations
//! through `run_iteration` against the mocks in `mock_hw`.

use super::mock_hw::{HwCall, MemStore, MockDisplay, MockHardware, MockLink, RecordingSink};

use baitfeeder::app::events::AppEvent;
use baitfeeder::app::frame::Frame;
use baitfeeder::app::service::AppService;
use baitfeeder::config::{FeedInterval, FeederConfig};
use baitfeeder::events::{self, Key, PendingEvents};
use baitfeeder::fsm::StateId;
use baitfeeder::fsm::context::FieldRef;

struct Rig {
    app: AppService,
    hw: MockHardware,
    store: MemStore,
    link: MockLink,
    display: MockDisplay,
    sink: RecordingSink,
    bait: bool,
}

impl Rig {
    fn boot(persisted: FeedInterval) -> Self {
        Self::boot_with(FeederConfig::default(), persisted)
    }

    fn boot_with(config: FeederConfig, persisted: FeedInterval) -> Self {
        let mut hw = MockHardware::new();
        let mut store = MemStore::holding(persisted);
        let mut sink = RecordingSink::new();
        let mut app = AppService::new(&config, true);
        app.start(&mut hw, &mut store, &mut sink).unwrap();
        Self {
            app,
            hw,
            store,
            link: MockLink::new(),
            display: MockDisplay::new(),
            sink,
            bait: true,
        }
    }

    fn step(&mut self, events: PendingEvents) {
        self.app.run_iteration(
            events,
            self.bait,
            &mut self.hw,
            &mut self.store,
            &mut self.link,
            &mut self.display,
            &mut self.sink,
        );
    }

    fn idle(&mut self) {
        self.step(PendingEvents::default());
    }

    fn key(&mut self, key: Key) {
        self.step(PendingEvents {
            key: Some(key),
            ..Default::default()
        });
    }

    fn keys(&mut self, key: Key, times: usize) {
        for _ in 0..times {
            self.key(key);
        }
    }

    fn alarm(&mut self) {
        self.step(PendingEvents {
            alarm_fired: true,
            ..Default::default()
        });
    }

    fn second(&mut self) {
        self.step(PendingEvents {
            second_elapsed: true,
            ..Default::default()
        });
    }
}

// ── Boot ──────────────────────────────────────────────────────

#[test]
fn boot_with_one_minute_arms_for_sixty_seconds() {
    let rig = Rig::boot(FeedInterval::new(0, 1, 0));
    assert_eq!(rig.app.scheduler().armed_secs(), Some(60));
    assert_eq!(rig.hw.armed_for, Some(60));
    assert!(rig.sink.contains(&AppEvent::Started {
        interval: FeedInterval::new(0, 1, 0),
        armed: true,
    }));
}

#[test]
fn boot_with_disabled_interval_stays_disarmed() {
    let rig = Rig::boot(FeedInterval::DISABLED);
    assert!(!rig.app.scheduler().is_armed());
    assert_eq!(rig.hw.armed_for, None);
}

// ── Feeding ───────────────────────────────────────────────────

#[test]
fn alarm_feeds_once_and_rearms() {
    let mut rig = Rig::boot(FeedInterval::new(0, 1, 0));
    rig.hw.clear();

    rig.alarm();

    assert_eq!(rig.app.scheduler().feed_count(), 1);
    assert_eq!(
        rig.hw.calls,
        vec![
            HwCall::Disarm,
            HwCall::Move(90),
            HwCall::DelayMs(2000),
            HwCall::Move(0),
            HwCall::DelayMs(1000),
            HwCall::Arm(60),
        ]
    );
    assert_eq!(rig.app.scheduler().armed_secs(), Some(60));
    assert!(rig.sink.contains(&AppEvent::FeedCompleted { count: 1 }));
}

#[test]
fn stale_alarm_is_ignored() {
    let mut rig = Rig::boot(FeedInterval::DISABLED);
    rig.hw.clear();
    rig.alarm();
    assert_eq!(rig.app.scheduler().feed_count(), 0);
    assert!(rig.hw.moves().is_empty());
}

#[test]
fn custom_actuation_profile_is_used() {
    let config = FeederConfig {
        open_angle_deg: 120,
        rest_angle_deg: 10,
        open_hold_ms: 500,
        rest_hold_ms: 250,
        ..FeederConfig::default()
    };
    let mut rig = Rig::boot_with(config, FeedInterval::new(0, 0, 5));
    rig.alarm();
    assert_eq!(rig.hw.moves(), vec![120, 10]);
    assert!(rig.hw.calls.contains(&HwCall::DelayMs(500)));
    assert!(rig.hw.calls.contains(&HwCall::DelayMs(250)));
}

// ── Bait level ────────────────────────────────────────────────

#[test]
fn bait_low_disarms_and_refill_resets_count() {
    let mut rig = Rig::boot(FeedInterval::new(0, 1, 0));
    rig.alarm();
    rig.alarm();
    assert_eq!(rig.app.scheduler().feed_count(), 2);

    rig.bait = false;
    rig.idle();
    assert!(!rig.app.scheduler().is_armed());
    assert_eq!(rig.hw.armed_for, None);
    assert!(rig.sink.contains(&AppEvent::BaitChanged { sufficient: false }));

    // Alarms while suspended never feed.
    rig.alarm();
    rig.alarm();
    assert_eq!(rig.app.scheduler().feed_count(), 2);

    rig.bait = true;
    rig.idle();
    assert_eq!(rig.app.scheduler().feed_count(), 0);
    assert_eq!(rig.app.scheduler().armed_secs(), Some(60));
    assert!(rig.sink.contains(&AppEvent::BaitChanged { sufficient: true }));
}

#[test]
fn refill_with_auto_feed_off_does_not_arm() {
    let mut rig = Rig::boot(FeedInterval::new(0, 1, 0));
    rig.link.push(r#"{"params":{"Feed_ED":0}}"#);
    rig.idle();
    assert!(!rig.app.scheduler().is_armed());

    rig.bait = false;
    rig.idle();
    rig.bait = true;
    rig.idle();
    assert!(!rig.app.scheduler().is_armed());
    assert_eq!(rig.app.scheduler().feed_count(), 0);
}

// ── Editor ────────────────────────────────────────────────────

#[test]
fn confirm_enters_edit_with_snapshot() {
    let mut rig = Rig::boot(FeedInterval::new(0, 1, 0));
    rig.key(Key::Confirm);

    assert_eq!(rig.app.mode(), StateId::Edit);
    match rig.display.last() {
        Some(Frame::Edit {
            interval, cursor, ..
        }) => {
            assert_eq!(*interval, FeedInterval::new(0, 1, 0));
            assert_eq!(*cursor, FieldRef::TimeHour);
        }
        other => panic!("expected edit frame, got {:?}", other),
    }
    assert!(rig.sink.contains(&AppEvent::ModeChanged {
        from: StateId::Monitor,
        to: StateId::Edit,
    }));
}

#[test]
fn back_discards_edits() {
    let mut rig = Rig::boot(FeedInterval::new(0, 1, 0));
    let writes_before = rig.store.writes;

    rig.key(Key::Confirm);
    rig.keys(Key::Right, 3); // interval hour
    rig.key(Key::Up); // 1
    rig.key(Key::Right);
    rig.key(Key::Up); // 2
    rig.key(Key::Right);
    rig.keys(Key::Up, 3); // 3
    match rig.display.last() {
        Some(Frame::Edit { interval, .. }) => assert_eq!(*interval, FeedInterval::new(1, 2, 3)),
        other => panic!("expected edit frame, got {:?}", other),
    }

    rig.key(Key::Back);

    assert_eq!(rig.app.mode(), StateId::Monitor);
    assert_eq!(rig.store.value, Some(FeedInterval::new(0, 1, 0)));
    assert_eq!(rig.store.writes, writes_before);
    assert_eq!(rig.app.scheduler().interval(), FeedInterval::new(0, 1, 0));
}

#[test]
fn confirm_commits_and_rearms() {
    let mut rig = Rig::boot(FeedInterval::new(0, 1, 0));

    rig.key(Key::Confirm);
    rig.keys(Key::Right, 4); // interval minute
    rig.key(Key::Down); // 0
    rig.key(Key::Right); // interval second
    rig.keys(Key::Up, 30);
    rig.key(Key::Confirm);

    assert_eq!(rig.app.mode(), StateId::Monitor);
    assert_eq!(rig.store.value, Some(FeedInterval::new(0, 0, 30)));
    assert_eq!(rig.app.scheduler().armed_secs(), Some(30));
    assert_eq!(rig.hw.armed_for, Some(30));
}

#[test]
fn commit_sets_edited_time() {
    let mut rig = Rig::boot(FeedInterval::new(0, 1, 0));

    rig.key(Key::Confirm);
    rig.keys(Key::Down, 2); // hour 0 -> 22
    rig.key(Key::Right);
    rig.key(Key::Up); // minute 1
    rig.key(Key::Confirm);

    let expected = baitfeeder::clock::SystemTime::DEFAULT.with_time_of_day(22, 1, 0);
    assert_eq!(rig.hw.now, expected);
    assert!(rig.hw.calls.contains(&HwCall::SetTime(expected)));
}

#[test]
fn alarm_expiring_before_commit_does_not_cut_new_interval_short() {
    let mut rig = Rig::boot(FeedInterval::new(0, 1, 0));

    rig.key(Key::Confirm);
    // The old arming expires after this pass drained its events.
    events::ALARM_FIRED.raise();
    rig.key(Key::Confirm);
    assert_eq!(rig.hw.armed_for, Some(60));

    rig.step(events::drain());
    assert_eq!(rig.app.scheduler().feed_count(), 0);
    assert!(rig.hw.moves().is_empty());
    assert!(rig.app.scheduler().is_armed());
}

#[test]
fn arrows_are_ignored_in_monitor() {
    let mut rig = Rig::boot(FeedInterval::new(0, 1, 0));
    for key in [Key::Up, Key::Down, Key::Left, Key::Right, Key::Back] {
        rig.key(key);
        assert_eq!(rig.app.mode(), StateId::Monitor);
    }
    assert!(matches!(rig.display.last(), Some(Frame::Monitor { .. })));
}

#[test]
fn alarm_during_edit_feeds_without_touching_session() {
    let mut rig = Rig::boot(FeedInterval::new(0, 1, 0));
    rig.key(Key::Confirm);
    rig.key(Key::Up);

    rig.alarm();

    assert_eq!(rig.app.scheduler().feed_count(), 1);
    assert_eq!(rig.app.mode(), StateId::Edit);
    assert_eq!(rig.app.ui().session().map(|s| s.working_time.hour), Some(1));
}

// ── Telemetry and temperature ─────────────────────────────────

#[test]
fn publishes_on_cadence_only() {
    let config = FeederConfig {
        telemetry_interval_secs: 3,
        ..FeederConfig::default()
    };
    let mut rig = Rig::boot_with(config, FeedInterval::new(0, 1, 0));

    rig.second();
    rig.second();
    assert_eq!(rig.link.attempts, 0);
    rig.second();
    assert_eq!(rig.link.attempts, 1);
    assert!(rig.app.link_up());

    let report = rig.link.published[0];
    assert_eq!(report.interval, FeedInterval::new(0, 1, 0));
    assert!(report.auto_feed_enabled);
    assert_eq!(report.temperature_c, Some(21.0));
}

#[test]
fn publish_failure_waits_for_next_cadence() {
    let config = FeederConfig {
        telemetry_interval_secs: 2,
        ..FeederConfig::default()
    };
    let mut rig = Rig::boot_with(config, FeedInterval::new(0, 1, 0));
    rig.link.up = false;

    rig.second();
    rig.second();
    assert_eq!(rig.link.attempts, 1);
    assert!(!rig.app.link_up());
    assert!(rig.sink.contains(&AppEvent::TelemetrySent { ok: false }));

    // No tight retry.
    rig.idle();
    rig.idle();
    rig.second();
    assert_eq!(rig.link.attempts, 1);

    rig.link.up = true;
    rig.second();
    assert_eq!(rig.link.attempts, 2);
    assert!(rig.app.link_up());
}

#[test]
fn missing_probe_shows_fault_and_keeps_feeding() {
    let mut rig = Rig::boot(FeedInterval::new(0, 1, 0));
    rig.hw.probe_present = false;

    rig.second();
    match rig.display.last() {
        Some(Frame::Monitor { temperature, .. }) => {
            assert_eq!(temperature.to_string(), "sensor fault");
        }
        other => panic!("expected monitor frame, got {:?}", other),
    }

    rig.alarm();
    assert_eq!(rig.app.scheduler().feed_count(), 1);

    rig.hw.probe_present = true;
    rig.second();
    assert_eq!(rig.app.temperature().celsius(), Some(21.0));
}

// ── Remote commands ───────────────────────────────────────────

#[test]
fn remote_interval_merges_and_persists() {
    let mut rig = Rig::boot(FeedInterval::new(0, 1, 0));
    rig.link.push(r#"{"params":{"FeedInterval_s":15}}"#);
    rig.idle();

    assert_eq!(rig.store.value, Some(FeedInterval::new(0, 1, 15)));
    assert_eq!(rig.app.scheduler().armed_secs(), Some(75));
    assert!(rig.sink.contains(&AppEvent::IntervalUpdated(FeedInterval::new(0, 1, 15))));
}

#[test]
fn remote_disable_then_enable() {
    let mut rig = Rig::boot(FeedInterval::new(0, 1, 0));

    rig.link.push(r#"{"params":{"Feed_ED":0}}"#);
    rig.idle();
    assert!(!rig.app.scheduler().auto_feed_enabled());
    assert!(!rig.app.scheduler().is_armed());

    rig.link.push(r#"{"params":{"Feed_ED":1}}"#);
    rig.idle();
    assert_eq!(rig.app.scheduler().armed_secs(), Some(60));
    assert!(rig.sink.contains(&AppEvent::AutoFeedChanged(true)));
}

#[test]
fn malformed_remote_payload_is_rejected() {
    let mut rig = Rig::boot(FeedInterval::new(0, 1, 0));
    rig.link.push("not json");
    rig.link.push(r#"{"params":{"FeedInterval_m":75}}"#);
    rig.idle();
    rig.idle();

    let rejected = rig
        .sink
        .events
        .iter()
        .filter(|e| **e == AppEvent::CommandRejected)
        .count();
    assert_eq!(rejected, 2);
    assert_eq!(rig.store.value, Some(FeedInterval::new(0, 1, 0)));
}

#[test]
fn remote_update_during_edit_leaves_working_copy() {
    let mut rig = Rig::boot(FeedInterval::new(0, 1, 0));
    rig.key(Key::Confirm);

    rig.link.push(r#"{"params":{"FeedInterval_m":5}}"#);
    rig.idle();

    assert_eq!(rig.app.scheduler().interval(), FeedInterval::new(0, 5, 0));
    assert_eq!(
        rig.app.ui().session().map(|s| s.working_interval),
        Some(FeedInterval::new(0, 1, 0))
    );
}

// ── Persistence failure ───────────────────────────────────────

#[test]
fn failed_write_still_arms_live_interval() {
    let mut rig = Rig::boot(FeedInterval::new(0, 1, 0));
    rig.store.fail_writes = true;

    rig.key(Key::Confirm);
    rig.keys(Key::Right, 5);
    rig.keys(Key::Up, 10);
    rig.key(Key::Confirm);

    assert_eq!(rig.app.scheduler().armed_secs(), Some(70));
    assert_eq!(rig.store.value, Some(FeedInterval::new(0, 1, 0)));
}
