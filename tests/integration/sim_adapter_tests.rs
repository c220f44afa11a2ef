//! The service wired to the real adapters in their host simulation
//! backends, following the firmware boot sequence.

use baitfeeder::adapters::clock::RtcClock;
use baitfeeder::adapters::display::LogDisplay;
use baitfeeder::adapters::hardware::HardwareAdapter;
use baitfeeder::adapters::log_sink::LogEventSink;
use baitfeeder::adapters::nvs::{NvsAdapter, encode_interval};
use baitfeeder::adapters::telemetry::LineTelemetry;
use baitfeeder::app::ports::{ClockPort, IntervalStore, StoragePort};
use baitfeeder::app::service::AppService;
use baitfeeder::clock::SystemTime;
use baitfeeder::config::{FeedInterval, FeederConfig};
use baitfeeder::drivers::servo::ServoDriver;
use baitfeeder::events::PendingEvents;
use baitfeeder::pins;
use baitfeeder::sensors::temperature::NtcProbe;

struct Sim {
    app: AppService,
    hw: HardwareAdapter,
    nvs: NvsAdapter,
    link: LineTelemetry,
    display: LogDisplay,
    sink: LogEventSink,
}

fn fast_config() -> FeederConfig {
    FeederConfig {
        open_hold_ms: 1,
        rest_hold_ms: 1,
        telemetry_interval_secs: 2,
        first_boot_interval: FeedInterval::new(0, 0, 10),
        ..FeederConfig::default()
    }
}

fn boot(config: &FeederConfig) -> Sim {
    boot_from(config, NvsAdapter::new().unwrap())
}

fn boot_from(config: &FeederConfig, mut nvs: NvsAdapter) -> Sim {
    if !nvs.is_provisioned() {
        nvs.write_interval(config.first_boot_interval).unwrap();
    }

    let mut clock = RtcClock::new();
    if !clock.is_set() {
        clock.set_time(SystemTime::DEFAULT).unwrap();
    }

    let mut hw = HardwareAdapter::new(clock, ServoDriver::new(), NtcProbe::new(pins::TEMP_ADC_GPIO));
    let mut sink = LogEventSink::new();
    let mut app = AppService::new(config, true);
    app.start(&mut hw, &mut nvs, &mut sink).unwrap();

    Sim {
        app,
        hw,
        nvs,
        link: LineTelemetry::new(),
        display: LogDisplay::new(),
        sink,
    }
}

impl Sim {
    /// Advance the simulated clock one second and run one loop pass.
    fn tick(&mut self) {
        let alarm_fired = self.hw.clock_mut().advance(1);
        self.app.run_iteration(
            PendingEvents {
                key: None,
                alarm_fired,
                second_elapsed: true,
            },
            true,
            &mut self.hw,
            &mut self.nvs,
            &mut self.link,
            &mut self.display,
            &mut self.sink,
        );
    }
}

#[test]
fn first_boot_provisions_and_arms() {
    let config = fast_config();
    let sim = boot(&config);
    assert!(sim.nvs.is_provisioned());
    assert_eq!(sim.nvs.read_interval(), FeedInterval::new(0, 0, 10));
    assert_eq!(sim.hw.clock().alarm_remaining(), Some(10));
    assert_eq!(sim.hw.now(), SystemTime::DEFAULT);
}

#[test]
fn marked_out_of_range_record_boots_disabled() {
    let mut nvs = NvsAdapter::new().unwrap();
    let record = encode_interval(FeedInterval::new(24, 0, 0)).unwrap();
    nvs.write("feeder", "interval", &record).unwrap();

    let sim = boot_from(&fast_config(), nvs);
    assert!(sim.nvs.is_provisioned());
    assert_eq!(sim.nvs.read_interval(), FeedInterval::DISABLED);
    assert!(!sim.app.scheduler().is_armed());
    assert_eq!(sim.hw.clock().alarm_remaining(), None);
}

#[test]
fn simulated_run_feeds_every_interval() {
    let config = fast_config();
    let mut sim = boot(&config);

    for _ in 0..25 {
        sim.tick();
    }

    assert_eq!(sim.app.scheduler().feed_count(), 2);
    assert_eq!(sim.hw.servo().angle(), Some(config.rest_angle_deg));
    assert_eq!(sim.hw.clock().alarm_remaining(), Some(5));
    assert_eq!(sim.hw.now(), SystemTime::DEFAULT.with_time_of_day(0, 0, 25));
}

#[test]
fn simulated_run_publishes_and_renders() {
    let config = fast_config();
    let mut sim = boot(&config);

    for _ in 0..4 {
        sim.tick();
    }

    assert_eq!(sim.link.published(), 2);
    assert!(sim.app.link_up());
    let json = sim.link.last_payload().unwrap();
    assert!(json.starts_with(r#"{"method":"thing.event.property.post""#));
    assert!(json.contains(r#""FeedInterval_s":10"#));

    assert_eq!(sim.display.lines()[0].as_str(), "2024-01-01 00:00:04");
}

#[test]
fn remote_command_through_line_link() {
    let config = fast_config();
    let mut sim = boot(&config);

    sim.link
        .push_inbound(br#"{"params":{"FeedInterval_h":1,"FeedInterval_s":0}}"#)
        .unwrap();
    sim.tick();

    assert_eq!(sim.nvs.read_interval(), FeedInterval::new(1, 0, 0));
    assert_eq!(sim.hw.clock().alarm_remaining(), Some(3600));
}
