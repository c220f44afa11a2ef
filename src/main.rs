//! BaitFeeder firmware entry point
//!
//! Hexagonal architecture with interrupt-driven event cells.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter        NvsAdapter       LogEventSink          │
//! │  (Clock+Servo+Probe)    (IntervalStore)  (EventSink)           │
//! │  LineTelemetry          LogDisplay                             │
//! │  (TelemetryPort)        (DisplayPort)                          │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              AppService (pure logic)                   │    │
//! │  │  FeedScheduler · UI FSM · Bait · Temperature           │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  ISRs / esp_timer ──▶ PENDING_KEY · ALARM_FIRED · SECOND_TICK  │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::{anyhow, Result};
use log::{error, info, warn};

use baitfeeder::adapters::clock::RtcClock;
use baitfeeder::adapters::display::LogDisplay;
use baitfeeder::adapters::hardware::HardwareAdapter;
use baitfeeder::adapters::log_sink::LogEventSink;
use baitfeeder::adapters::nvs::NvsAdapter;
use baitfeeder::adapters::telemetry::LineTelemetry;
use baitfeeder::app::ports::{ActuatorPort, ClockPort, IntervalStore};
use baitfeeder::app::service::AppService;
use baitfeeder::clock::SystemTime;
use baitfeeder::config::FeederConfig;
use baitfeeder::drivers::servo::ServoDriver;
use baitfeeder::drivers::watchdog::{self, Watchdog};
use baitfeeder::drivers::{hw_init, hw_timer};
use baitfeeder::events;
use baitfeeder::pins;
use baitfeeder::sensors::bait_level::read_bait_present;
use baitfeeder::sensors::temperature::NtcProbe;

/// Idle time between loop passes.  Keys and alarms are latched by
/// interrupts, so this only bounds reaction latency.
const LOOP_IDLE_MS: u32 = 10;

/// Headroom over one actuation before the watchdog bites.
const WATCHDOG_MARGIN_MS: u32 = 5_000;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  BaitFeeder v{}                      ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    let config = FeederConfig::default();
    config
        .validate()
        .map_err(|msg| anyhow!("invalid build configuration: {}", msg))?;

    // ── 1b. Peripherals, interrupts, timers ───────────────────
    if let Err(e) = hw_init::init_peripherals() {
        error!("HAL init failed: {}", e);
        return Err(anyhow!("peripheral init failed: {}", e));
    }
    if let Err(e) = hw_init::init_isr_service() {
        error!("ISR service init failed: {}, continuing without keys", e);
    }
    hw_timer::start_timers();

    let actuation_ms = config.open_hold_ms + config.rest_hold_ms;
    let watchdog = Watchdog::new((actuation_ms + WATCHDOG_MARGIN_MS).max(watchdog::DEFAULT_TIMEOUT_MS));

    // ── 2. Interval store ─────────────────────────────────────
    let mut nvs = NvsAdapter::new().map_err(|e| anyhow!("NVS init failed: {}", e))?;
    if !nvs.is_provisioned() {
        info!("Boot: first run, interval = {}", config.first_boot_interval);
        if let Err(e) = nvs.write_interval(config.first_boot_interval) {
            warn!("Boot: could not persist first-run interval: {}", e);
        }
    }

    // ── 3. Wall clock ─────────────────────────────────────────
    let mut clock = RtcClock::new();
    if !clock.is_set() {
        info!("Boot: clock unset, defaulting to {}", SystemTime::DEFAULT);
        if let Err(e) = clock.set_time(SystemTime::DEFAULT) {
            warn!("Boot: could not set default time: {}", e);
        }
    }

    // ── 4. Adapters ───────────────────────────────────────────
    let mut hw = HardwareAdapter::new(clock, ServoDriver::new(), NtcProbe::new(pins::TEMP_ADC_GPIO));
    if let Err(e) = hw.move_to(config.rest_angle_deg) {
        warn!("Boot: servo did not reach rest: {}", e);
    }

    let mut sink = LogEventSink::new();
    let mut link = LineTelemetry::new();
    let mut display = LogDisplay::new();

    // ── 5. App service ────────────────────────────────────────
    let bait_present = read_bait_present();
    info!("Boot: bait {}", if bait_present { "present" } else { "LOW" });

    let mut app = AppService::new(&config, bait_present);
    if let Err(e) = app.start(&mut hw, &mut nvs, &mut sink) {
        warn!("Boot: scheduler started degraded: {}", e);
    }

    info!("System ready. Entering event loop.");

    // ── 6. Event loop ─────────────────────────────────────────
    loop {
        let pending = events::drain();
        let bait_present = read_bait_present();

        app.run_iteration(
            pending,
            bait_present,
            &mut hw,
            &mut nvs,
            &mut link,
            &mut display,
            &mut sink,
        );

        watchdog.feed();
        esp_idf_svc::hal::delay::FreeRtos::delay_ms(LOOP_IDLE_MS);
    }
}
