//! Application service, the hexagonal core.
//!
//! [`AppService`] owns the feed scheduler, the interaction FSM and the
//! monitors.  It exposes a clean, hardware-agnostic API.  All I/O flows
//! through port traits injected at call sites, making the entire service
//! testable with mock adapters.
//!
//! ```text
//!  ClockPort ─────▶ ┌──────────────────────────┐ ──▶ EventSink
//!  IntervalStore ◀─▶│        AppService        │ ──▶ DisplayPort
//!  ActuatorPort ◀───│  Scheduler · UI FSM ·    │ ◀─▶ TelemetryPort
//!  TemperatureProbe▶│  Bait · Temp · Cadence   │
//!                   └──────────────────────────┘
//! ```
//!
//! One call to [`run_iteration`](AppService::run_iteration) is one pass
//! of the main loop, in this order: bait sample, alarm, remote commands,
//! key, second tick, render.

use embedded_hal::delay::DelayNs;
use log::{info, warn};

use crate::clock::SystemTime;
use crate::config::{FeedInterval, FeederConfig};
use crate::error::Result;
use crate::events::{Key, PendingEvents};
use crate::fsm::context::UiAction;
use crate::fsm::{Fsm, StateId};
use crate::scheduler::{ActuationProfile, FeedScheduler};
use crate::sensors::bait_level::{BaitLevelMonitor, BaitTransition};
use crate::sensors::temperature::{TemperatureMonitor, TemperatureStatus};

use super::commands::{parse_property_set, AppCommand};
use super::events::AppEvent;
use super::frame::Frame;
use super::ports::{
    ActuatorPort, ClockPort, DisplayPort, EventSink, IntervalStore, TelemetryPort,
    TemperatureProbe,
};
use super::telemetry::{StatusReport, TelemetryCadence};

/// Largest inbound payload accepted from the link.
const INBOUND_BUF_LEN: usize = 256;

// ───────────────────────────────────────────────────────────────
// AppService
// ───────────────────────────────────────────────────────────────

/// The application service orchestrates all domain logic.
pub struct AppService {
    scheduler: FeedScheduler,
    ui: Fsm,
    bait: BaitLevelMonitor,
    temperature: TemperatureMonitor,
    telemetry: TelemetryCadence,
}

impl AppService {
    /// Construct the service.  `bait_sufficient` is the boot-time sample.
    ///
    /// Does **not** arm anything; call [`start`](Self::start) next.
    pub fn new(config: &FeederConfig, bait_sufficient: bool) -> Self {
        Self {
            scheduler: FeedScheduler::new(ActuationProfile::from(config), bait_sufficient),
            ui: Fsm::default(),
            bait: BaitLevelMonitor::new(bait_sufficient, config.bait_debounce_samples),
            temperature: TemperatureMonitor::new(config.temperature_enabled),
            telemetry: TelemetryCadence::new(config.telemetry_interval_secs),
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Configure the scheduler from the persisted interval.
    pub fn start(
        &mut self,
        clock: &mut impl ClockPort,
        store: &mut impl IntervalStore,
        sink: &mut impl EventSink,
    ) -> Result<()> {
        let interval = store.read_interval();
        let result = self.scheduler.configure(interval, clock, store);
        sink.emit(&AppEvent::Started {
            interval,
            armed: self.scheduler.is_armed(),
        });
        info!(
            "AppService started (interval={} s, armed={})",
            interval.as_secs(),
            self.scheduler.is_armed()
        );
        result
    }

    // ── Per-iteration orchestration ───────────────────────────

    /// Run one main-loop pass over the events drained this iteration.
    ///
    /// The `hw` parameter satisfies every hardware port at once; this
    /// avoids a double mutable borrow while keeping the port boundary
    /// explicit.
    #[allow(clippy::too_many_arguments)]
    pub fn run_iteration<H>(
        &mut self,
        events: PendingEvents,
        bait_present: bool,
        hw: &mut H,
        store: &mut impl IntervalStore,
        link: &mut impl TelemetryPort,
        display: &mut impl DisplayPort,
        sink: &mut impl EventSink,
    ) where
        H: ClockPort + ActuatorPort + DelayNs + TemperatureProbe,
    {
        self.on_bait_sample(bait_present, hw, sink);

        if events.alarm_fired {
            self.on_alarm(hw, &*store, sink);
        }

        self.poll_remote(link, hw, store, sink);

        if let Some(key) = events.key {
            self.on_key(key, hw, store, sink);
        }

        if events.second_elapsed {
            self.on_second(hw, link, sink);
        }

        display.render(&self.frame(hw.now()));
    }

    /// Feed one bait-level sample to the monitor and react to a change.
    pub fn on_bait_sample(
        &mut self,
        present: bool,
        clock: &mut impl ClockPort,
        sink: &mut impl EventSink,
    ) {
        let Some(transition) = self.bait.sample(present) else {
            return;
        };
        match transition {
            BaitTransition::BecameInsufficient => self.scheduler.on_bait_insufficient(clock),
            BaitTransition::Recovered => {
                if let Err(e) = self.scheduler.on_bait_recovered(clock) {
                    warn!("AppService: re-arm after refill failed: {}", e);
                }
            }
        }
        sink.emit(&AppEvent::BaitChanged {
            sufficient: self.bait.is_sufficient(),
        });
    }

    /// The alarm interrupt fired.  Blocks for the actuation sequence.
    pub fn on_alarm<H>(&mut self, hw: &mut H, store: &impl IntervalStore, sink: &mut impl EventSink)
    where
        H: ClockPort + ActuatorPort + DelayNs,
    {
        if self.scheduler.on_alarm_fired(hw, store) {
            sink.emit(&AppEvent::FeedCompleted {
                count: self.scheduler.feed_count(),
            });
        }
    }

    /// Dispatch one key through the interaction FSM and apply a commit.
    pub fn on_key(
        &mut self,
        key: Key,
        clock: &mut impl ClockPort,
        store: &mut impl IntervalStore,
        sink: &mut impl EventSink,
    ) {
        let from = self.ui.current_state();
        let action = self.ui.handle_key(key, clock.now(), self.scheduler.interval());
        let to = self.ui.current_state();
        if from != to {
            sink.emit(&AppEvent::ModeChanged { from, to });
        }

        if let UiAction::Commit { time, interval } = action {
            self.commit(time, interval, clock, store, sink);
        }
    }

    /// Take at most one inbound payload from the link and apply it.
    pub fn poll_remote(
        &mut self,
        link: &mut impl TelemetryPort,
        clock: &mut impl ClockPort,
        store: &mut impl IntervalStore,
        sink: &mut impl EventSink,
    ) {
        let mut buf = [0u8; INBOUND_BUF_LEN];
        let Some(len) = link.poll_inbound(&mut buf) else {
            return;
        };
        let payload = &buf[..len.min(buf.len())];

        match parse_property_set(payload) {
            Ok(props) => {
                for cmd in props.into_commands(self.scheduler.interval()) {
                    self.handle_command(cmd, clock, store, sink);
                }
            }
            Err(e) => {
                warn!("AppService: rejected remote payload: {}", e);
                sink.emit(&AppEvent::CommandRejected);
            }
        }
    }

    /// Process a remote command.  Only live values change; an open edit
    /// session keeps its working copies.
    pub fn handle_command(
        &mut self,
        cmd: AppCommand,
        clock: &mut impl ClockPort,
        store: &mut impl IntervalStore,
        sink: &mut impl EventSink,
    ) {
        match cmd {
            AppCommand::SetAutoFeed(enabled) => {
                if let Err(e) = self.scheduler.set_auto_feed_enabled(enabled, clock) {
                    warn!("AppService: arm after enable failed: {}", e);
                }
                sink.emit(&AppEvent::AutoFeedChanged(enabled));
            }
            AppCommand::UpdateInterval(interval) => {
                match self.scheduler.configure(interval, clock, store) {
                    Ok(()) => sink.emit(&AppEvent::IntervalUpdated(interval)),
                    Err(e) => warn!("AppService: remote interval not applied cleanly: {}", e),
                }
            }
        }
    }

    /// One second elapsed: sample temperature and publish when due.
    pub fn on_second(
        &mut self,
        probe: &mut impl TemperatureProbe,
        link: &mut impl TelemetryPort,
        sink: &mut impl EventSink,
    ) {
        self.temperature.sample(probe);

        if self.telemetry.on_second() {
            let result = link.publish(&self.status_report());
            if let Err(ref e) = result {
                warn!("AppService: publish failed, retrying next cadence: {}", e);
            }
            self.telemetry.record(&result);
            sink.emit(&AppEvent::TelemetrySent { ok: result.is_ok() });
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn scheduler(&self) -> &FeedScheduler {
        &self.scheduler
    }

    pub fn ui(&self) -> &Fsm {
        &self.ui
    }

    pub fn mode(&self) -> StateId {
        self.ui.current_state()
    }

    pub fn temperature(&self) -> TemperatureStatus {
        self.temperature.status()
    }

    pub fn link_up(&self) -> bool {
        self.telemetry.link_up()
    }

    pub fn status_report(&self) -> StatusReport {
        StatusReport {
            feed_count: self.scheduler.feed_count(),
            temperature_c: self.temperature.status().celsius(),
            auto_feed_enabled: self.scheduler.auto_feed_enabled(),
            interval: self.scheduler.interval(),
        }
    }

    /// Snapshot for the display.
    pub fn frame(&self, now: SystemTime) -> Frame {
        match self.ui.session() {
            Some(s) => Frame::Edit {
                time: s.working_time,
                interval: s.working_interval,
                cursor: s.cursor,
            },
            None => Frame::Monitor {
                time: now,
                interval: self.scheduler.interval(),
                feed_count: self.scheduler.feed_count(),
                bait_sufficient: self.scheduler.bait_sufficient(),
                auto_feed_enabled: self.scheduler.auto_feed_enabled(),
                temperature: self.temperature.status(),
                link_up: self.telemetry.link_up(),
            },
        }
    }

    // ── Internal ──────────────────────────────────────────────

    fn commit(
        &mut self,
        time: SystemTime,
        interval: FeedInterval,
        clock: &mut impl ClockPort,
        store: &mut impl IntervalStore,
        sink: &mut impl EventSink,
    ) {
        if let Err(e) = clock.set_time(time) {
            warn!("AppService: clock rejected {}: {}", time, e);
        }
        if let Err(e) = self.scheduler.configure(interval, clock, store) {
            warn!("AppService: committed interval not applied cleanly: {}", e);
        }
        info!(
            "AppService: committed time={} interval={} s",
            time,
            interval.as_secs()
        );
        sink.emit(&AppEvent::Committed { time, interval });
    }
}
