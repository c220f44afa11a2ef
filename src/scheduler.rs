//! Feed scheduler.
//!
//! Owns the alarm lifecycle, the feed counter and the enable rules.
//! Three inputs decide whether an alarm may be armed:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                     Arming preconditions                     │
//! │                                                              │
//! │  ┌────────────┐   ┌──────────────┐   ┌──────────────────┐    │
//! │  │ Bait level │   │ Auto-feed    │   │ Interval != 0    │    │
//! │  │ sufficient │   │ enabled      │   │ (persisted)      │    │
//! │  └─────┬──────┘   └──────┬───────┘   └────────┬─────────┘    │
//! │        └────────────── AND ───────────────────┘              │
//! │                          │                                   │
//! │                          ▼                                   │
//! │                 ClockPort::arm_alarm(secs)                   │
//! │                          │                                   │
//! │                          ▼  (ALARM_FIRED)                    │
//! │              on_alarm_fired: open → hold → rest → hold       │
//! │                          │                                   │
//! │                          └──▶ re-arm from persisted interval │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Bait insufficiency always wins over auto-feed.  Every path that can
//! make a precondition false disarms first, so `armed` never outlives
//! its preconditions.  Arming and disarming both consume a pending
//! [`ALARM_FIRED`], so an expiry that lands between the loop's drain and
//! a re-arm is dropped instead of cutting the new interval short.

use embedded_hal::delay::DelayNs;
use log::{debug, info, warn};

use crate::app::ports::{ActuatorPort, ClockPort, IntervalStore};
use crate::config::{FeedInterval, FeederConfig};
use crate::error::{Error, Result};
use crate::events::ALARM_FIRED;

// ═══════════════════════════════════════════════════════════════
//  Actuation profile
// ═══════════════════════════════════════════════════════════════

/// Fixed open/hold/close/hold sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActuationProfile {
    pub open_angle_deg: u8,
    pub rest_angle_deg: u8,
    pub open_hold_ms: u32,
    pub rest_hold_ms: u32,
}

impl From<&FeederConfig> for ActuationProfile {
    fn from(c: &FeederConfig) -> Self {
        Self {
            open_angle_deg: c.open_angle_deg,
            rest_angle_deg: c.rest_angle_deg,
            open_hold_ms: c.open_hold_ms,
            rest_hold_ms: c.rest_hold_ms,
        }
    }
}

impl Default for ActuationProfile {
    fn default() -> Self {
        Self::from(&FeederConfig::default())
    }
}

// ═══════════════════════════════════════════════════════════════
//  Scheduler state
// ═══════════════════════════════════════════════════════════════

/// Read-only snapshot for display and telemetry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerState {
    pub armed: bool,
    pub bait_sufficient: bool,
    pub auto_feed_enabled: bool,
}

/// The feed scheduler.
pub struct FeedScheduler {
    profile: ActuationProfile,
    /// Live interval (last configured or last re-read from the store).
    interval: FeedInterval,
    armed: bool,
    /// Duration of the current arm; 0 when disarmed.
    armed_secs: u32,
    bait_sufficient: bool,
    auto_feed_enabled: bool,
    /// Feedings since the last bait refill.  Volatile.
    feed_count: u32,
}

impl FeedScheduler {
    /// Auto-feed starts enabled; the interval starts disabled until
    /// [`configure`](Self::configure) runs.
    pub fn new(profile: ActuationProfile, bait_sufficient: bool) -> Self {
        Self {
            profile,
            interval: FeedInterval::DISABLED,
            armed: false,
            armed_secs: 0,
            bait_sufficient,
            auto_feed_enabled: true,
            feed_count: 0,
        }
    }

    // ── Queries ──────────────────────────────────────────────

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Seconds the current alarm was armed for, `None` when disarmed.
    pub fn armed_secs(&self) -> Option<u32> {
        self.armed.then_some(self.armed_secs)
    }

    pub fn feed_count(&self) -> u32 {
        self.feed_count
    }

    pub fn interval(&self) -> FeedInterval {
        self.interval
    }

    pub fn bait_sufficient(&self) -> bool {
        self.bait_sufficient
    }

    pub fn auto_feed_enabled(&self) -> bool {
        self.auto_feed_enabled
    }

    pub fn state(&self) -> SchedulerState {
        SchedulerState {
            armed: self.armed,
            bait_sufficient: self.bait_sufficient,
            auto_feed_enabled: self.auto_feed_enabled,
        }
    }

    // ── Operations ───────────────────────────────────────────

    /// Disarm, persist `interval`, then arm for its duration if feeding
    /// is allowed.  A zero interval leaves the scheduler disarmed.
    ///
    /// A failed write still applies the interval to the live schedule;
    /// the error is returned afterwards.
    pub fn configure(
        &mut self,
        interval: FeedInterval,
        clock: &mut impl ClockPort,
        store: &mut impl IntervalStore,
    ) -> Result<()> {
        interval.validate().map_err(Error::Config)?;

        self.disarm(clock);
        self.interval = interval;
        info!(
            "Scheduler: interval set to {:02}:{:02}:{:02} ({} s)",
            interval.hours,
            interval.minutes,
            interval.seconds,
            interval.as_secs()
        );

        let persisted = store.write_interval(interval);
        if let Err(ref e) = persisted {
            warn!("Scheduler: failed to persist interval: {}", e);
        }

        self.try_arm(clock)?;
        persisted.map_err(Error::from)
    }

    /// React to the alarm.  Returns `false` (and does nothing) when not
    /// armed: the interrupt is stale.
    ///
    /// Blocks for the whole actuation sequence.  The alarm is disarmed
    /// for the duration, so it cannot fire again until re-armed here.
    pub fn on_alarm_fired<H>(&mut self, hw: &mut H, store: &impl IntervalStore) -> bool
    where
        H: ClockPort + ActuatorPort + DelayNs,
    {
        if !self.armed {
            debug!("Scheduler: ignoring stale alarm");
            return false;
        }

        self.feed_count = self.feed_count.saturating_add(1);
        self.disarm(hw);
        info!("Scheduler: feeding #{}", self.feed_count);

        self.actuate(hw);

        // Another path may have changed the store since the last arm.
        self.interval = store.read_interval();
        if let Err(e) = self.try_arm(hw) {
            warn!("Scheduler: re-arm failed: {}", e);
        }
        true
    }

    /// Bait ran low: disarm and suspend feeding.
    pub fn on_bait_insufficient(&mut self, clock: &mut impl ClockPort) {
        self.bait_sufficient = false;
        self.disarm(clock);
        info!("Scheduler: bait insufficient, feeding suspended");
    }

    /// Bait refilled: reset the counter and re-arm if allowed.
    pub fn on_bait_recovered(&mut self, clock: &mut impl ClockPort) -> Result<()> {
        self.bait_sufficient = true;
        self.feed_count = 0;
        info!("Scheduler: bait recovered, feed count reset");
        self.try_arm(clock)
    }

    /// Enable or suspend autonomous feeding.
    pub fn set_auto_feed_enabled(
        &mut self,
        enabled: bool,
        clock: &mut impl ClockPort,
    ) -> Result<()> {
        self.auto_feed_enabled = enabled;
        if enabled {
            info!("Scheduler: auto-feed enabled");
            if !self.armed {
                return self.try_arm(clock);
            }
        } else {
            info!("Scheduler: auto-feed disabled");
            self.disarm(clock);
        }
        Ok(())
    }

    // ── Internal ─────────────────────────────────────────────

    fn may_arm(&self) -> bool {
        self.bait_sufficient && self.auto_feed_enabled && !self.interval.is_disabled()
    }

    fn try_arm(&mut self, clock: &mut impl ClockPort) -> Result<()> {
        if !self.may_arm() {
            debug!(
                "Scheduler: not arming (bait={}, auto={}, interval={} s)",
                self.bait_sufficient,
                self.auto_feed_enabled,
                self.interval.as_secs()
            );
            return Ok(());
        }

        let secs = self.interval.as_secs();
        // An expiry of the previous arming must not count against this one.
        ALARM_FIRED.take();
        match clock.arm_alarm(secs) {
            Ok(()) => {
                self.armed = true;
                self.armed_secs = secs;
                debug!("Scheduler: armed for {} s", secs);
                Ok(())
            }
            Err(e) => {
                self.armed = false;
                self.armed_secs = 0;
                Err(Error::Clock(e))
            }
        }
    }

    fn disarm(&mut self, clock: &mut impl ClockPort) {
        if self.armed {
            debug!("Scheduler: disarmed");
        }
        clock.disarm_alarm();
        ALARM_FIRED.take();
        self.armed = false;
        self.armed_secs = 0;
    }

    fn actuate<H: ActuatorPort + DelayNs>(&self, hw: &mut H) {
        let p = self.profile;
        if let Err(e) = hw.move_to(p.open_angle_deg) {
            warn!("Scheduler: open failed: {}", e);
        }
        hw.delay_ms(p.open_hold_ms);
        if let Err(e) = hw.move_to(p.rest_angle_deg) {
            warn!("Scheduler: close failed: {}", e);
        }
        hw.delay_ms(p.rest_hold_ms);
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════
