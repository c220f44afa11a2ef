//! System configuration parameters
//!
//! The feed interval is the only operator-editable value and is persisted
//! through the [`IntervalStore`](crate::app::ports::IntervalStore) port.
//! Everything else in [`FeederConfig`] is a build-time tunable.

use serde::{Deserialize, Serialize};

/// Time between two autonomous feedings.
///
/// All-zero means autonomous feeding is disabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FeedInterval {
    /// 0-23
    pub hours: u8,
    /// 0-59
    pub minutes: u8,
    /// 0-59
    pub seconds: u8,
}

impl FeedInterval {
    /// Autonomous feeding disabled.
    pub const DISABLED: Self = Self::new(0, 0, 0);

    pub const fn new(hours: u8, minutes: u8, seconds: u8) -> Self {
        Self {
            hours,
            minutes,
            seconds,
        }
    }

    /// Alarm duration in seconds: `h*3600 + m*60 + s`.
    pub const fn as_secs(&self) -> u32 {
        self.hours as u32 * 3600 + self.minutes as u32 * 60 + self.seconds as u32
    }

    pub const fn is_disabled(&self) -> bool {
        self.as_secs() == 0
    }

    /// Range-check every field.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.hours > 23 {
            return Err("interval hours must be 0–23");
        }
        if self.minutes > 59 {
            return Err("interval minutes must be 0–59");
        }
        if self.seconds > 59 {
            return Err("interval seconds must be 0–59");
        }
        Ok(())
    }
}

impl core::fmt::Display for FeedInterval {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:02}:{:02}:{:02}", self.hours, self.minutes, self.seconds)
    }
}

/// Build-time tunables for the feeder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeederConfig {
    // --- Scheduling ---
    /// Interval written to the store on first boot (no validity marker yet).
    pub first_boot_interval: FeedInterval,

    // --- Actuator ---
    /// Servo angle that opens the feed gate (degrees, 0-180)
    pub open_angle_deg: u8,
    /// Servo angle of the closed/rest position (degrees, 0-180)
    pub rest_angle_deg: u8,
    /// Hold time in the open position (milliseconds)
    pub open_hold_ms: u32,
    /// Hold time after returning to rest (milliseconds)
    pub rest_hold_ms: u32,

    // --- Sensors ---
    /// Sample the temperature probe at all
    pub temperature_enabled: bool,
    /// Consecutive identical samples before a bait level change is accepted
    pub bait_debounce_samples: u8,

    // --- Telemetry ---
    /// Seconds between publish attempts
    pub telemetry_interval_secs: u32,
}

impl Default for FeederConfig {
    fn default() -> Self {
        Self {
            first_boot_interval: FeedInterval::new(0, 10, 0), // 10 min

            open_angle_deg: 90,
            rest_angle_deg: 0,
            open_hold_ms: 2000,
            rest_hold_ms: 1000,

            temperature_enabled: true,
            bait_debounce_samples: 1, // binary, no debounce

            telemetry_interval_secs: 30,
        }
    }
}

impl FeederConfig {
    /// Reject values the drivers cannot honour.
    pub fn validate(&self) -> Result<(), &'static str> {
        self.first_boot_interval.validate()?;
        if self.open_angle_deg > 180 || self.rest_angle_deg > 180 {
            return Err("servo angles must be 0–180");
        }
        if self.open_angle_deg == self.rest_angle_deg {
            return Err("open and rest angles must differ");
        }
        if !(100..=10_000).contains(&self.open_hold_ms) {
            return Err("open_hold_ms must be 100–10000");
        }
        if self.rest_hold_ms > 10_000 {
            return Err("rest_hold_ms must be 0–10000");
        }
        if self.bait_debounce_samples == 0 {
            return Err("bait_debounce_samples must be at least 1");
        }
        if !(1..=3600).contains(&self.telemetry_interval_secs) {
            return Err("telemetry_interval_secs must be 1–3600");
        }
        Ok(())
    }
}
