//! Wall clock and feed alarm adapter.
//!
//! Implements [`ClockPort`].
//!
//! - **`target_os = "espidf"`**: wall time via `gettimeofday` /
//!   `settimeofday`; the alarm is the one-shot esp_timer in
//!   [`hw_timer`](crate::drivers::hw_timer), which raises
//!   [`ALARM_FIRED`](crate::events::ALARM_FIRED) on expiry.
//! - **`not(target_os = "espidf")`**: a seconds counter advanced
//!   explicitly by the host loop or tests.  [`RtcClock::advance`] reports
//!   the alarm expiry instead of touching the global flag.
//!
//! Local time is kept as if it were UTC; no timezone is applied.

use log::{debug, info};

use crate::app::ports::ClockPort;
use crate::clock::SystemTime;
use crate::error::ClockError;

#[cfg(target_os = "espidf")]
use crate::drivers::hw_timer;

/// Anything earlier has never been set since power-up.
const EPOCH_2020: i64 = 1_577_836_800;

pub struct RtcClock {
    #[cfg(not(target_os = "espidf"))]
    unix: i64,
    #[cfg(not(target_os = "espidf"))]
    alarm_at: Option<i64>,
}

impl Default for RtcClock {
    fn default() -> Self {
        Self::new()
    }
}

impl RtcClock {
    /// The host clock starts unset, like a freshly powered RTC.
    pub fn new() -> Self {
        Self {
            #[cfg(not(target_os = "espidf"))]
            unix: 0,
            #[cfg(not(target_os = "espidf"))]
            alarm_at: None,
        }
    }

    #[cfg(target_os = "espidf")]
    fn unix_now(&self) -> i64 {
        let mut tv = esp_idf_svc::sys::timeval {
            tv_sec: 0,
            tv_usec: 0,
        };
        // SAFETY: tv is a valid out-param; a null timezone is allowed.
        if unsafe { esp_idf_svc::sys::gettimeofday(&mut tv, core::ptr::null_mut()) } != 0 {
            return 0;
        }
        tv.tv_sec as i64
    }

    #[cfg(not(target_os = "espidf"))]
    fn unix_now(&self) -> i64 {
        self.unix
    }

    /// Whether the wall clock has been set since power-up.
    pub fn is_set(&self) -> bool {
        self.unix_now() >= EPOCH_2020
    }

    /// Move the host clock forward.  Returns `true` when the armed alarm
    /// expired during the step; the alarm is then consumed.
    #[cfg(not(target_os = "espidf"))]
    pub fn advance(&mut self, secs: u32) -> bool {
        self.unix += i64::from(secs);
        match self.alarm_at {
            Some(at) if self.unix >= at => {
                self.alarm_at = None;
                true
            }
            _ => false,
        }
    }

    /// Seconds until the alarm expires, `None` when disarmed.
    #[cfg(not(target_os = "espidf"))]
    pub fn alarm_remaining(&self) -> Option<u32> {
        self.alarm_at
            .map(|at| u32::try_from((at - self.unix).max(0)).unwrap_or(u32::MAX))
    }
}

impl ClockPort for RtcClock {
    fn now(&self) -> SystemTime {
        SystemTime::from_unix(self.unix_now())
            .filter(|t| t.validate().is_ok())
            .unwrap_or(SystemTime::DEFAULT)
    }

    fn set_time(&mut self, time: SystemTime) -> Result<(), ClockError> {
        time.validate()?;
        let secs = time.to_unix()?;

        #[cfg(target_os = "espidf")]
        {
            let tv = esp_idf_svc::sys::timeval {
                tv_sec: secs as _,
                tv_usec: 0,
            };
            // SAFETY: tv is fully initialised; a null timezone is allowed.
            if unsafe { esp_idf_svc::sys::settimeofday(&tv, core::ptr::null()) } != 0 {
                return Err(ClockError::WriteFailed);
            }
        }

        #[cfg(not(target_os = "espidf"))]
        {
            self.unix = secs;
        }

        info!("RtcClock: time set to {}", time);
        Ok(())
    }

    fn arm_alarm(&mut self, secs_from_now: u32) -> Result<(), ClockError> {
        #[cfg(target_os = "espidf")]
        hw_timer::alarm_arm(secs_from_now)?;

        #[cfg(not(target_os = "espidf"))]
        {
            self.alarm_at = Some(self.unix + i64::from(secs_from_now));
        }

        debug!("RtcClock: alarm armed for {} s", secs_from_now);
        Ok(())
    }

    fn disarm_alarm(&mut self) {
        #[cfg(target_os = "espidf")]
        hw_timer::alarm_disarm();

        #[cfg(not(target_os = "espidf"))]
        {
            self.alarm_at = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_clock_reads_default() {
        let clock = RtcClock::new();
        assert!(!clock.is_set());
        assert_eq!(clock.now(), SystemTime::DEFAULT);
    }

    #[test]
    fn set_time_round_trips() {
        let mut clock = RtcClock::new();
        let t = SystemTime {
            year: 2024,
            month: 2,
            day: 29,
            hour: 23,
            minute: 59,
            second: 58,
        };
        clock.set_time(t).unwrap();
        assert!(clock.is_set());
        assert_eq!(clock.now(), t);

        clock.advance(3);
        assert_eq!(
            clock.now(),
            SystemTime {
                year: 2024,
                month: 3,
                day: 1,
                hour: 0,
                minute: 0,
                second: 1,
            }
        );
    }

    #[test]
    fn invalid_time_rejected() {
        let mut clock = RtcClock::new();
        let bad = SystemTime {
            month: 2,
            day: 30,
            ..SystemTime::DEFAULT
        };
        assert_eq!(clock.set_time(bad), Err(ClockError::InvalidTime));
        assert!(!clock.is_set());
    }

    #[test]
    fn alarm_expires_once() {
        let mut clock = RtcClock::new();
        clock.arm_alarm(5).unwrap();
        assert_eq!(clock.alarm_remaining(), Some(5));
        assert!(!clock.advance(4));
        assert!(clock.advance(1));
        assert!(!clock.advance(10));
        assert_eq!(clock.alarm_remaining(), None);
    }

    #[test]
    fn rearm_replaces_pending_alarm() {
        let mut clock = RtcClock::new();
        clock.arm_alarm(5).unwrap();
        clock.arm_alarm(60).unwrap();
        assert!(!clock.advance(5));
        assert_eq!(clock.alarm_remaining(), Some(55));
    }

    #[test]
    fn disarm_cancels() {
        let mut clock = RtcClock::new();
        clock.arm_alarm(1).unwrap();
        clock.disarm_alarm();
        assert!(!clock.advance(2));
    }
}
