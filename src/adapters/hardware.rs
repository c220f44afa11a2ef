//! Hardware adapter: bridges real peripherals to domain port traits.
//!
//! Owns the wall clock, the feed-gate servo, the temperature probe and
//! a blocking delay, exposing them through [`ClockPort`],
//! [`ActuatorPort`], [`TemperatureProbe`] and [`DelayNs`].  One value
//! satisfying every hardware port lets the service borrow it once per
//! iteration.  On non-espidf targets the underlying drivers use
//! cfg-gated simulation stubs.

use embedded_hal::delay::DelayNs;

use crate::adapters::clock::RtcClock;
use crate::app::ports::{ActuatorPort, ClockPort, Presence, TemperatureProbe};
use crate::clock::SystemTime;
use crate::drivers::servo::ServoDriver;
use crate::error::{ActuatorError, ClockError, SensorError};
use crate::sensors::temperature::NtcProbe;

#[cfg(target_os = "espidf")]
type BlockingDelay = esp_idf_hal::delay::FreeRtos;

/// Host stand-in for the FreeRTOS delay.
#[cfg(not(target_os = "espidf"))]
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadDelay;

#[cfg(not(target_os = "espidf"))]
impl DelayNs for ThreadDelay {
    fn delay_ns(&mut self, ns: u32) {
        std::thread::sleep(std::time::Duration::from_nanos(u64::from(ns)));
    }
}

#[cfg(not(target_os = "espidf"))]
type BlockingDelay = ThreadDelay;

/// Concrete adapter that combines all hardware behind port traits.
pub struct HardwareAdapter {
    clock: RtcClock,
    servo: ServoDriver,
    probe: NtcProbe,
    delay: BlockingDelay,
}

impl HardwareAdapter {
    pub fn new(clock: RtcClock, servo: ServoDriver, probe: NtcProbe) -> Self {
        Self {
            clock,
            servo,
            probe,
            #[cfg(target_os = "espidf")]
            delay: esp_idf_hal::delay::FreeRtos,
            #[cfg(not(target_os = "espidf"))]
            delay: ThreadDelay,
        }
    }

    pub fn clock(&self) -> &RtcClock {
        &self.clock
    }

    pub fn clock_mut(&mut self) -> &mut RtcClock {
        &mut self.clock
    }

    pub fn servo(&self) -> &ServoDriver {
        &self.servo
    }
}

// ── ClockPort implementation ──────────────────────────────────

impl ClockPort for HardwareAdapter {
    fn now(&self) -> SystemTime {
        self.clock.now()
    }

    fn set_time(&mut self, time: SystemTime) -> Result<(), ClockError> {
        self.clock.set_time(time)
    }

    fn arm_alarm(&mut self, secs_from_now: u32) -> Result<(), ClockError> {
        self.clock.arm_alarm(secs_from_now)
    }

    fn disarm_alarm(&mut self) {
        self.clock.disarm_alarm();
    }
}

// ── ActuatorPort implementation ───────────────────────────────

impl ActuatorPort for HardwareAdapter {
    fn move_to(&mut self, angle_deg: u8) -> Result<(), ActuatorError> {
        self.servo.move_to(angle_deg)
    }
}

// ── TemperatureProbe implementation ───────────────────────────

impl TemperatureProbe for HardwareAdapter {
    fn reset(&mut self) -> Result<Presence, SensorError> {
        self.probe.reset()
    }

    fn read_temperature(&mut self) -> Result<f32, SensorError> {
        self.probe.read_temperature()
    }
}

// ── DelayNs implementation ────────────────────────────────────

impl DelayNs for HardwareAdapter {
    fn delay_ns(&mut self, ns: u32) {
        self.delay.delay_ns(ns);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.delay.delay_ms(ms);
    }
}
