//! Mock adapters for integration tests.
//!
//! Records every clock and actuator call so tests can assert on the full
//! command history without touching real GPIO/PWM registers.

use std::collections::VecDeque;

use baitfeeder::app::events::AppEvent;
use baitfeeder::app::frame::Frame;
use baitfeeder::app::ports::{
    ActuatorPort, ClockPort, ConfigError, DisplayPort, EventSink, IntervalStore, Presence,
    TelemetryPort, TemperatureProbe,
};
use baitfeeder::app::telemetry::StatusReport;
use baitfeeder::clock::SystemTime;
use baitfeeder::config::FeedInterval;
use baitfeeder::error::{ActuatorError, ClockError, CommsError, SensorError};
use embedded_hal::delay::DelayNs;

// ── Hardware call record ──────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwCall {
    Move(u8),
    DelayMs(u32),
    Arm(u32),
    Disarm,
    SetTime(SystemTime),
}

// ── MockHardware ──────────────────────────────────────────────

pub struct MockHardware {
    pub calls: Vec<HwCall>,
    pub now: SystemTime,
    pub armed_for: Option<u32>,
    pub probe_present: bool,
    pub probe_celsius: f32,
}

#[allow(dead_code)]
impl MockHardware {
    pub fn new() -> Self {
        Self {
            calls: Vec::new(),
            now: SystemTime::DEFAULT,
            armed_for: None,
            probe_present: true,
            probe_celsius: 21.0,
        }
    }

    pub fn moves(&self) -> Vec<u8> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                HwCall::Move(a) => Some(*a),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&mut self) {
        self.calls.clear();
    }
}

impl Default for MockHardware {
    fn default() -> Self {
        Self::new()
    }
}

impl ClockPort for MockHardware {
    fn now(&self) -> SystemTime {
        self.now
    }

    fn set_time(&mut self, time: SystemTime) -> Result<(), ClockError> {
        time.validate()?;
        self.now = time;
        self.calls.push(HwCall::SetTime(time));
        Ok(())
    }

    fn arm_alarm(&mut self, secs_from_now: u32) -> Result<(), ClockError> {
        self.armed_for = Some(secs_from_now);
        self.calls.push(HwCall::Arm(secs_from_now));
        Ok(())
    }

    fn disarm_alarm(&mut self) {
        self.armed_for = None;
        self.calls.push(HwCall::Disarm);
    }
}

impl ActuatorPort for MockHardware {
    fn move_to(&mut self, angle_deg: u8) -> Result<(), ActuatorError> {
        self.calls.push(HwCall::Move(angle_deg));
        Ok(())
    }
}

impl DelayNs for MockHardware {
    fn delay_ns(&mut self, _ns: u32) {}

    fn delay_ms(&mut self, ms: u32) {
        self.calls.push(HwCall::DelayMs(ms));
    }
}

impl TemperatureProbe for MockHardware {
    fn reset(&mut self) -> Result<Presence, SensorError> {
        Ok(if self.probe_present {
            Presence::Present
        } else {
            Presence::Absent
        })
    }

    fn read_temperature(&mut self) -> Result<f32, SensorError> {
        if self.probe_present {
            Ok(self.probe_celsius)
        } else {
            Err(SensorError::NotPresent)
        }
    }
}

// ── MemStore ──────────────────────────────────────────────────

pub struct MemStore {
    pub value: Option<FeedInterval>,
    pub writes: u32,
    pub fail_writes: bool,
}

#[allow(dead_code)]
impl MemStore {
    pub fn new() -> Self {
        Self {
            value: None,
            writes: 0,
            fail_writes: false,
        }
    }

    pub fn holding(interval: FeedInterval) -> Self {
        Self {
            value: Some(interval),
            ..Self::new()
        }
    }
}

impl Default for MemStore {
    fn default() -> Self {
        Self::new()
    }
}

impl IntervalStore for MemStore {
    fn read_interval(&self) -> FeedInterval {
        self.value.unwrap_or(FeedInterval::DISABLED)
    }

    fn write_interval(&mut self, interval: FeedInterval) -> Result<(), ConfigError> {
        if self.fail_writes {
            return Err(ConfigError::IoError);
        }
        interval.validate().map_err(ConfigError::ValidationFailed)?;
        self.value = Some(interval);
        self.writes += 1;
        Ok(())
    }

    fn is_provisioned(&self) -> bool {
        self.value.is_some()
    }
}

// ── MockLink ──────────────────────────────────────────────────

pub struct MockLink {
    pub published: Vec<StatusReport>,
    pub attempts: u32,
    pub up: bool,
    pub inbound: VecDeque<Vec<u8>>,
}

#[allow(dead_code)]
impl MockLink {
    pub fn new() -> Self {
        Self {
            published: Vec::new(),
            attempts: 0,
            up: true,
            inbound: VecDeque::new(),
        }
    }

    pub fn push(&mut self, payload: &str) {
        self.inbound.push_back(payload.as_bytes().to_vec());
    }
}

impl Default for MockLink {
    fn default() -> Self {
        Self::new()
    }
}

impl TelemetryPort for MockLink {
    fn publish(&mut self, report: &StatusReport) -> Result<(), CommsError> {
        self.attempts += 1;
        if !self.up {
            return Err(CommsError::LinkDown);
        }
        self.published.push(*report);
        Ok(())
    }

    fn poll_inbound(&mut self, buf: &mut [u8]) -> Option<usize> {
        let payload = self.inbound.pop_front()?;
        let n = payload.len().min(buf.len());
        buf[..n].copy_from_slice(&payload[..n]);
        Some(n)
    }
}

// ── Display / event sink ─────────────────────────────────────

#[derive(Default)]
pub struct MockDisplay {
    pub frames: Vec<Frame>,
}

#[allow(dead_code)]
impl MockDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last(&self) -> Option<&Frame> {
        self.frames.last()
    }
}

impl DisplayPort for MockDisplay {
    fn render(&mut self, frame: &Frame) {
        self.frames.push(*frame);
    }
}

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, event: &AppEvent) -> bool {
        self.events.iter().any(|e| e == event)
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}
