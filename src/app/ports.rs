//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ AppService (domain)
//! ```
//!
//! Driven adapters (clock, store, servo, probe, link, display) implement
//! these traits.  The [`AppService`](super::service::AppService) and the
//! [`FeedScheduler`](crate::scheduler::FeedScheduler) consume them via
//! generics, so the domain core never touches hardware directly.
//!
//! ## Contract notes
//!
//! - **IntervalStore** writes are durable when they return `Ok`.
//! - **ClockPort** has exactly one alarm; arming again replaces it.
//! - All port errors are typed; callers must handle every variant explicitly.

use crate::app::frame::Frame;
use crate::app::telemetry::StatusReport;
use crate::clock::SystemTime;
use crate::config::FeedInterval;
use crate::error::{ActuatorError, ClockError, CommsError, SensorError};

// ───────────────────────────────────────────────────────────────
// Clock / alarm port (driven adapter: domain ↔ RTC)
// ───────────────────────────────────────────────────────────────

/// Free-running wall clock plus a single one-shot alarm.
///
/// The alarm's expiry is delivered out of band through
/// [`ALARM_FIRED`](crate::events::ALARM_FIRED), not through this trait.
pub trait ClockPort {
    /// Snapshot of the current local time.
    fn now(&self) -> SystemTime;

    /// Replace the current time.  Rejects invalid values.
    fn set_time(&mut self, time: SystemTime) -> Result<(), ClockError>;

    /// Arm the alarm `secs_from_now` seconds in the future, replacing
    /// any alarm already armed.
    fn arm_alarm(&mut self, secs_from_now: u32) -> Result<(), ClockError>;

    /// Cancel the alarm.  No-op when nothing is armed.
    fn disarm_alarm(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Interval store (driven adapter: domain ↔ persistent config)
// ───────────────────────────────────────────────────────────────

/// Battery-backed home of the feed interval.
///
/// Implementations MUST validate before persisting and MUST treat a
/// missing or damaged record as [`FeedInterval::DISABLED`].
pub trait IntervalStore {
    /// The persisted interval, or `DISABLED` if none is valid.
    fn read_interval(&self) -> FeedInterval;

    /// Validate and persist.  Durable on `Ok`.
    fn write_interval(&mut self, interval: FeedInterval) -> Result<(), ConfigError>;

    /// Whether a record carrying a valid marker exists.
    fn is_provisioned(&self) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Actuator port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Feed-gate servo.
pub trait ActuatorPort {
    /// Drive the gate to `angle_deg` (0–180).  Returns once the command
    /// is issued; the caller is responsible for any hold time.
    fn move_to(&mut self, angle_deg: u8) -> Result<(), ActuatorError>;
}

// ───────────────────────────────────────────────────────────────
// Temperature probe (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Result of a bus reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    Present,
    Absent,
}

/// One-wire style temperature probe.  Used for display and telemetry only.
pub trait TemperatureProbe {
    /// Reset the bus and report whether a probe answered.
    fn reset(&mut self) -> Result<Presence, SensorError>;

    /// Read the last conversion in degrees Celsius.
    fn read_temperature(&mut self) -> Result<f32, SensorError>;
}

// ───────────────────────────────────────────────────────────────
// Telemetry link (driven adapter: domain ↔ remote service)
// ───────────────────────────────────────────────────────────────

/// Remote status link.
pub trait TelemetryPort {
    /// Publish one status report.  Called at a fixed cadence; the caller
    /// never retries immediately on failure.
    fn publish(&mut self, report: &StatusReport) -> Result<(), CommsError>;

    /// Copy the next inbound payload into `buf`, returning its length.
    /// Payloads longer than `buf` are truncated.
    fn poll_inbound(&mut self, buf: &mut [u8]) -> Option<usize>;
}

// ───────────────────────────────────────────────────────────────
// Display port (driven adapter: domain → screen)
// ───────────────────────────────────────────────────────────────

/// Renders read-only frames.  Must not block on completion.
pub trait DisplayPort {
    fn render(&mut self, frame: &Frame);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Storage port (driven adapter: domain ↔ NVS / flash)
// ───────────────────────────────────────────────────────────────

/// Persistent key-value storage.
///
/// - Keys are namespaced to prevent collisions between subsystems.
/// - Write operations MUST be atomic. No partial writes on power loss.
///   The ESP-IDF NVS API guarantees this natively; in-memory simulation
///   achieves it trivially.
pub trait StoragePort {
    /// Read a value.  Returns the number of bytes written to `buf`.
    fn read(&self, namespace: &str, key: &str, buf: &mut [u8]) -> Result<usize, StorageError>;

    /// Write a value atomically.
    fn write(&mut self, namespace: &str, key: &str, data: &[u8]) -> Result<(), StorageError>;
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`IntervalStore`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// No record found in storage (first boot).
    NotFound,
    /// Stored record failed marker / deserialization check.
    Corrupted,
    /// A field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
    /// Underlying storage is full.
    StorageFull,
    /// Generic I/O error from the storage backend.
    IoError,
}

/// Errors from [`StoragePort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageError {
    /// Requested key does not exist.
    NotFound,
    /// Storage partition is full.
    Full,
    /// Generic I/O error.
    IoError,
}

impl From<StorageError> for ConfigError {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::NotFound => Self::NotFound,
            StorageError::Full => Self::StorageFull,
            StorageError::IoError => Self::IoError,
        }
    }
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "config not found"),
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::StorageFull => write!(f, "storage full"),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

impl core::fmt::Display for StorageError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "key not found"),
            Self::Full => write!(f, "storage full"),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}
