//! Shared mutable context threaded through every FSM handler.
//!
//! `UiContext` is the single struct that key handlers read from and
//! write to.  It carries the live snapshot the main loop hands in, the
//! edit session (only while editing), and the action the handler wants
//! the service to carry out.

use crate::clock::SystemTime;
use crate::config::FeedInterval;

// ---------------------------------------------------------------------------
// Field reference (the cursor)
// ---------------------------------------------------------------------------

/// One editable field.  Declaration order is cursor order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldRef {
    TimeHour,
    TimeMinute,
    TimeSecond,
    IntervalHour,
    IntervalMinute,
    IntervalSecond,
}

impl FieldRef {
    /// Cursor order.  Stepping past either end crosses into the other group.
    pub const ORDER: [Self; 6] = [
        Self::TimeHour,
        Self::TimeMinute,
        Self::TimeSecond,
        Self::IntervalHour,
        Self::IntervalMinute,
        Self::IntervalSecond,
    ];

    /// Where the cursor lands on entering Edit.
    pub const FIRST: Self = Self::TimeHour;

    fn position(self) -> usize {
        self as usize
    }

    pub fn next(self) -> Self {
        Self::ORDER[(self.position() + 1) % Self::ORDER.len()]
    }

    pub fn prev(self) -> Self {
        Self::ORDER[(self.position() + Self::ORDER.len() - 1) % Self::ORDER.len()]
    }

    /// 24 for hours, 60 for minutes and seconds.
    pub fn modulus(self) -> u8 {
        match self {
            Self::TimeHour | Self::IntervalHour => 24,
            _ => 60,
        }
    }

    pub fn is_interval(self) -> bool {
        matches!(
            self,
            Self::IntervalHour | Self::IntervalMinute | Self::IntervalSecond
        )
    }
}

// ---------------------------------------------------------------------------
// Edit session (working copies)
// ---------------------------------------------------------------------------

/// Working copies of time and interval, plus the cursor.
///
/// Created on entering Edit, dropped on leaving it.  Nothing here
/// touches the live clock or store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditSession {
    pub working_time: SystemTime,
    pub working_interval: FeedInterval,
    pub cursor: FieldRef,
}

impl EditSession {
    pub fn new(time: SystemTime, interval: FeedInterval) -> Self {
        Self {
            working_time: time,
            working_interval: interval,
            cursor: FieldRef::FIRST,
        }
    }

    pub fn field(&self, field: FieldRef) -> u8 {
        match field {
            FieldRef::TimeHour => self.working_time.hour,
            FieldRef::TimeMinute => self.working_time.minute,
            FieldRef::TimeSecond => self.working_time.second,
            FieldRef::IntervalHour => self.working_interval.hours,
            FieldRef::IntervalMinute => self.working_interval.minutes,
            FieldRef::IntervalSecond => self.working_interval.seconds,
        }
    }

    fn set_field(&mut self, field: FieldRef, value: u8) {
        match field {
            FieldRef::TimeHour => self.working_time.hour = value,
            FieldRef::TimeMinute => self.working_time.minute = value,
            FieldRef::TimeSecond => self.working_time.second = value,
            FieldRef::IntervalHour => self.working_interval.hours = value,
            FieldRef::IntervalMinute => self.working_interval.minutes = value,
            FieldRef::IntervalSecond => self.working_interval.seconds = value,
        }
    }

    /// Step the field under the cursor up by one, wrapping at its modulus.
    pub fn increment(&mut self) {
        let f = self.cursor;
        let m = f.modulus();
        // `% m` first so an out-of-range snapshot cannot overflow.
        let v = (self.field(f) % m + 1) % m;
        self.set_field(f, v);
    }

    /// Step the field under the cursor down by one, wrapping at its modulus.
    pub fn decrement(&mut self) {
        let f = self.cursor;
        let m = f.modulus();
        let v = (self.field(f) % m + m - 1) % m;
        self.set_field(f, v);
    }
}

// ---------------------------------------------------------------------------
// Handler output
// ---------------------------------------------------------------------------

/// What the service must do after a key was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiAction {
    /// Key had no effect in this state.
    None,
    /// Redraw the current state.
    Refresh,
    /// Apply the edited values to the clock and the scheduler.
    Commit {
        time: SystemTime,
        interval: FeedInterval,
    },
}

// ---------------------------------------------------------------------------
// UiContext
// ---------------------------------------------------------------------------

/// The shared context passed to every state handler function.
#[derive(Debug, Clone)]
pub struct UiContext {
    // -- Live snapshot (written by the engine before each dispatch) --
    pub live_time: SystemTime,
    pub live_interval: FeedInterval,

    // -- Edit mode only --
    pub session: Option<EditSession>,

    // -- Output --
    pub action: UiAction,
}

impl UiContext {
    pub fn new() -> Self {
        Self {
            live_time: SystemTime::DEFAULT,
            live_interval: FeedInterval::DISABLED,
            session: None,
            action: UiAction::None,
        }
    }
}

impl Default for UiContext {
    fn default() -> Self {
        Self::new()
    }
}
