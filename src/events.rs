//! Interrupt-driven event cells.
//!
//! Events are produced by:
//! - GPIO ISRs (keypad falling edges)
//! - Timer callbacks (feed alarm, 1 Hz display tick)
//!
//! and consumed by the main loop, which drains every cell once per
//! iteration.  Each cell holds at most one pending event: a second key
//! press before the loop runs replaces the first, and a second alarm
//! merges into the first.
//!
//! ```text
//! ┌─────────────┐     ┌──────────────┐     ┌──────────────┐
//! │ Key ISR     │────▶│ PENDING_KEY  │────▶│              │
//! │ Alarm timer │────▶│ ALARM_FIRED  │────▶│  Main Loop   │
//! │ 1 Hz timer  │────▶│ SECOND_TICK  │────▶│  (consumer)  │
//! └─────────────┘     └──────────────┘     └──────────────┘
//! ```

use core::sync::atomic::{AtomicBool, AtomicU8, Ordering};

/// Keypad input, one GPIO line per key.
///
/// Discriminants are the key codes the keypad has always reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Key {
    Back = 1,
    Down = 2,
    Left = 4,
    Confirm = 5,
    Right = 6,
    Up = 8,
}

impl Key {
    pub const ALL: [Self; 6] = [
        Self::Back,
        Self::Down,
        Self::Left,
        Self::Confirm,
        Self::Right,
        Self::Up,
    ];

    pub const fn code(self) -> u8 {
        self as u8
    }

    pub const fn from_code(raw: u8) -> Option<Self> {
        match raw {
            1 => Some(Self::Back),
            2 => Some(Self::Down),
            4 => Some(Self::Left),
            5 => Some(Self::Confirm),
            6 => Some(Self::Right),
            8 => Some(Self::Up),
            _ => None,
        }
    }
}

// ── Single-slot key cell ──────────────────────────────────────
//
// 0 is never a key code, so it doubles as "empty".

/// Holds the most recent unconsumed key press.
pub struct KeySlot(AtomicU8);

impl KeySlot {
    pub const fn new() -> Self {
        Self(AtomicU8::new(0))
    }

    /// Record a press, replacing any unconsumed one.  ISR-safe.
    pub fn post(&self, key: Key) {
        self.0.store(key.code(), Ordering::Release);
    }

    /// Consume the pending press, leaving the slot empty.
    pub fn take(&self) -> Option<Key> {
        Key::from_code(self.0.swap(0, Ordering::AcqRel))
    }
}

impl Default for KeySlot {
    fn default() -> Self {
        Self::new()
    }
}

// ── Boolean flag cell ─────────────────────────────────────────

/// Set by an interrupt, cleared by the consumer.
pub struct EventFlag(AtomicBool);

impl EventFlag {
    pub const fn new() -> Self {
        Self(AtomicBool::new(false))
    }

    pub fn raise(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Read and clear in one step.
    pub fn take(&self) -> bool {
        self.0.swap(false, Ordering::AcqRel)
    }
}

impl Default for EventFlag {
    fn default() -> Self {
        Self::new()
    }
}

// ── Global cells ──────────────────────────────────────────────

/// Written by the keypad ISRs.
pub static PENDING_KEY: KeySlot = KeySlot::new();
/// Written by the feed alarm callback.
pub static ALARM_FIRED: EventFlag = EventFlag::new();
/// Written by the 1 Hz display timer.
pub static SECOND_TICK: EventFlag = EventFlag::new();

/// Everything that was pending at the moment of draining.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PendingEvents {
    pub key: Option<Key>,
    pub alarm_fired: bool,
    pub second_elapsed: bool,
}

/// Take every global cell, leaving them all empty.
pub fn drain() -> PendingEvents {
    PendingEvents {
        key: PENDING_KEY.take(),
        alarm_fired: ALARM_FIRED.take(),
        second_elapsed: SECOND_TICK.take(),
    }
}
