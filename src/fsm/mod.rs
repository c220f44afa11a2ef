//! Function-pointer finite state machine for the operator interface.
//!
//! Classic embedded FSM pattern ported to Rust:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  StateTable                                              │
//! │  ┌─────────┬───────────┬──────────┬────────────────────┐ │
//! │  │ StateId │ on_enter  │ on_exit  │ on_key             │ │
//! │  ├─────────┼───────────┼──────────┼────────────────────┤ │
//! │  │ Monitor │ -         │ -        │ fn(ctx,key)->Opt<> │ │
//! │  │ Edit    │ fn(ctx)   │ fn(ctx)  │ fn(ctx,key)->Opt<> │ │
//! │  └─────────┴───────────┴──────────┴────────────────────┘ │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! Each consumed key is dispatched to `on_key` of the **current** state.
//! If it returns `Some(next_id)`, the engine runs `on_exit` for the
//! current state, then `on_enter` for the next, and updates the
//! current pointer.  The resulting [`UiAction`] is left in the context
//! for the caller to apply.

pub mod context;
pub mod states;

use context::{EditSession, UiAction, UiContext};
use log::info;

use crate::clock::SystemTime;
use crate::config::FeedInterval;
use crate::events::Key;

// ---------------------------------------------------------------------------
// State identity
// ---------------------------------------------------------------------------

/// UI modes.
/// Must stay in sync with the state table built in [`states::build_state_table`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum StateId {
    Monitor = 0,
    Edit = 1,
}

impl StateId {
    /// Total number of states, used to size the table array.
    pub const COUNT: usize = 2;

    /// Convert an index back to `StateId`.  Panics on out-of-range in
    /// debug builds; returns `Monitor` in release (safe fallback).
    pub fn from_index(idx: usize) -> Self {
        match idx {
            0 => Self::Monitor,
            1 => Self::Edit,
            _ => {
                debug_assert!(false, "invalid state index: {idx}");
                Self::Monitor
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Function-pointer type aliases
// ---------------------------------------------------------------------------

/// Signature for `on_enter` and `on_exit` actions.
pub type StateActionFn = fn(&mut UiContext);

/// Signature for the per-key handler.
/// Returns `Some(next)` to trigger a transition, or `None` to stay.
pub type KeyHandlerFn = fn(&mut UiContext, Key) -> Option<StateId>;

// ---------------------------------------------------------------------------
// State descriptor (one row in the table)
// ---------------------------------------------------------------------------

/// Static descriptor for a single UI state.
pub struct StateDescriptor {
    pub id: StateId,
    pub name: &'static str,
    pub on_enter: Option<StateActionFn>,
    pub on_exit: Option<StateActionFn>,
    pub on_key: KeyHandlerFn,
}

// ---------------------------------------------------------------------------
// FSM engine
// ---------------------------------------------------------------------------

/// The interaction state machine.
///
/// Owns the state table and the [`UiContext`]; the context is never
/// shared with anything outside this engine except by shared reference.
pub struct Fsm {
    /// Fixed-size table indexed by `StateId as usize`.
    table: [StateDescriptor; StateId::COUNT],
    /// Index of the currently active state.
    current: usize,
    ctx: UiContext,
}

impl Fsm {
    /// Construct a new FSM with the given state table, starting in `Monitor`.
    pub fn new(table: [StateDescriptor; StateId::COUNT]) -> Self {
        Self {
            table,
            current: StateId::Monitor as usize,
            ctx: UiContext::new(),
        }
    }

    /// Dispatch one key against a snapshot of the live values.
    ///
    /// The key is always consumed, even when the current state ignores it.
    pub fn handle_key(
        &mut self,
        key: Key,
        live_time: SystemTime,
        live_interval: FeedInterval,
    ) -> UiAction {
        self.ctx.live_time = live_time;
        self.ctx.live_interval = live_interval;
        self.ctx.action = UiAction::None;

        let next = (self.table[self.current].on_key)(&mut self.ctx, key);
        if let Some(next_id) = next {
            self.transition(next_id);
        }
        self.ctx.action
    }

    /// The current state's identity.
    pub fn current_state(&self) -> StateId {
        StateId::from_index(self.current)
    }

    /// Working copies and cursor, present only in Edit.
    pub fn session(&self) -> Option<&EditSession> {
        self.ctx.session.as_ref()
    }

    // -----------------------------------------------------------------------
    // Internal
    // -----------------------------------------------------------------------

    fn transition(&mut self, next_id: StateId) {
        let next_idx = next_id as usize;

        info!(
            "FSM transition: {} -> {}",
            self.table[self.current].name, self.table[next_idx].name
        );

        if let Some(exit) = self.table[self.current].on_exit {
            exit(&mut self.ctx);
        }

        self.current = next_idx;

        if let Some(enter) = self.table[self.current].on_enter {
            enter(&mut self.ctx);
        }
    }
}

impl Default for Fsm {
    fn default() -> Self {
        Self::new(states::build_state_table())
    }
}
