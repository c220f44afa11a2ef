//! Concrete state handler functions and table builder.
//!
//! Each state is defined by plain `fn` pointers: no closures, no
//! dynamic dispatch, no heap.
//!
//! ```text
//!            ┌────────[Confirm: snapshot]────────┐
//!            │                                   ▼
//!        MONITOR                               EDIT ──[Left/Right]──▶ cursor
//!            ▲                                   │  ──[Up/Down]─────▶ working field
//!            ├────────[Confirm: commit]──────────┤
//!            └────────[Back: discard]────────────┘
//! ```

use super::context::{EditSession, UiAction, UiContext};
use super::{StateDescriptor, StateId};
use crate::events::Key;
use log::{debug, info, warn};

// ═══════════════════════════════════════════════════════════════════════════
//  Table builder
// ═══════════════════════════════════════════════════════════════════════════

/// Build the static state table.  Called once at startup.
pub fn build_state_table() -> [StateDescriptor; StateId::COUNT] {
    [
        // Index 0: Monitor
        StateDescriptor {
            id: StateId::Monitor,
            name: "Monitor",
            on_enter: None,
            on_exit: None,
            on_key: monitor_key,
        },
        // Index 1: Edit
        StateDescriptor {
            id: StateId::Edit,
            name: "Edit",
            on_enter: Some(edit_enter),
            on_exit: Some(edit_exit),
            on_key: edit_key,
        },
    ]
}

// ═══════════════════════════════════════════════════════════════════════════
//  MONITOR state
// ═══════════════════════════════════════════════════════════════════════════

fn monitor_key(ctx: &mut UiContext, key: Key) -> Option<StateId> {
    match key {
        Key::Confirm => Some(StateId::Edit),
        Key::Back => {
            ctx.action = UiAction::Refresh;
            None
        }
        // Navigation keys mean nothing outside the editor.
        Key::Up | Key::Down | Key::Left | Key::Right => {
            debug!("MONITOR: ignoring {:?}", key);
            None
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  EDIT state
// ═══════════════════════════════════════════════════════════════════════════

fn edit_enter(ctx: &mut UiContext) {
    ctx.session = Some(EditSession::new(ctx.live_time, ctx.live_interval));
    ctx.action = UiAction::Refresh;
    info!("EDIT: editing {} / interval {} s", ctx.live_time, ctx.live_interval.as_secs());
}

fn edit_exit(ctx: &mut UiContext) {
    ctx.session = None;
}

fn edit_key(ctx: &mut UiContext, key: Key) -> Option<StateId> {
    let Some(session) = ctx.session.as_mut() else {
        // on_enter always creates the session; recover rather than panic.
        warn!("EDIT: no session, returning to monitor");
        return Some(StateId::Monitor);
    };

    match key {
        Key::Confirm => {
            ctx.action = UiAction::Commit {
                time: session.working_time,
                interval: session.working_interval,
            };
            Some(StateId::Monitor)
        }
        Key::Back => {
            info!("EDIT: changes discarded");
            ctx.action = UiAction::Refresh;
            Some(StateId::Monitor)
        }
        Key::Left => {
            session.cursor = session.cursor.prev();
            ctx.action = UiAction::Refresh;
            None
        }
        Key::Right => {
            session.cursor = session.cursor.next();
            ctx.action = UiAction::Refresh;
            None
        }
        Key::Up => {
            session.increment();
            ctx.action = UiAction::Refresh;
            None
        }
        Key::Down => {
            session.decrement();
            ctx.action = UiAction::Refresh;
            None
        }
    }
}
