//! Six-line keypad with in-ISR bounce suppression.
//!
//! ## Hardware
//!
//! Active-low momentary switches with pull-ups, one GPIO per key. Each
//! line fires on its falling edge; the ISR spins until the line reads
//! high again and only then latches the key code into
//! [`PENDING_KEY`](crate::events::PENDING_KEY).  Bounces during the
//! press are swallowed by the spin; the release edge is a rising edge
//! and never triggers.
//!
//! ## Policy
//!
//! | Situation                        | Result                       |
//! |----------------------------------|------------------------------|
//! | Press, release                   | key latched on release       |
//! | Two presses before main loop run | second overwrites first      |
//! | Line stuck low                   | spin gives up, nothing latched |

use crate::events::{Key, KeySlot};
use crate::pins;

/// Upper bound on release polls inside the ISR.  At roughly 100 ns per
/// GPIO read this is about 200 ms, well past any switch bounce.
pub const MAX_RELEASE_POLLS: u32 = 2_000_000;

/// One key and the GPIO it is wired to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyLine {
    pub key: Key,
    pub gpio: i32,
}

/// Wiring table.
pub const KEY_LINES: [KeyLine; 6] = [
    KeyLine { key: Key::Back, gpio: pins::KEY_BACK_GPIO },
    KeyLine { key: Key::Down, gpio: pins::KEY_DOWN_GPIO },
    KeyLine { key: Key::Left, gpio: pins::KEY_LEFT_GPIO },
    KeyLine { key: Key::Confirm, gpio: pins::KEY_CONFIRM_GPIO },
    KeyLine { key: Key::Right, gpio: pins::KEY_RIGHT_GPIO },
    KeyLine { key: Key::Up, gpio: pins::KEY_UP_GPIO },
];

pub fn gpio_for(key: Key) -> i32 {
    KEY_LINES
        .iter()
        .find(|l| l.key == key)
        .map_or(-1, |l| l.gpio)
}

/// ISR body for a falling edge on `key`'s line.
///
/// Spins on `line_is_high` until the switch is released, then posts the
/// key.  Returns whether the key was latched.
pub fn on_falling_edge(key: Key, slot: &KeySlot, mut line_is_high: impl FnMut() -> bool) -> bool {
    for _ in 0..MAX_RELEASE_POLLS {
        if line_is_high() {
            slot.post(key);
            return true;
        }
        core::hint::spin_loop();
    }
    false
}

/// GPIO ISR trampoline.  `arg` carries the key code.
///
/// # Safety
///
/// Registered with `gpio_isr_handler_add` by `hw_init::init_isr_service`;
/// only reads GPIO registers and stores one atomic byte.
#[cfg(target_os = "espidf")]
pub unsafe extern "C" fn key_gpio_isr(arg: *mut core::ffi::c_void) {
    let Some(key) = Key::from_code(arg as usize as u8) else {
        return;
    };
    let gpio = gpio_for(key);
    on_falling_edge(key, &crate::events::PENDING_KEY, || {
        crate::drivers::hw_init::gpio_read(gpio)
    });
}
