//! Bait hopper level switch.
//!
//! A digital input sampled once per main-loop iteration: HIGH means
//! bait is present, LOW means insufficient.  The monitor turns samples
//! into transitions; with `debounce_samples == 1` (the default) a single
//! sample is enough to flip the level.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: reads the real GPIO level via hw_init helpers.
//! On host/test: always bait-present.

use log::info;

#[cfg(target_os = "espidf")]
use crate::drivers::hw_init;
#[cfg(target_os = "espidf")]
use crate::pins;

/// Raw read of the level switch.
#[cfg(target_os = "espidf")]
pub fn read_bait_present() -> bool {
    hw_init::gpio_read(pins::BAIT_LEVEL_GPIO)
}

/// No switch on host; tests feed samples to the monitor directly.
#[cfg(not(target_os = "espidf"))]
pub fn read_bait_present() -> bool {
    true
}

/// A change of the accepted level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaitTransition {
    BecameInsufficient,
    Recovered,
}

/// Turns raw samples into accepted level changes.
pub struct BaitLevelMonitor {
    debounce_samples: u8,
    sufficient: bool,
    /// Consecutive samples disagreeing with `sufficient`.
    disagreeing: u8,
}

impl BaitLevelMonitor {
    /// `initial` seeds the accepted level (sampled once at boot).
    pub fn new(initial: bool, debounce_samples: u8) -> Self {
        Self {
            debounce_samples: debounce_samples.max(1),
            sufficient: initial,
            disagreeing: 0,
        }
    }

    /// Feed one sample.  Returns a transition when the accepted level flips.
    pub fn sample(&mut self, present: bool) -> Option<BaitTransition> {
        if present == self.sufficient {
            self.disagreeing = 0;
            return None;
        }

        self.disagreeing += 1;
        if self.disagreeing < self.debounce_samples {
            return None;
        }

        self.disagreeing = 0;
        self.sufficient = present;
        if present {
            info!("BaitLevel: recovered");
            Some(BaitTransition::Recovered)
        } else {
            info!("BaitLevel: insufficient");
            Some(BaitTransition::BecameInsufficient)
        }
    }

    pub fn is_sufficient(&self) -> bool {
        self.sufficient
    }
}
