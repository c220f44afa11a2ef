//! Display frames.
//!
//! Built from read-only snapshots each loop iteration.  A renderer
//! receives the whole frame and never reaches back into the core.

use crate::clock::SystemTime;
use crate::config::FeedInterval;
use crate::fsm::context::FieldRef;
use crate::sensors::temperature::TemperatureStatus;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Frame {
    /// Live status screen.
    Monitor {
        time: SystemTime,
        interval: FeedInterval,
        feed_count: u32,
        bait_sufficient: bool,
        auto_feed_enabled: bool,
        temperature: TemperatureStatus,
        link_up: bool,
    },
    /// Editor: working copies plus the highlighted field.
    Edit {
        time: SystemTime,
        interval: FeedInterval,
        cursor: FieldRef,
    },
}
