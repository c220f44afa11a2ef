//! Outbound application events.
//!
//! The [`AppService`](super::service::AppService) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them: log to serial, forward upstream, etc.

use crate::clock::SystemTime;
use crate::config::FeedInterval;
use crate::fsm::StateId;

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// The service has started with this interval.
    Started { interval: FeedInterval, armed: bool },

    /// One actuation sequence completed.
    FeedCompleted { count: u32 },

    /// Bait level changed.
    BaitChanged { sufficient: bool },

    /// Auto-feed was switched remotely.
    AutoFeedChanged(bool),

    /// The UI moved between Monitor and Edit.
    ModeChanged { from: StateId, to: StateId },

    /// An edit was committed.
    Committed {
        time: SystemTime,
        interval: FeedInterval,
    },

    /// The interval changed remotely.
    IntervalUpdated(FeedInterval),

    /// A publish attempt finished.
    TelemetrySent { ok: bool },

    /// A remote payload could not be parsed.
    CommandRejected,
}
