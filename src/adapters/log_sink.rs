//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (which goes to UART / USB-CDC in production).

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started { interval, armed } => {
                info!("START | interval={} | armed={}", interval, armed);
            }
            AppEvent::FeedCompleted { count } => {
                info!("FEED | completed | count={}", count);
            }
            AppEvent::BaitChanged { sufficient } => {
                info!("BAIT | {}", if *sufficient { "OK" } else { "LOW" });
            }
            AppEvent::AutoFeedChanged(enabled) => {
                info!("FEED | auto={}", if *enabled { "on" } else { "off" });
            }
            AppEvent::ModeChanged { from, to } => {
                info!("UI | {:?} -> {:?}", from, to);
            }
            AppEvent::Committed { time, interval } => {
                info!("UI | committed | time={} | interval={}", time, interval);
            }
            AppEvent::IntervalUpdated(interval) => {
                info!("FEED | interval={} (remote)", interval);
            }
            AppEvent::TelemetrySent { ok: true } => {
                info!("TELEM | sent");
            }
            AppEvent::TelemetrySent { ok: false } => {
                warn!("TELEM | send failed, link down");
            }
            AppEvent::CommandRejected => {
                warn!("TELEM | inbound payload rejected");
            }
        }
    }
}
