//! Line-oriented telemetry link.
//!
//! Implements [`TelemetryPort`] by writing each status report as one
//! property-post JSON line to the console, where a bridge process (or
//! an AT-command Wi-Fi module sharing the UART) picks it up.  Inbound
//! property-set payloads are queued with [`LineTelemetry::push_inbound`]
//! and handed to the service one at a time.

use heapless::{Deque, Vec};
use log::{info, warn};

use crate::app::ports::TelemetryPort;
use crate::app::telemetry::StatusReport;
use crate::error::CommsError;

/// Longest inbound payload kept.
pub const MAX_PAYLOAD: usize = 256;
/// Inbound payloads buffered before new ones are dropped.
pub const INBOUND_DEPTH: usize = 4;

pub struct LineTelemetry {
    link_available: bool,
    inbound: Deque<Vec<u8, MAX_PAYLOAD>, INBOUND_DEPTH>,
    published: u32,
    last_payload: Option<String>,
}

impl Default for LineTelemetry {
    fn default() -> Self {
        Self::new()
    }
}

impl LineTelemetry {
    pub fn new() -> Self {
        Self {
            link_available: true,
            inbound: Deque::new(),
            published: 0,
            last_payload: None,
        }
    }

    /// Mark the link up or down.  While down every publish fails.
    pub fn set_link_available(&mut self, available: bool) {
        self.link_available = available;
    }

    /// Queue one inbound payload.  Oversized payloads and a full queue
    /// are rejected.
    pub fn push_inbound(&mut self, payload: &[u8]) -> Result<(), CommsError> {
        let buf = Vec::from_slice(payload).map_err(|_| CommsError::MalformedCommand)?;
        self.inbound.push_back(buf).map_err(|_| {
            warn!("LineTelemetry: inbound queue full, payload dropped");
            CommsError::LinkDown
        })
    }

    /// Successful publishes so far.
    pub fn published(&self) -> u32 {
        self.published
    }

    /// The last JSON line written.
    pub fn last_payload(&self) -> Option<&str> {
        self.last_payload.as_deref()
    }
}

impl TelemetryPort for LineTelemetry {
    fn publish(&mut self, report: &StatusReport) -> Result<(), CommsError> {
        if !self.link_available {
            return Err(CommsError::LinkDown);
        }
        let json = report.to_json()?;
        info!("TELEM > {}", json);
        self.published = self.published.wrapping_add(1);
        self.last_payload = Some(json);
        Ok(())
    }

    fn poll_inbound(&mut self, buf: &mut [u8]) -> Option<usize> {
        let payload = self.inbound.pop_front()?;
        let len = payload.len().min(buf.len());
        buf[..len].copy_from_slice(&payload[..len]);
        Some(len)
    }
}
