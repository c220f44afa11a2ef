//! Telemetry cadence and status payload.
//!
//! The cadence counts second ticks and says when a publish is due.  A
//! failed publish is only retried at the next due tick.

use serde::Serialize;

use crate::config::FeedInterval;
use crate::error::CommsError;

/// Values the remote service is told about.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatusReport {
    pub feed_count: u32,
    /// `None` when the probe is disabled or faulted.
    pub temperature_c: Option<f32>,
    pub auto_feed_enabled: bool,
    pub interval: FeedInterval,
}

#[derive(Serialize)]
struct PropertyPost {
    method: &'static str,
    params: PostParams,
}

#[derive(Serialize)]
struct PostParams {
    #[serde(rename = "Feedtimes")]
    feed_times: u32,
    #[serde(rename = "Temperature")]
    temperature: i16,
    #[serde(rename = "Feed_ED")]
    feed_enabled: u8,
    #[serde(rename = "FeedInterval_h")]
    interval_hours: u8,
    #[serde(rename = "FeedInterval_m")]
    interval_minutes: u8,
    #[serde(rename = "FeedInterval_s")]
    interval_seconds: u8,
}

impl StatusReport {
    /// Whole degrees, 0 when unknown.
    pub fn temperature_rounded(&self) -> i16 {
        self.temperature_c
            .map(|c| c.round().clamp(f32::from(i16::MIN), f32::from(i16::MAX)) as i16)
            .unwrap_or(0)
    }

    /// Property-post JSON document.
    pub fn to_json(&self) -> Result<String, CommsError> {
        let post = PropertyPost {
            method: "thing.event.property.post",
            params: PostParams {
                feed_times: self.feed_count,
                temperature: self.temperature_rounded(),
                feed_enabled: u8::from(self.auto_feed_enabled),
                interval_hours: self.interval.hours,
                interval_minutes: self.interval.minutes,
                interval_seconds: self.interval.seconds,
            },
        };
        serde_json::to_string(&post).map_err(|_| CommsError::PublishFailed)
    }
}

/// Decides when to publish and remembers whether the link is up.
#[derive(Debug, Clone)]
pub struct TelemetryCadence {
    period_secs: u32,
    elapsed_secs: u32,
    link_up: bool,
}

impl TelemetryCadence {
    pub fn new(period_secs: u32) -> Self {
        Self {
            period_secs: period_secs.max(1),
            elapsed_secs: 0,
            link_up: false,
        }
    }

    /// Count one second.  Returns `true` when a publish attempt is due,
    /// and restarts the count.
    pub fn on_second(&mut self) -> bool {
        self.elapsed_secs += 1;
        if self.elapsed_secs >= self.period_secs {
            self.elapsed_secs = 0;
            true
        } else {
            false
        }
    }

    /// Record the outcome of the attempt.
    pub fn record(&mut self, result: &Result<(), CommsError>) {
        self.link_up = result.is_ok();
    }

    pub fn link_up(&self) -> bool {
        self.link_up
    }
}
