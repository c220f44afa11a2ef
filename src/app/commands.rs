//! Inbound commands to the application service.
//!
//! These represent actions requested by the remote service.  The raw
//! property-set payload is parsed here so the telemetry adapter stays a
//! dumb byte pipe:
//!
//! ```text
//! {"params":{"Feed_ED":1,"FeedInterval_h":0,"FeedInterval_m":5}}
//! ```
//!
//! Every field is optional.  Interval fields that are present are merged
//! onto the current interval; absent ones keep their value.

use heapless::Vec;
use serde::Deserialize;

use crate::config::FeedInterval;
use crate::error::CommsError;

/// Commands that external adapters can send into the application core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppCommand {
    /// Enable or suspend autonomous feeding.
    SetAutoFeed(bool),

    /// Persist a new interval and re-arm, exactly like a committed edit.
    UpdateInterval(FeedInterval),
}

#[derive(Debug, Deserialize)]
struct Envelope {
    params: PropertySet,
}

/// Fields of one property-set message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct PropertySet {
    #[serde(rename = "Feed_ED", default)]
    pub feed_enabled: Option<u8>,
    #[serde(rename = "FeedInterval_h", default)]
    pub interval_hours: Option<u8>,
    #[serde(rename = "FeedInterval_m", default)]
    pub interval_minutes: Option<u8>,
    #[serde(rename = "FeedInterval_s", default)]
    pub interval_seconds: Option<u8>,
}

/// Parse and range-check a property-set payload.
pub fn parse_property_set(payload: &[u8]) -> Result<PropertySet, CommsError> {
    let env: Envelope =
        serde_json::from_slice(payload).map_err(|_| CommsError::MalformedCommand)?;
    let p = env.params;

    if p.feed_enabled.is_some_and(|v| v > 1) {
        return Err(CommsError::MalformedCommand);
    }
    if p.interval_hours.is_some_and(|v| v > 23)
        || p.interval_minutes.is_some_and(|v| v > 59)
        || p.interval_seconds.is_some_and(|v| v > 59)
    {
        return Err(CommsError::MalformedCommand);
    }
    Ok(p)
}

impl PropertySet {
    pub fn touches_interval(&self) -> bool {
        self.interval_hours.is_some()
            || self.interval_minutes.is_some()
            || self.interval_seconds.is_some()
    }

    /// Expand into commands, merging interval fields onto `current`.
    /// Auto-feed comes first so a combined message re-arms once.
    pub fn into_commands(self, current: FeedInterval) -> Vec<AppCommand, 2> {
        let mut cmds = Vec::new();
        if let Some(v) = self.feed_enabled {
            let _ = cmds.push(AppCommand::SetAutoFeed(v == 1));
        }
        if self.touches_interval() {
            let merged = FeedInterval::new(
                self.interval_hours.unwrap_or(current.hours),
                self.interval_minutes.unwrap_or(current.minutes),
                self.interval_seconds.unwrap_or(current.seconds),
            );
            let _ = cmds.push(AppCommand::UpdateInterval(merged));
        }
        cmds
    }
}
