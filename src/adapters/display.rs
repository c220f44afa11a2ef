//! Text display adapter.
//!
//! Implements [`DisplayPort`] by laying each frame out as four short
//! text lines, sized for a 128x64 OLED with a 6x8 font, and writing them
//! to the log.  Lines are only logged when they differ from the last
//! rendered frame, so an idle editor stays quiet.

use core::fmt::Write;

use heapless::String;
use log::debug;

use crate::app::frame::Frame;
use crate::app::ports::DisplayPort;
use crate::fsm::context::FieldRef;

pub const LINES: usize = 4;
pub const LINE_LEN: usize = 32;

pub type Line = String<LINE_LEN>;

#[derive(Debug, Default)]
pub struct LogDisplay {
    lines: [Line; LINES],
    renders: u32,
}

impl LogDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Text currently on screen.
    pub fn lines(&self) -> &[Line; LINES] {
        &self.lines
    }

    /// Number of frames that changed the screen.
    pub fn renders(&self) -> u32 {
        self.renders
    }

    /// Lay out `frame` without touching the screen.
    pub fn layout(frame: &Frame) -> [Line; LINES] {
        let mut out: [Line; LINES] = Default::default();
        // Overflowing a line truncates it; the layouts below fit.
        match frame {
            Frame::Monitor {
                time,
                interval,
                feed_count,
                bait_sufficient,
                auto_feed_enabled,
                temperature,
                link_up,
            } => {
                let _ = write!(out[0], "{}", time);
                let _ = write!(out[1], "Every {} Fed {}", interval, feed_count);
                let _ = write!(
                    out[2],
                    "Bait {} Auto {}",
                    if *bait_sufficient { "OK" } else { "LOW" },
                    if *auto_feed_enabled { "on" } else { "off" }
                );
                let _ = write!(
                    out[3],
                    "T {} Link {}",
                    temperature,
                    if *link_up { "up" } else { "down" }
                );
            }
            Frame::Edit {
                time,
                interval,
                cursor,
            } => {
                let _ = write!(out[0], "SET {:04}-{:02}-{:02}", time.year, time.month, time.day);
                let _ = out[1].push_str("Time ");
                write_hms(
                    &mut out[1],
                    [time.hour, time.minute, time.second],
                    [FieldRef::TimeHour, FieldRef::TimeMinute, FieldRef::TimeSecond],
                    *cursor,
                );
                let _ = out[2].push_str("Every ");
                write_hms(
                    &mut out[2],
                    [interval.hours, interval.minutes, interval.seconds],
                    [
                        FieldRef::IntervalHour,
                        FieldRef::IntervalMinute,
                        FieldRef::IntervalSecond,
                    ],
                    *cursor,
                );
                let _ = out[3].push_str("OK=save BACK=cancel");
            }
        }
        out
    }
}

/// `HH:MM:SS` with the field under the cursor bracketed.
fn write_hms(line: &mut Line, values: [u8; 3], fields: [FieldRef; 3], cursor: FieldRef) {
    for (i, (value, field)) in values.iter().zip(fields).enumerate() {
        if i > 0 {
            let _ = line.push(':');
        }
        if field == cursor {
            let _ = write!(line, "[{:02}]", value);
        } else {
            let _ = write!(line, "{:02}", value);
        }
    }
}

impl DisplayPort for LogDisplay {
    fn render(&mut self, frame: &Frame) {
        let next = Self::layout(frame);
        if next == self.lines {
            return;
        }
        for (i, line) in next.iter().enumerate() {
            if *line != self.lines[i] {
                debug!("LCD{} | {}", i, line);
            }
        }
        self.lines = next;
        self.renders = self.renders.wrapping_add(1);
    }
}
