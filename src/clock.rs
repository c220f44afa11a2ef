//! Wall-clock value type.
//!
//! [`SystemTime`] is the broken-down local time the operator sees and
//! edits.  The clock adapter keeps a free-running seconds counter; the
//! conversions here go through the `time` crate so leap years and month
//! lengths are never hand-rolled.

use core::fmt;

use time::{Date, Month, OffsetDateTime, PrimitiveDateTime, Time};

use crate::error::ClockError;

/// Earliest year the editor and the clock adapter accept.
pub const MIN_YEAR: u16 = 2000;
/// Latest year the editor and the clock adapter accept.
pub const MAX_YEAR: u16 = 2099;

/// Broken-down local time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SystemTime {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

impl SystemTime {
    /// Factory default set on first boot: 2024-01-01 00:00:00.
    pub const DEFAULT: Self = Self {
        year: 2024,
        month: 1,
        day: 1,
        hour: 0,
        minute: 0,
        second: 0,
    };

    /// Check every field, including day-of-month against leap years.
    pub fn validate(&self) -> Result<(), ClockError> {
        if !(MIN_YEAR..=MAX_YEAR).contains(&self.year) {
            return Err(ClockError::InvalidTime);
        }
        self.to_primitive().map(|_| ())
    }

    /// Seconds since 1970-01-01 00:00:00, treating this value as UTC.
    pub fn to_unix(&self) -> Result<i64, ClockError> {
        Ok(self.to_primitive()?.assume_utc().unix_timestamp())
    }

    /// Inverse of [`to_unix`](Self::to_unix).
    pub fn from_unix(secs: i64) -> Option<Self> {
        let dt = OffsetDateTime::from_unix_timestamp(secs).ok()?;
        let year = u16::try_from(dt.year()).ok()?;
        Some(Self {
            year,
            month: u8::from(dt.month()),
            day: dt.day(),
            hour: dt.hour(),
            minute: dt.minute(),
            second: dt.second(),
        })
    }

    /// Same date, different time of day.
    pub fn with_time_of_day(self, hour: u8, minute: u8, second: u8) -> Self {
        Self {
            hour,
            minute,
            second,
            ..self
        }
    }

    fn to_primitive(self) -> Result<PrimitiveDateTime, ClockError> {
        let month = Month::try_from(self.month).map_err(|_| ClockError::InvalidTime)?;
        let date = Date::from_calendar_date(i32::from(self.year), month, self.day)
            .map_err(|_| ClockError::InvalidTime)?;
        let tod = Time::from_hms(self.hour, self.minute, self.second)
            .map_err(|_| ClockError::InvalidTime)?;
        Ok(PrimitiveDateTime::new(date, tod))
    }
}

impl Default for SystemTime {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for SystemTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )
    }
}
