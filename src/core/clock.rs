//! School time zone handling.
//!
//! Every instant entering the engine passes through `SchoolClock` exactly
//! once, at the ingestion boundary. Period windows and stored day keys are
//! all expressed in the resulting wall-clock time.

use crate::errors::{AppError, AppResult};
use chrono::{DateTime, FixedOffset, NaiveDateTime, Offset, TimeZone, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchoolClock {
    offset: FixedOffset,
}

impl Default for SchoolClock {
    /// India Standard Time, the zone the timetables were written for.
    fn default() -> Self {
        Self {
            offset: FixedOffset::east_opt(5 * 3600 + 30 * 60).unwrap_or(Utc.fix()),
        }
    }
}

impl SchoolClock {
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    /// Build from a config value such as "+05:30", "-03:00" or "UTC".
    pub fn from_offset_str(s: &str) -> AppResult<Self> {
        parse_offset(s).map(Self::new)
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Shift an absolute instant to school-local time.
    pub fn to_school_local(&self, instant: DateTime<Utc>) -> DateTime<FixedOffset> {
        instant.with_timezone(&self.offset)
    }

    pub fn now(&self) -> DateTime<FixedOffset> {
        self.to_school_local(Utc::now())
    }

    /// Attach the school offset to a wall-clock time.
    pub fn at_local(&self, local: NaiveDateTime) -> AppResult<DateTime<FixedOffset>> {
        self.offset
            .from_local_datetime(&local)
            .single()
            .ok_or_else(|| AppError::InvalidTime(local.to_string()))
    }

    /// Parse a user supplied instant.
    ///
    /// RFC 3339 values keep their absolute instant and are shifted to school
    /// time; bare "YYYY-MM-DD HH:MM[:SS]" values are read as school time.
    pub fn parse_instant(&self, s: &str) -> AppResult<DateTime<FixedOffset>> {
        let s = s.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Ok(self.to_school_local(dt.with_timezone(&Utc)));
        }

        for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"] {
            if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
                return self.at_local(naive);
            }
        }

        Err(AppError::InvalidTime(s.to_string()))
    }
}

fn parse_offset(s: &str) -> AppResult<FixedOffset> {
    let raw = s.trim();
    if raw.eq_ignore_ascii_case("utc") || raw == "Z" {
        return Ok(Utc.fix());
    }

    let invalid = || AppError::Configuration(format!("invalid UTC offset '{}'", raw));

    let (sign, rest) = match raw.chars().next() {
        Some('+') => (1, &raw[1..]),
        Some('-') => (-1, &raw[1..]),
        _ => return Err(invalid()),
    };

    let (h, m) = rest.split_once(':').unwrap_or((rest, "0"));
    let h: i32 = h.parse().map_err(|_| invalid())?;
    let m: i32 = m.parse().map_err(|_| invalid())?;
    if h > 14 || m > 59 {
        return Err(invalid());
    }

    FixedOffset::east_opt(sign * (h * 3600 + m * 60)).ok_or_else(invalid)
}
