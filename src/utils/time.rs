//! Time utilities: parsing HH:MM, "HH:MM/minutes" slots, formatting minutes.

use crate::errors::{AppError, AppResult};
use chrono::NaiveTime;

pub fn parse_time(t: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(t.trim(), "%H:%M").ok()
}

pub fn format_time(t: &NaiveTime) -> String {
    t.format("%H:%M").to_string()
}

pub fn format_minutes(mins: i64) -> String {
    let sign = if mins < 0 { "-" } else { "" };
    let m = mins.abs();
    format!("{}{:02}:{:02}", sign, m / 60, m % 60)
}

/// Parse "08:00/45" into a start time and a duration in minutes.
pub fn parse_slot(s: &str) -> AppResult<(NaiveTime, u32)> {
    let (start, mins) = s
        .split_once('/')
        .ok_or_else(|| AppError::InvalidTime(format!("expected HH:MM/minutes, got '{}'", s)))?;

    let start = parse_time(start).ok_or_else(|| AppError::InvalidTime(start.to_string()))?;
    let mins: u32 = mins
        .trim()
        .parse()
        .map_err(|_| AppError::InvalidTime(format!("invalid duration '{}'", mins)))?;

    Ok((start, mins))
}

/// Parse "5/20" into (full, half) grace minutes.
pub fn parse_grace(s: &str) -> AppResult<(u32, u32)> {
    let (full, half) = s
        .split_once('/')
        .ok_or_else(|| AppError::InvalidTime(format!("expected FULL/HALF minutes, got '{}'", s)))?;

    let parse = |v: &str| {
        v.trim()
            .parse::<u32>()
            .map_err(|_| AppError::InvalidTime(format!("invalid minutes '{}'", v)))
    };

    Ok((parse(full)?, parse(half)?))
}

/// Serde adapter storing a `NaiveTime` as "HH:MM".
pub mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer, de};

    pub fn serialize<S: Serializer>(t: &NaiveTime, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&t.format("%H:%M").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(d)?;
        super::parse_time(&raw)
            .ok_or_else(|| de::Error::custom(format!("invalid HH:MM time '{}'", raw)))
    }
}
