use crate::utils::time::hhmm;
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// One class period of the daily timetable, in school wall-clock time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodDefinition {
    pub id: u32,
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    pub duration_minutes: u32,
}

impl PeriodDefinition {
    pub fn new(id: u32, start_time: NaiveTime, duration_minutes: u32) -> Self {
        Self {
            id,
            start_time,
            duration_minutes,
        }
    }

    /// The `[start, end)` window of this period on the given school day.
    pub fn window_on(&self, day: NaiveDate) -> Window {
        Window::starting_at(day.and_time(self.start_time), self.duration_minutes)
    }

    pub fn label(&self) -> String {
        format!("P{}", self.id)
    }
}

/// Half-open interval of school-local wall-clock time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl Window {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self { start, end }
    }

    pub fn starting_at(start: NaiveDateTime, minutes: u32) -> Self {
        Self {
            start,
            end: start + Duration::minutes(i64::from(minutes)),
        }
    }

    /// Midnight to midnight of `day`.
    pub fn whole_day(day: NaiveDate) -> Self {
        let start = day.and_time(NaiveTime::MIN);
        Self {
            start,
            end: start + Duration::days(1),
        }
    }

    pub fn contains(&self, at: NaiveDateTime) -> bool {
        self.start <= at && at < self.end
    }

    pub fn day(&self) -> NaiveDate {
        self.start.date()
    }

    pub fn overlaps(&self, other: &Window) -> bool {
        self.start < other.end && other.start < self.end
    }
}
