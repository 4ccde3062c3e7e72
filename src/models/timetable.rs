//! Timetable configuration: the period list, grace thresholds, weekly
//! holidays and the staff check-in window.

use super::period::{PeriodDefinition, Window};
use crate::errors::{AppError, AppResult};
use crate::utils::time::hhmm;
use chrono::{Datelike, NaiveDate, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

/// Minute offsets from a period start that separate PRESENT, HALF_PRESENT
/// and LATE.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraceConfig {
    #[serde(rename = "fullPresentMins")]
    pub full_present_minutes: u32,
    #[serde(rename = "halfPresentMins")]
    pub half_present_minutes: u32,
}

impl Default for GraceConfig {
    fn default() -> Self {
        Self {
            full_present_minutes: 5,
            half_present_minutes: 20,
        }
    }
}

impl GraceConfig {
    pub fn new(full_present_minutes: u32, half_present_minutes: u32) -> AppResult<Self> {
        let grace = Self {
            full_present_minutes,
            half_present_minutes,
        };
        grace.validate()?;
        Ok(grace)
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.half_present_minutes < self.full_present_minutes {
            return Err(AppError::Configuration(format!(
                "half-present threshold ({} min) is below the full-present threshold ({} min)",
                self.half_present_minutes, self.full_present_minutes
            )));
        }
        Ok(())
    }
}

fn default_staff_start() -> NaiveTime {
    NaiveTime::from_hms_opt(9, 0, 0).unwrap_or(NaiveTime::MIN)
}

fn default_staff_duration() -> u32 {
    60
}

/// Daily staff check-in window, independent of the period list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffWindow {
    #[serde(
        rename = "staffAttendanceTime",
        with = "hhmm",
        default = "default_staff_start"
    )]
    pub start_time: NaiveTime,
    #[serde(rename = "staffAttendanceDuration", default = "default_staff_duration")]
    pub duration_minutes: u32,
}

impl Default for StaffWindow {
    fn default() -> Self {
        Self {
            start_time: default_staff_start(),
            duration_minutes: default_staff_duration(),
        }
    }
}

impl StaffWindow {
    pub fn window_on(&self, day: NaiveDate) -> Window {
        Window::starting_at(day.and_time(self.start_time), self.duration_minutes)
    }
}

fn default_holidays() -> BTreeSet<u8> {
    // Friday
    BTreeSet::from([5])
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimetableConfig {
    pub periods: Vec<PeriodDefinition>,
    #[serde(rename = "gracePeriod", default)]
    pub grace: GraceConfig,
    /// Day indices, 0 = Sunday … 6 = Saturday.
    #[serde(default = "default_holidays")]
    pub weekly_holidays: BTreeSet<u8>,
    #[serde(flatten)]
    pub staff: StaffWindow,
}

impl Default for TimetableConfig {
    /// Eight 45-minute periods from 08:00 with a break before 11:15.
    fn default() -> Self {
        let starts = [
            (8, 0),
            (8, 45),
            (9, 30),
            (10, 15),
            (11, 15),
            (12, 0),
            (12, 45),
            (13, 30),
        ];
        let periods = starts
            .iter()
            .zip(1u32..)
            .map(|(&(h, m), id)| {
                PeriodDefinition::new(
                    id,
                    NaiveTime::from_hms_opt(h, m, 0).unwrap_or(NaiveTime::MIN),
                    45,
                )
            })
            .collect();

        Self {
            periods,
            grace: GraceConfig::default(),
            weekly_holidays: default_holidays(),
            staff: StaffWindow::default(),
        }
    }
}

impl TimetableConfig {
    pub fn is_holiday(&self, day: NaiveDate) -> bool {
        let idx = day.weekday().num_days_from_sunday() as u8;
        self.weekly_holidays.contains(&idx)
    }

    pub fn period(&self, id: u32) -> Option<&PeriodDefinition> {
        self.periods.iter().find(|p| p.id == id)
    }

    /// Reject timetables the engine cannot classify against.
    pub fn validate(&self) -> AppResult<()> {
        if self.periods.is_empty() {
            return Err(AppError::Configuration("timetable has no periods".into()));
        }

        self.grace.validate()?;

        let mut ids = HashSet::new();
        for p in &self.periods {
            if p.id == 0 {
                return Err(AppError::Configuration("period ids start at 1".into()));
            }
            if !ids.insert(p.id) {
                return Err(AppError::Configuration(format!(
                    "duplicate period id {}",
                    p.id
                )));
            }
            if p.duration_minutes == 0 {
                return Err(AppError::Configuration(format!(
                    "period {} has a zero duration",
                    p.id
                )));
            }
            if ends_after_midnight(p.start_time, p.duration_minutes) {
                return Err(AppError::Configuration(format!(
                    "period {} runs past midnight",
                    p.id
                )));
            }
        }

        // Any fixed day works: windows are compared in wall-clock time.
        let probe = NaiveDate::from_ymd_opt(2000, 1, 3).unwrap_or(NaiveDate::MIN);
        for (i, a) in self.periods.iter().enumerate() {
            for b in &self.periods[i + 1..] {
                if a.window_on(probe).overlaps(&b.window_on(probe)) {
                    return Err(AppError::Configuration(format!(
                        "periods {} and {} overlap",
                        a.id, b.id
                    )));
                }
            }
        }

        if let Some(bad) = self.weekly_holidays.iter().find(|d| **d > 6) {
            return Err(AppError::Configuration(format!(
                "holiday index {} is outside 0..=6",
                bad
            )));
        }

        if self.staff.duration_minutes == 0 {
            return Err(AppError::Configuration(
                "staff check-in window has a zero duration".into(),
            ));
        }
        if ends_after_midnight(self.staff.start_time, self.staff.duration_minutes) {
            return Err(AppError::Configuration(
                "staff check-in window runs past midnight".into(),
            ));
        }

        Ok(())
    }
}

/// Windows are resolved against the day of the detection, so none may
/// cross into the next one.
fn ends_after_midnight(start: NaiveTime, duration_minutes: u32) -> bool {
    let start_min = u64::from(start.hour() * 60 + start.minute());
    start_min + u64::from(duration_minutes) > 24 * 60
}
