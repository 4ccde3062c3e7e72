//! Live dashboard figures: what is running now and how many are in.

use super::resolver::resolve;
use super::store::AttendanceStore;
use crate::errors::AppResult;
use crate::models::{SubjectId, SubjectKind, TimetableConfig};
use chrono::NaiveDateTime;
use std::collections::HashSet;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodLabel {
    Period(u32),
    Free,
    Holiday,
}

impl fmt::Display for PeriodLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PeriodLabel::Period(id) => write!(f, "P{}", id),
            PeriodLabel::Free => f.write_str("Free"),
            PeriodLabel::Holiday => f.write_str("Holiday"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiveStatus {
    pub label: PeriodLabel,
    /// Distinct students attending the running period.
    pub present: usize,
    pub total: usize,
}

pub fn live_status<S: AttendanceStore>(
    store: &S,
    timetable: &TimetableConfig,
    now: NaiveDateTime,
) -> AppResult<LiveStatus> {
    let total = store.list_enrolled(SubjectKind::Student)?.len();

    if timetable.is_holiday(now.date()) {
        return Ok(LiveStatus {
            label: PeriodLabel::Holiday,
            present: 0,
            total,
        });
    }

    let Some(period) = resolve(timetable, now) else {
        return Ok(LiveStatus {
            label: PeriodLabel::Free,
            present: 0,
            total,
        });
    };

    let window = period.window_on(now.date());
    let present: HashSet<SubjectId> = store
        .list_records_in_window(SubjectKind::Student, Some(period.id), &window)?
        .into_iter()
        .filter(|r| r.status.is_attended())
        .map(|r| r.subject.id)
        .collect();

    Ok(LiveStatus {
        label: PeriodLabel::Period(period.id),
        present: present.len(),
        total,
    })
}
