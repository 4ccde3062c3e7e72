//! Period resolution: which timetable period contains a given school time.

use crate::models::{PeriodDefinition, TimetableConfig};
use chrono::NaiveDateTime;

/// First period (in timetable order) whose `[start, end)` window contains `at`.
///
/// `at` must already be school-local. Holidays resolve to nothing.
pub fn resolve(timetable: &TimetableConfig, at: NaiveDateTime) -> Option<&PeriodDefinition> {
    if timetable.is_holiday(at.date()) {
        return None;
    }
    timetable
        .periods
        .iter()
        .find(|p| p.window_on(at.date()).contains(at))
}

/// Like [`resolve`], but only `period_id` is eligible when given.
pub fn resolve_with_hint(
    timetable: &TimetableConfig,
    at: NaiveDateTime,
    period_id: Option<u32>,
) -> Option<&PeriodDefinition> {
    match period_id {
        None => resolve(timetable, at),
        Some(id) => resolve(timetable, at).filter(|p| p.id == id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(d: u32, h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 9, d)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn finds_the_running_period() {
        let tt = TimetableConfig::default();
        assert_eq!(resolve(&tt, at(1, 8, 0)).map(|p| p.id), Some(1));
        assert_eq!(resolve(&tt, at(1, 9, 29)).map(|p| p.id), Some(2));
        assert_eq!(resolve(&tt, at(1, 14, 14)).map(|p| p.id), Some(8));
    }

    #[test]
    fn end_boundary_belongs_to_next_period() {
        let tt = TimetableConfig::default();
        assert_eq!(resolve(&tt, at(1, 8, 45)).map(|p| p.id), Some(2));
    }

    #[test]
    fn nothing_outside_school_hours_or_in_gaps() {
        let tt = TimetableConfig::default();
        assert!(resolve(&tt, at(1, 7, 59)).is_none());
        // P4 ends 11:00, P5 starts 11:15
        assert!(resolve(&tt, at(1, 11, 5)).is_none());
        assert!(resolve(&tt, at(1, 14, 15)).is_none());
    }

    #[test]
    fn holidays_never_resolve() {
        let tt = TimetableConfig::default();
        // 2025-09-05 is a Friday
        for h in 8..14 {
            assert!(resolve(&tt, at(5, h, 10)).is_none());
        }
    }

    #[test]
    fn hint_restricts_to_one_period() {
        let tt = TimetableConfig::default();
        assert_eq!(
            resolve_with_hint(&tt, at(1, 8, 10), Some(1)).map(|p| p.id),
            Some(1)
        );
        assert!(resolve_with_hint(&tt, at(1, 8, 10), Some(2)).is_none());
    }
}
