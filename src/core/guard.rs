//! Duplicate detection: one attendance record per subject per slot.

use super::store::AttendanceStore;
use crate::errors::AppResult;
use crate::models::{AttendanceRecord, PeriodDefinition, SubjectRef, Window};

/// Where a detection counts: one timetable period, or the staff day.
#[derive(Debug, Clone, Copy)]
pub enum Slot<'a> {
    Period {
        period: &'a PeriodDefinition,
        window: Window,
    },
    StaffDay {
        check_in: Window,
    },
}

impl Slot<'_> {
    pub fn period_id(&self) -> Option<u32> {
        match self {
            Slot::Period { period, .. } => Some(period.id),
            Slot::StaffDay { .. } => None,
        }
    }

    /// Window searched for an earlier record. For students this is the very
    /// window used for classification; staff are limited to one per day.
    pub fn duplicate_window(&self) -> Window {
        match self {
            Slot::Period { window, .. } => *window,
            Slot::StaffDay { check_in } => Window::whole_day(check_in.day()),
        }
    }
}

pub struct DuplicateGuard<'a, S: AttendanceStore> {
    store: &'a S,
}

impl<'a, S: AttendanceStore> DuplicateGuard<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// The earlier record for `subject` in `slot`, whatever its status.
    pub fn existing_record(
        &self,
        subject: &SubjectRef,
        slot: &Slot<'_>,
    ) -> AppResult<Option<AttendanceRecord>> {
        self.store
            .find_record(subject, slot.period_id(), &slot.duplicate_window())
    }

    pub fn has_existing_record(&self, subject: &SubjectRef, slot: &Slot<'_>) -> AppResult<bool> {
        Ok(self.existing_record(subject, slot)?.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::store::InsertOutcome;
    use crate::db::pool::DbPool;
    use crate::models::{AttendanceStatus, TimetableConfig};
    use chrono::{FixedOffset, NaiveDate, TimeZone};

    fn pool() -> DbPool {
        let pool = DbPool::in_memory().unwrap();
        crate::db::initialize::init_db(&pool.conn).unwrap();
        pool
    }

    fn record(subject: &SubjectRef, h: u32, m: u32, status: AttendanceStatus, period: u32) -> AttendanceRecord {
        let ts = FixedOffset::east_opt(19800)
            .unwrap()
            .with_ymd_and_hms(2025, 9, 1, h, m, 0)
            .unwrap();
        AttendanceRecord::new(subject.clone(), ts, status, Some(period), "test")
    }

    #[test]
    fn record_blocks_only_its_own_period() {
        let pool = pool();
        let tt = TimetableConfig::default();
        let day = NaiveDate::from_ymd_opt(2025, 9, 1).unwrap();
        let s = SubjectRef::student("S");

        let out = pool
            .insert_record(&record(&s, 8, 3, AttendanceStatus::Present, 1))
            .unwrap();
        assert!(matches!(out, InsertOutcome::Inserted(_)));

        let guard = DuplicateGuard::new(&pool);
        let p1 = Slot::Period {
            period: &tt.periods[0],
            window: tt.periods[0].window_on(day),
        };
        let p2 = Slot::Period {
            period: &tt.periods[1],
            window: tt.periods[1].window_on(day),
        };

        assert!(guard.has_existing_record(&s, &p1).unwrap());
        assert!(!guard.has_existing_record(&s, &p2).unwrap());
        assert!(!guard.has_existing_record(&SubjectRef::student("S2"), &p1).unwrap());
    }

    #[test]
    fn absent_stamped_at_period_end_is_seen_by_that_period_only() {
        let pool = pool();
        let tt = TimetableConfig::default();
        let day = NaiveDate::from_ymd_opt(2025, 9, 1).unwrap();
        let s = SubjectRef::student("S");

        pool.insert_record(&record(&s, 8, 45, AttendanceStatus::Absent, 1))
            .unwrap();

        let guard = DuplicateGuard::new(&pool);
        let p1 = Slot::Period {
            period: &tt.periods[0],
            window: tt.periods[0].window_on(day),
        };
        let p2 = Slot::Period {
            period: &tt.periods[1],
            window: tt.periods[1].window_on(day),
        };

        let found = guard.existing_record(&s, &p1).unwrap().unwrap();
        assert_eq!(found.status, AttendanceStatus::Absent);
        assert!(!guard.has_existing_record(&s, &p2).unwrap());
    }
}
