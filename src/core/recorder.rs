//! The single entry point through which any ingestion channel writes an
//! attendance record.
//!
//! One evaluation walks RESOLVE_PERIOD → CHECK_HOLIDAY → CHECK_DUPLICATE →
//! CLASSIFY → DECIDE and creates at most one record.

use super::classifier::{classify, classify_staff};
use super::guard::{DuplicateGuard, Slot};
use super::resolver::resolve_with_hint;
use super::store::{AttendanceStore, InsertOutcome};
use crate::errors::{AppError, AppResult};
use crate::models::{
    AttendanceRecord, AttendanceStatus, Classification, DetectionEvent, Evaluation, RejectReason,
    SubjectKind, TimetableConfig,
};
use crate::ui::messages::warning;
use chrono::NaiveDateTime;

pub struct AttendanceRecorder<'a, S: AttendanceStore> {
    store: &'a S,
}

impl<'a, S: AttendanceStore> AttendanceRecorder<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Evaluate one detection against a timetable snapshot.
    ///
    /// Rejections are `Ok`. `Err` is reserved for storage failures, which
    /// the caller may retry.
    pub fn evaluate(
        &self,
        timetable: &TimetableConfig,
        event: &DetectionEvent,
    ) -> AppResult<Evaluation> {
        let at = event.detected_at.naive_local();

        // 1) RESOLVE_PERIOD + CHECK_HOLIDAY
        let Some(slot) = resolve_slot(timetable, event, at) else {
            return Ok(Evaluation::Rejected {
                reason: RejectReason::NoActivePeriod,
                classification: Classification::None,
                period_id: event.period_id,
            });
        };

        // 2) CHECK_DUPLICATE
        let guard = DuplicateGuard::new(self.store);
        if let Some(existing) = guard.existing_record(&event.subject, &slot)? {
            return Ok(Evaluation::AcceptedDuplicate(existing));
        }

        // 3) CLASSIFY
        let classification = match slot {
            Slot::Period { period, .. } => classify(period, at, &timetable.grace),
            Slot::StaffDay { .. } => classify_staff(&timetable.staff, at, &timetable.grace),
        };

        // 4) DECIDE
        let status = match (event.subject.kind, classification) {
            (_, Classification::Present) => AttendanceStatus::Present,
            (SubjectKind::Student, Classification::HalfPresent) => AttendanceStatus::HalfPresent,
            (SubjectKind::Staff, Classification::Late) => AttendanceStatus::Late,
            _ => {
                return Ok(Evaluation::Rejected {
                    reason: RejectReason::WindowClosed,
                    classification,
                    period_id: slot.period_id(),
                });
            }
        };

        let record = AttendanceRecord::new(
            event.subject.clone(),
            event.detected_at,
            status,
            slot.period_id(),
            event.source_label(),
        );

        match self.store.insert_record(&record)? {
            InsertOutcome::Inserted(id) => {
                let record = AttendanceRecord { id, ..record };
                self.audit_new(&record);
                Ok(Evaluation::AcceptedNew(record))
            }
            // A concurrent evaluation for the same slot won the insert.
            InsertOutcome::Conflict => match guard.existing_record(&event.subject, &slot)? {
                Some(existing) => Ok(Evaluation::AcceptedDuplicate(existing)),
                None => Err(AppError::PersistenceUnavailable(format!(
                    "conflicting record for {} is not visible yet",
                    event.subject
                ))),
            },
        }
    }

    fn audit_new(&self, record: &AttendanceRecord) {
        let slot = record
            .period_id
            .map(|p| format!("P{}", p))
            .unwrap_or_else(|| "staff".to_string());

        if let Err(e) = self.store.audit(
            "attendance",
            &record.subject.to_string(),
            &format!(
                "{} {} at {} via {}",
                record.status,
                slot,
                record.local_at().format("%Y-%m-%d %H:%M:%S"),
                record.source
            ),
        ) {
            warning(format!("Failed to write internal log: {}", e));
        }
    }
}

fn resolve_slot<'t>(
    timetable: &'t TimetableConfig,
    event: &DetectionEvent,
    at: NaiveDateTime,
) -> Option<Slot<'t>> {
    match event.subject.kind {
        SubjectKind::Student => {
            let period = resolve_with_hint(timetable, at, event.period_id)?;
            Some(Slot::Period {
                period,
                window: period.window_on(at.date()),
            })
        }
        SubjectKind::Staff => {
            if timetable.is_holiday(at.date()) {
                return None;
            }
            let check_in = timetable.staff.window_on(at.date());
            check_in.contains(at).then_some(Slot::StaffDay { check_in })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::clock::SchoolClock;
    use crate::db::pool::DbPool;
    use crate::models::{Channel, Outcome, PeriodDefinition, SubjectRef};
    use crate::models::{SubjectId, Window};
    use chrono::NaiveTime;
    use std::collections::BTreeSet;

    /// Store that is locked for lookups, inserts, or both.
    struct Locked {
        lookups: bool,
        inserts: bool,
    }

    fn locked() -> AppError {
        AppError::PersistenceUnavailable("database is locked".into())
    }

    impl AttendanceStore for Locked {
        fn find_record(
            &self,
            _subject: &SubjectRef,
            _period_id: Option<u32>,
            _window: &Window,
        ) -> AppResult<Option<AttendanceRecord>> {
            if self.lookups { Err(locked()) } else { Ok(None) }
        }

        fn insert_record(&self, _record: &AttendanceRecord) -> AppResult<InsertOutcome> {
            if self.inserts {
                Err(locked())
            } else {
                Ok(InsertOutcome::Inserted(1))
            }
        }

        fn list_enrolled(&self, _kind: SubjectKind) -> AppResult<BTreeSet<SubjectId>> {
            Ok(BTreeSet::new())
        }

        fn list_records_in_window(
            &self,
            _kind: SubjectKind,
            _period_id: Option<u32>,
            _window: &Window,
        ) -> AppResult<Vec<AttendanceRecord>> {
            Ok(Vec::new())
        }
    }

    fn pool() -> DbPool {
        let pool = DbPool::in_memory().unwrap();
        crate::db::initialize::init_db(&pool.conn).unwrap();
        pool
    }

    fn single_period() -> TimetableConfig {
        TimetableConfig {
            periods: vec![PeriodDefinition::new(
                1,
                NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
                45,
            )],
            weekly_holidays: Default::default(),
            ..TimetableConfig::default()
        }
    }

    fn scan(subject: SubjectRef, at: &str) -> DetectionEvent {
        let clock = SchoolClock::default();
        DetectionEvent::new(subject, clock.parse_instant(at).unwrap(), Channel::Rfid)
    }

    #[test]
    fn present_then_duplicate_never_two_records() {
        let pool = pool();
        let tt = single_period();
        let rec = AttendanceRecorder::new(&pool);

        let first = rec
            .evaluate(&tt, &scan(SubjectRef::student("S"), "2025-09-01 08:03"))
            .unwrap();
        assert_eq!(first.outcome(), Outcome::AcceptedNew);
        assert_eq!(first.status(), Some(AttendanceStatus::Present));
        assert_eq!(first.period_id(), Some(1));

        let again = rec
            .evaluate(&tt, &scan(SubjectRef::student("S"), "2025-09-01 08:03"))
            .unwrap();
        assert_eq!(again.outcome(), Outcome::AcceptedDuplicate);
        assert_eq!(again.status(), Some(AttendanceStatus::Present));

        // Later in the same period: still the original record, not WINDOW_CLOSED
        let late = rec
            .evaluate(&tt, &scan(SubjectRef::student("S"), "2025-09-01 08:30"))
            .unwrap();
        assert_eq!(late.outcome(), Outcome::AcceptedDuplicate);

        let count: i64 = pool
            .conn
            .query_row("SELECT COUNT(*) FROM attendance", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn scenario_from_single_period_timetable() {
        let pool = pool();
        let tt = single_period();
        let rec = AttendanceRecorder::new(&pool);

        let half = rec
            .evaluate(&tt, &scan(SubjectRef::student("S1"), "2025-09-01 08:12"))
            .unwrap();
        assert_eq!(half.outcome(), Outcome::AcceptedNew);
        assert_eq!(half.status(), Some(AttendanceStatus::HalfPresent));
        assert_eq!(half.message(), "Welcome (Half Day)");

        let closed = rec
            .evaluate(&tt, &scan(SubjectRef::student("S2"), "2025-09-01 08:25"))
            .unwrap();
        assert_eq!(closed.reason(), Some(RejectReason::WindowClosed));
        assert_eq!(closed.status(), Some(AttendanceStatus::Late));
        assert_eq!(closed.message(), "Late: Attendance closed");

        let early = rec
            .evaluate(&tt, &scan(SubjectRef::student("S3"), "2025-09-01 07:55"))
            .unwrap();
        assert_eq!(early.reason(), Some(RejectReason::NoActivePeriod));
        assert_eq!(early.message(), "No active class period");
    }

    #[test]
    fn holiday_rejects_every_kind() {
        let pool = pool();
        let tt = TimetableConfig::default();
        let rec = AttendanceRecorder::new(&pool);

        // Friday
        for subject in [SubjectRef::student("S"), SubjectRef::staff("T")] {
            let ev = rec
                .evaluate(&tt, &scan(subject, "2025-09-05 09:02"))
                .unwrap();
            assert_eq!(ev.reason(), Some(RejectReason::NoActivePeriod));
        }
    }

    #[test]
    fn staff_late_is_persisted_once_per_day() {
        let pool = pool();
        let tt = TimetableConfig::default();
        let rec = AttendanceRecorder::new(&pool);

        let late = rec
            .evaluate(&tt, &scan(SubjectRef::staff("T"), "2025-09-01 09:30"))
            .unwrap();
        assert_eq!(late.outcome(), Outcome::AcceptedNew);
        assert_eq!(late.status(), Some(AttendanceStatus::Late));
        assert_eq!(late.period_id(), None);

        let again = rec
            .evaluate(&tt, &scan(SubjectRef::staff("T"), "2025-09-01 09:40"))
            .unwrap();
        assert_eq!(again.outcome(), Outcome::AcceptedDuplicate);
        assert_eq!(again.status(), Some(AttendanceStatus::Late));

        let outside = rec
            .evaluate(&tt, &scan(SubjectRef::staff("U"), "2025-09-01 10:00"))
            .unwrap();
        assert_eq!(outside.reason(), Some(RejectReason::NoActivePeriod));
    }

    #[test]
    fn period_hint_must_match_the_running_period() {
        let pool = pool();
        let tt = TimetableConfig::default();
        let rec = AttendanceRecorder::new(&pool);

        let wrong = scan(SubjectRef::student("S"), "2025-09-01 08:47").with_period(Some(1));
        assert_eq!(
            rec.evaluate(&tt, &wrong).unwrap().reason(),
            Some(RejectReason::NoActivePeriod)
        );

        let right = scan(SubjectRef::student("S"), "2025-09-01 08:47").with_period(Some(2));
        let ev = rec.evaluate(&tt, &right).unwrap();
        assert_eq!(ev.outcome(), Outcome::AcceptedNew);
        assert_eq!(ev.period_id(), Some(2));
    }

    #[test]
    fn storage_failures_are_retryable_errors_not_rejections() {
        let tt = single_period();
        let on_time = scan(SubjectRef::student("S"), "2025-09-01 08:03");
        let too_late = scan(SubjectRef::student("S"), "2025-09-01 08:30");

        let lookup_down = Locked { lookups: true, inserts: false };
        let rec = AttendanceRecorder::new(&lookup_down);
        for event in [&on_time, &too_late] {
            let err = rec.evaluate(&tt, event).unwrap_err();
            assert!(err.is_retryable());
        }

        let insert_down = Locked { lookups: false, inserts: true };
        let err = AttendanceRecorder::new(&insert_down)
            .evaluate(&tt, &on_time)
            .unwrap_err();
        assert!(err.is_retryable());

        // nothing to write, so no storage call fails
        let closed = AttendanceRecorder::new(&insert_down)
            .evaluate(&tt, &too_late)
            .unwrap();
        assert_eq!(closed.reason(), Some(RejectReason::WindowClosed));
    }

    #[test]
    fn timestamp_is_the_detection_instant() {
        let pool = pool();
        let tt = single_period();
        let rec = AttendanceRecorder::new(&pool);
        let event = scan(SubjectRef::student("S"), "2025-09-01T02:34:56Z");

        let Evaluation::AcceptedNew(record) = rec.evaluate(&tt, &event).unwrap() else {
            panic!("expected a new record");
        };
        assert_eq!(record.timestamp, event.detected_at);
        assert_eq!(record.source, "rfid");
        assert!(record.id > 0);
    }
}
