//! Absentee sweep: once a period has closed, every enrolled subject without
//! a record for it gets an ABSENT record stamped at the period end.
//!
//! Re-running a sweep finds the ABSENT records it created earlier and adds
//! nothing, so a pass can be abandoned at any point and started again.

use super::store::{AttendanceStore, InsertOutcome};
use crate::errors::{AppError, AppResult};
use crate::models::{
    AttendanceRecord, AttendanceStatus, SubjectId, SubjectKind, SubjectRef, TimetableConfig,
    Window,
};
use crate::ui::messages::warning;
use chrono::{DateTime, Duration, FixedOffset, TimeZone};
use std::collections::{BTreeSet, HashSet};

/// Grace after a window end before it is swept, for clock skew.
pub const SWEEP_BUFFER_MINUTES: i64 = 1;

/// Source label of sweeper-created records.
pub const SWEEP_SOURCE: &str = "sweeper";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// ABSENT records written by this pass.
    pub created: usize,
    /// Subjects whose insert failed; a later pass will retry them.
    pub failed: usize,
    pub periods_swept: Vec<u32>,
    pub staff_swept: bool,
    pub holiday: bool,
}

pub struct AbsenteeSweeper<'a, S: AttendanceStore> {
    store: &'a S,
}

impl<'a, S: AttendanceStore> AbsenteeSweeper<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Sweep every window of `now`'s school day that closed at least
    /// [`SWEEP_BUFFER_MINUTES`] ago.
    pub fn sweep(
        &self,
        timetable: &TimetableConfig,
        now: DateTime<FixedOffset>,
    ) -> AppResult<SweepReport> {
        let local = now.naive_local();
        let today = local.date();
        let buffer = Duration::minutes(SWEEP_BUFFER_MINUTES);
        let mut report = SweepReport::default();

        if timetable.is_holiday(today) {
            report.holiday = true;
            return Ok(report);
        }

        let closed: Vec<_> = timetable
            .periods
            .iter()
            .map(|p| (p.id, p.window_on(today)))
            .filter(|(_, w)| local >= w.end + buffer)
            .collect();

        if !closed.is_empty() {
            let students = self.store.list_enrolled(SubjectKind::Student)?;
            for (id, window) in closed {
                let (created, failed) = self.sweep_slot(
                    SubjectKind::Student,
                    Some(id),
                    &window,
                    &window,
                    &students,
                    now.offset(),
                )?;
                report.created += created;
                report.failed += failed;
                report.periods_swept.push(id);
            }
        }

        let check_in = timetable.staff.window_on(today);
        if local >= check_in.end + buffer {
            let staff = self.store.list_enrolled(SubjectKind::Staff)?;
            let (created, failed) = self.sweep_slot(
                SubjectKind::Staff,
                None,
                &check_in,
                &Window::whole_day(today),
                &staff,
                now.offset(),
            )?;
            report.created += created;
            report.failed += failed;
            report.staff_swept = true;
        }

        Ok(report)
    }

    /// Insert ABSENT for every subject in `enrolled` with no record in
    /// `covered`. Returns (created, failed).
    fn sweep_slot(
        &self,
        kind: SubjectKind,
        period_id: Option<u32>,
        window: &Window,
        covered: &Window,
        enrolled: &BTreeSet<SubjectId>,
        offset: &FixedOffset,
    ) -> AppResult<(usize, usize)> {
        let seen: HashSet<SubjectId> = self
            .store
            .list_records_in_window(kind, period_id, covered)?
            .into_iter()
            .map(|r| r.subject.id)
            .collect();

        let stamp = offset
            .from_local_datetime(&window.end)
            .single()
            .ok_or_else(|| AppError::InvalidTime(window.end.to_string()))?;

        let target = period_id
            .map(|p| format!("P{} {}", p, window.day()))
            .unwrap_or_else(|| format!("staff {}", window.day()));

        let mut created = 0;
        let mut failed = 0;

        for id in enrolled.iter().filter(|id| !seen.contains(*id)) {
            let record = AttendanceRecord::new(
                SubjectRef {
                    kind,
                    id: id.clone(),
                },
                stamp,
                AttendanceStatus::Absent,
                period_id,
                SWEEP_SOURCE,
            );

            match self.store.insert_record(&record) {
                Ok(InsertOutcome::Inserted(_)) => created += 1,
                // Recorded concurrently: already covered.
                Ok(InsertOutcome::Conflict) => {}
                Err(e) => {
                    failed += 1;
                    self.audit("sweep_error", &target, &format!("{}: {}", record.subject, e));
                }
            }
        }

        if created > 0 || failed > 0 {
            self.audit(
                "sweep",
                &target,
                &format!("{} marked absent, {} failed", created, failed),
            );
        }

        Ok((created, failed))
    }

    fn audit(&self, operation: &str, target: &str, message: &str) {
        if let Err(e) = self.store.audit(operation, target, message) {
            warning(format!("Failed to write internal log: {}", e));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::clock::SchoolClock;
    use crate::core::recorder::AttendanceRecorder;
    use crate::db::pool::DbPool;
    use crate::db::queries::enroll_subject;
    use crate::models::{Channel, DetectionEvent, PeriodDefinition};
    use chrono::NaiveTime;
    use std::cell::Cell;

    /// SQLite store whose inserts fail for one subject while `failing` is set.
    struct FailingFor<'p> {
        pool: &'p DbPool,
        subject: &'static str,
        failing: Cell<bool>,
    }

    impl AttendanceStore for FailingFor<'_> {
        fn find_record(
            &self,
            subject: &SubjectRef,
            period_id: Option<u32>,
            window: &Window,
        ) -> AppResult<Option<AttendanceRecord>> {
            self.pool.find_record(subject, period_id, window)
        }

        fn insert_record(&self, record: &AttendanceRecord) -> AppResult<InsertOutcome> {
            if self.failing.get() && record.subject.id.as_str() == self.subject {
                return Err(AppError::PersistenceUnavailable("database is locked".into()));
            }
            self.pool.insert_record(record)
        }

        fn list_enrolled(&self, kind: SubjectKind) -> AppResult<BTreeSet<SubjectId>> {
            self.pool.list_enrolled(kind)
        }

        fn list_records_in_window(
            &self,
            kind: SubjectKind,
            period_id: Option<u32>,
            window: &Window,
        ) -> AppResult<Vec<AttendanceRecord>> {
            self.pool.list_records_in_window(kind, period_id, window)
        }

        fn audit(&self, operation: &str, target: &str, message: &str) -> AppResult<()> {
            self.pool.audit(operation, target, message)
        }
    }

    fn pool_with(students: &[&str], staff: &[&str]) -> DbPool {
        let pool = DbPool::in_memory().unwrap();
        crate::db::initialize::init_db(&pool.conn).unwrap();
        for s in students {
            enroll_subject(&pool.conn, &SubjectRef::student(*s), "").unwrap();
        }
        for s in staff {
            enroll_subject(&pool.conn, &SubjectRef::staff(*s), "").unwrap();
        }
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

    fn at(s: &str) -> DateTime<FixedOffset> {
        SchoolClock::default().parse_instant(s).unwrap()
    }

    #[test]
    fn marks_only_the_missing_student_at_period_end() {
        let pool = pool_with(&["S", "S2"], &[]);
        let tt = single_period();

        let scan = DetectionEvent::new(SubjectRef::student("S"), at("2025-09-01 08:03"), Channel::Rfid);
        AttendanceRecorder::new(&pool).evaluate(&tt, &scan).unwrap();

        let report = AbsenteeSweeper::new(&pool)
            .sweep(&tt, at("2025-09-01 08:46"))
            .unwrap();
        assert_eq!(report.created, 1);
        assert_eq!(report.periods_swept, vec![1]);

        let window = tt.periods[0].window_on(at("2025-09-01 08:00").date_naive());
        let records = pool
            .list_records_in_window(SubjectKind::Student, Some(1), &window)
            .unwrap();
        let absent: Vec<_> = records
            .iter()
            .filter(|r| r.status == AttendanceStatus::Absent)
            .collect();
        assert_eq!(absent.len(), 1);
        assert_eq!(absent[0].subject.id.as_str(), "S2");
        assert_eq!(
            absent[0].local_at().format("%H:%M").to_string(),
            "08:45"
        );
    }

    #[test]
    fn second_sweep_inserts_nothing() {
        let pool = pool_with(&["A", "B", "C"], &[]);
        let tt = single_period();
        let sweeper = AbsenteeSweeper::new(&pool);

        assert_eq!(sweeper.sweep(&tt, at("2025-09-01 09:00")).unwrap().created, 3);
        assert_eq!(sweeper.sweep(&tt, at("2025-09-01 09:00")).unwrap().created, 0);
        assert_eq!(sweeper.sweep(&tt, at("2025-09-01 12:00")).unwrap().created, 0);
    }

    #[test]
    fn open_or_buffered_periods_are_left_alone() {
        let pool = pool_with(&["A"], &[]);
        let tt = single_period();
        let sweeper = AbsenteeSweeper::new(&pool);

        let during = sweeper.sweep(&tt, at("2025-09-01 08:30")).unwrap();
        assert!(during.periods_swept.is_empty());

        let inside_buffer = sweeper.sweep(&tt, at("2025-09-01 08:45:30")).unwrap();
        assert_eq!(inside_buffer.created, 0);
    }

    #[test]
    fn present_and_absent_cover_everyone() {
        let pool = pool_with(&["A", "B", "C", "D"], &[]);
        let tt = single_period();
        let rec = AttendanceRecorder::new(&pool);
        for (s, t) in [("A", "08:01"), ("C", "08:15")] {
            let ev = DetectionEvent::new(
                SubjectRef::student(s),
                at(&format!("2025-09-01 {}", t)),
                Channel::Face,
            );
            rec.evaluate(&tt, &ev).unwrap();
        }

        AbsenteeSweeper::new(&pool)
            .sweep(&tt, at("2025-09-01 10:00"))
            .unwrap();

        let window = tt.periods[0].window_on(at("2025-09-01 08:00").date_naive());
        let records = pool
            .list_records_in_window(SubjectKind::Student, Some(1), &window)
            .unwrap();
        let covered: BTreeSet<_> = records.iter().map(|r| r.subject.id.clone()).collect();
        assert_eq!(covered, pool.list_enrolled(SubjectKind::Student).unwrap());
        assert_eq!(records.len(), 4);
    }

    #[test]
    fn one_failing_subject_does_not_stop_the_others() {
        let pool = pool_with(&["A", "B", "C"], &[]);
        let tt = single_period();
        let store = FailingFor {
            pool: &pool,
            subject: "B",
            failing: Cell::new(true),
        };
        let sweeper = AbsenteeSweeper::new(&store);

        let first = sweeper.sweep(&tt, at("2025-09-01 09:00")).unwrap();
        assert_eq!(first.created, 2);
        assert_eq!(first.failed, 1);

        let errors: i64 = pool
            .conn
            .query_row(
                "SELECT COUNT(*) FROM log WHERE operation = 'sweep_error'",
                [],
                |r| r.get(0),
            )
            .unwrap();
        assert_eq!(errors, 1);

        // storage recovered: the next pass fills only the gap
        store.failing.set(false);
        let second = sweeper.sweep(&tt, at("2025-09-01 09:01")).unwrap();
        assert_eq!(second.created, 1);
        assert_eq!(second.failed, 0);

        let window = tt.periods[0].window_on(at("2025-09-01 08:00").date_naive());
        let covered: BTreeSet<_> = pool
            .list_records_in_window(SubjectKind::Student, Some(1), &window)
            .unwrap()
            .into_iter()
            .map(|r| r.subject.id)
            .collect();
        assert_eq!(covered, pool.list_enrolled(SubjectKind::Student).unwrap());
    }

    #[test]
    fn holidays_are_not_swept() {
        let pool = pool_with(&["A"], &["T"]);
        let tt = TimetableConfig::default();
        let report = AbsenteeSweeper::new(&pool)
            .sweep(&tt, at("2025-09-05 18:00"))
            .unwrap();
        assert!(report.holiday);
        assert_eq!(report.created, 0);
    }

    #[test]
    fn staff_without_check_in_are_marked_absent() {
        let pool = pool_with(&[], &["T1", "T2"]);
        let tt = TimetableConfig::default();

        let ev = DetectionEvent::new(SubjectRef::staff("T1"), at("2025-09-01 09:02"), Channel::Face);
        AttendanceRecorder::new(&pool).evaluate(&tt, &ev).unwrap();

        let report = AbsenteeSweeper::new(&pool)
            .sweep(&tt, at("2025-09-01 10:05"))
            .unwrap();
        assert!(report.staff_swept);
        assert_eq!(report.created, 1);
    }
}
