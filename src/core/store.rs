//! Seams between the engine and its collaborators.

use crate::errors::AppResult;
use crate::models::{AttendanceRecord, SubjectId, SubjectKind, SubjectRef, TimetableConfig, Window};
use std::collections::BTreeSet;

/// Result of a conditional insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted(i64),
    /// A record for the same subject, slot and day already exists.
    Conflict,
}

/// Persistence collaborator used by the recorder and the sweeper.
///
/// `insert_record` must be atomic with respect to the
/// (subject, period, day) uniqueness key: of two racing inserts exactly one
/// reports `Inserted`.
pub trait AttendanceStore {
    /// First record of `subject` tagged with `period_id` inside `window`.
    ///
    /// The window end is matched inclusively: the sweeper stamps ABSENT
    /// records at the period end.
    fn find_record(
        &self,
        subject: &SubjectRef,
        period_id: Option<u32>,
        window: &Window,
    ) -> AppResult<Option<AttendanceRecord>>;

    fn insert_record(&self, record: &AttendanceRecord) -> AppResult<InsertOutcome>;

    fn list_enrolled(&self, kind: SubjectKind) -> AppResult<BTreeSet<SubjectId>>;

    /// Every record of `kind` tagged with `period_id` inside `window`,
    /// whatever its status. Same end-bound rule as `find_record`.
    fn list_records_in_window(
        &self,
        kind: SubjectKind,
        period_id: Option<u32>,
        window: &Window,
    ) -> AppResult<Vec<AttendanceRecord>>;

    /// Append a line to the operational log. Stores without one ignore it.
    fn audit(&self, _operation: &str, _target: &str, _message: &str) -> AppResult<()> {
        Ok(())
    }
}

/// Configuration store holding the timetable document.
pub trait TimetableSource {
    /// `Ok(None)` when no timetable was ever saved.
    fn fetch_timetable(&self) -> AppResult<Option<TimetableConfig>>;
}

impl<T: TimetableSource + ?Sized> TimetableSource for &T {
    fn fetch_timetable(&self) -> AppResult<Option<TimetableConfig>> {
        (**self).fetch_timetable()
    }
}
