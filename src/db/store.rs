//! SQLite implementation of the engine's storage seams.

use crate::core::store::{AttendanceStore, InsertOutcome, TimetableSource};
use crate::db::log::ttlog;
use crate::db::pool::DbPool;
use crate::db::{queries, settings};
use crate::errors::AppResult;
use crate::models::{AttendanceRecord, SubjectId, SubjectKind, SubjectRef, TimetableConfig, Window};
use std::collections::BTreeSet;

impl AttendanceStore for DbPool {
    fn find_record(
        &self,
        subject: &SubjectRef,
        period_id: Option<u32>,
        window: &Window,
    ) -> AppResult<Option<AttendanceRecord>> {
        queries::find_record(&self.conn, subject, period_id, window)
    }

    fn insert_record(&self, record: &AttendanceRecord) -> AppResult<InsertOutcome> {
        queries::insert_record(&self.conn, record)
    }

    fn list_enrolled(&self, kind: SubjectKind) -> AppResult<BTreeSet<SubjectId>> {
        queries::enrolled_ids(&self.conn, kind)
    }

    fn list_records_in_window(
        &self,
        kind: SubjectKind,
        period_id: Option<u32>,
        window: &Window,
    ) -> AppResult<Vec<AttendanceRecord>> {
        queries::list_records_in_window(&self.conn, kind, period_id, window)
    }

    fn audit(&self, operation: &str, target: &str, message: &str) -> AppResult<()> {
        ttlog(&self.conn, operation, target, message)
    }
}

impl TimetableSource for DbPool {
    fn fetch_timetable(&self) -> AppResult<Option<TimetableConfig>> {
        settings::load_timetable(&self.conn)
    }
}
