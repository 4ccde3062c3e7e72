use crate::core::store::InsertOutcome;
use crate::db::models::EnrolledSubject;
use crate::errors::{AppError, AppResult};
use crate::models::{
    AttendanceRecord, AttendanceStatus, SubjectId, SubjectKind, SubjectRef, Window,
};
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};
use rusqlite::{Connection, OptionalExtension, Result, Row, params};
use std::collections::BTreeSet;

const LOCAL_FMT: &str = "%Y-%m-%d %H:%M:%S";
const DAY_FMT: &str = "%Y-%m-%d";

const RECORD_COLUMNS: &str =
    "id, subject_kind, subject_id, timestamp, status, period_id, source";

fn conversion_error(col: usize, err: AppError) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(col, rusqlite::types::Type::Text, Box::new(err))
}

fn fmt_local(at: &NaiveDateTime) -> String {
    at.format(LOCAL_FMT).to_string()
}

pub fn map_record(row: &Row) -> Result<AttendanceRecord> {
    let kind_str: String = row.get("subject_kind")?;
    let kind = SubjectKind::from_db_str(&kind_str)
        .ok_or_else(|| conversion_error(1, AppError::InvalidSubjectKind(kind_str.clone())))?;

    let ts_str: String = row.get("timestamp")?;
    let timestamp = DateTime::parse_from_rfc3339(&ts_str)
        .map_err(|_| conversion_error(3, AppError::InvalidDate(ts_str.clone())))?;

    let status_str: String = row.get("status")?;
    let status = AttendanceStatus::from_db_str(&status_str)
        .ok_or_else(|| conversion_error(4, AppError::InvalidStatus(status_str.clone())))?;

    Ok(AttendanceRecord {
        id: row.get("id")?,
        subject: SubjectRef {
            kind,
            id: SubjectId::new(row.get::<_, String>("subject_id")?),
        },
        timestamp,
        status,
        period_id: row.get("period_id")?,
        source: row.get("source")?,
    })
}

/// Insert unless a record for the same subject, slot and day exists.
///
/// The unique slot index decides atomically; losing the race is reported
/// as `Conflict`, never as an error.
pub fn insert_record(conn: &Connection, rec: &AttendanceRecord) -> AppResult<InsertOutcome> {
    let local = rec.local_at();

    let changed = conn.execute(
        "INSERT INTO attendance
            (subject_kind, subject_id, day, local_at, timestamp, status, period_id, source, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
         ON CONFLICT DO NOTHING",
        params![
            rec.subject.kind.to_db_str(),
            rec.subject.id.as_str(),
            local.date().format(DAY_FMT).to_string(),
            fmt_local(&local),
            rec.timestamp.to_rfc3339(),
            rec.status.to_db_str(),
            rec.period_id,
            rec.source,
            Local::now().to_rfc3339(),
        ],
    )?;

    if changed == 0 {
        Ok(InsertOutcome::Conflict)
    } else {
        Ok(InsertOutcome::Inserted(conn.last_insert_rowid()))
    }
}

/// First record of `subject` in `window` tagged with `period_id`.
/// The window end is inclusive.
pub fn find_record(
    conn: &Connection,
    subject: &SubjectRef,
    period_id: Option<u32>,
    window: &Window,
) -> AppResult<Option<AttendanceRecord>> {
    let sql = format!(
        "SELECT {RECORD_COLUMNS} FROM attendance
         WHERE subject_kind = ?1 AND subject_id = ?2
           AND day = ?3 AND period_id IS ?4
           AND local_at >= ?5 AND local_at <= ?6
         ORDER BY local_at ASC, id ASC
         LIMIT 1"
    );
    let mut stmt = conn.prepare_cached(&sql)?;

    let rec = stmt
        .query_row(
            params![
                subject.kind.to_db_str(),
                subject.id.as_str(),
                window.day().format(DAY_FMT).to_string(),
                period_id,
                fmt_local(&window.start),
                fmt_local(&window.end),
            ],
            map_record,
        )
        .optional()?;

    Ok(rec)
}

/// Every record of `kind` in `window` tagged with `period_id`.
pub fn list_records_in_window(
    conn: &Connection,
    kind: SubjectKind,
    period_id: Option<u32>,
    window: &Window,
) -> AppResult<Vec<AttendanceRecord>> {
    let sql = format!(
        "SELECT {RECORD_COLUMNS} FROM attendance
         WHERE subject_kind = ?1
           AND day = ?2 AND period_id IS ?3
           AND local_at >= ?4 AND local_at <= ?5
         ORDER BY local_at ASC, id ASC"
    );
    let mut stmt = conn.prepare_cached(&sql)?;

    let rows = stmt.query_map(
        params![
            kind.to_db_str(),
            window.day().format(DAY_FMT).to_string(),
            period_id,
            fmt_local(&window.start),
            fmt_local(&window.end),
        ],
        map_record,
    )?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

/// Records between two school days (inclusive), optionally of one kind,
/// oldest first. `None` bounds select everything.
pub fn list_records(
    conn: &Connection,
    bounds: Option<(NaiveDate, NaiveDate)>,
    kind: Option<SubjectKind>,
) -> AppResult<Vec<AttendanceRecord>> {
    let sql = format!(
        "SELECT {RECORD_COLUMNS} FROM attendance
         WHERE (?1 IS NULL OR day >= ?1)
           AND (?2 IS NULL OR day <= ?2)
           AND (?3 IS NULL OR subject_kind = ?3)
         ORDER BY local_at ASC, subject_kind ASC, period_id ASC, id ASC"
    );
    let mut stmt = conn.prepare_cached(&sql)?;

    let rows = stmt.query_map(
        params![
            bounds.map(|(from, _)| from.format(DAY_FMT).to_string()),
            bounds.map(|(_, to)| to.format(DAY_FMT).to_string()),
            kind.map(|k| k.to_db_str()),
        ],
        map_record,
    )?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

/// Add `subject` to the registry. Returns false when already enrolled.
pub fn enroll_subject(conn: &Connection, subject: &SubjectRef, name: &str) -> AppResult<bool> {
    let changed = conn.execute(
        "INSERT INTO subjects (kind, subject_id, name, enrolled_at)
         VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(kind, subject_id) DO NOTHING",
        params![
            subject.kind.to_db_str(),
            subject.id.as_str(),
            name,
            Local::now().to_rfc3339(),
        ],
    )?;
    Ok(changed > 0)
}

/// Remove `subject` from the registry. Its attendance history is kept.
pub fn unenroll_subject(conn: &Connection, subject: &SubjectRef) -> AppResult<()> {
    let changed = conn.execute(
        "DELETE FROM subjects WHERE kind = ?1 AND subject_id = ?2",
        params![subject.kind.to_db_str(), subject.id.as_str()],
    )?;

    if changed == 0 {
        return Err(AppError::NotEnrolled(subject.to_string()));
    }
    Ok(())
}

pub fn is_enrolled(conn: &Connection, subject: &SubjectRef) -> AppResult<bool> {
    let found = conn
        .query_row(
            "SELECT 1 FROM subjects WHERE kind = ?1 AND subject_id = ?2",
            params![subject.kind.to_db_str(), subject.id.as_str()],
            |_| Ok(()),
        )
        .optional()?;
    Ok(found.is_some())
}

pub fn enrolled_ids(conn: &Connection, kind: SubjectKind) -> AppResult<BTreeSet<SubjectId>> {
    let mut stmt = conn.prepare_cached("SELECT subject_id FROM subjects WHERE kind = ?1")?;
    let rows = stmt.query_map([kind.to_db_str()], |row| row.get::<_, String>(0))?;

    let mut out = BTreeSet::new();
    for r in rows {
        out.insert(SubjectId::new(r?));
    }
    Ok(out)
}

pub fn list_subjects(
    conn: &Connection,
    kind: Option<SubjectKind>,
) -> AppResult<Vec<EnrolledSubject>> {
    let mut stmt = conn.prepare(
        "SELECT kind, subject_id, name, enrolled_at FROM subjects
         WHERE (?1 IS NULL OR kind = ?1)
         ORDER BY kind ASC, subject_id ASC",
    )?;

    let rows = stmt.query_map([kind.map(|k| k.to_db_str())], |row| {
        let kind_str: String = row.get(0)?;
        let kind = SubjectKind::from_db_str(&kind_str)
            .ok_or_else(|| conversion_error(0, AppError::InvalidSubjectKind(kind_str.clone())))?;
        Ok(EnrolledSubject {
            subject: SubjectRef {
                kind,
                id: SubjectId::new(row.get::<_, String>(1)?),
            },
            name: row.get(2)?,
            enrolled_at: row.get(3)?,
        })
    })?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}
