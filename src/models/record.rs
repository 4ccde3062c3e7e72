use super::status::AttendanceStatus;
use super::subject::SubjectRef;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttendanceRecord {
    pub id: i64,                          // ⇔ attendance.id (0 until stored)
    pub subject: SubjectRef,              // ⇔ attendance.subject_kind + subject_id
    pub timestamp: DateTime<FixedOffset>, // ⇔ attendance.timestamp (RFC 3339)
    pub status: AttendanceStatus,         // ⇔ attendance.status
    pub period_id: Option<u32>,           // ⇔ attendance.period_id (NULL for staff)
    pub source: String,                   // ⇔ attendance.source
}

impl AttendanceRecord {
    pub fn new(
        subject: SubjectRef,
        timestamp: DateTime<FixedOffset>,
        status: AttendanceStatus,
        period_id: Option<u32>,
        source: impl Into<String>,
    ) -> Self {
        Self {
            id: 0,
            subject,
            timestamp,
            status,
            period_id,
            source: source.into(),
        }
    }

    /// School wall-clock time of the record.
    pub fn local_at(&self) -> NaiveDateTime {
        self.timestamp.naive_local()
    }

    pub fn day(&self) -> NaiveDate {
        self.local_at().date()
    }
}
