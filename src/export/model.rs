use crate::models::AttendanceRecord;
use serde::Serialize;

/// Flat attendance row for CSV / JSON export.
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct RecordExport {
    pub id: i64,
    pub kind: String,
    pub subject_id: String,
    pub day: String,
    pub time: String,
    pub status: String,
    /// Empty for staff records.
    pub period: String,
    pub source: String,
    pub timestamp: String,
}

impl From<&AttendanceRecord> for RecordExport {
    fn from(r: &AttendanceRecord) -> Self {
        let local = r.local_at();
        Self {
            id: r.id,
            kind: r.subject.kind.to_db_str().to_string(),
            subject_id: r.subject.id.to_string(),
            day: local.format("%Y-%m-%d").to_string(),
            time: local.format("%H:%M:%S").to_string(),
            status: r.status.to_db_str().to_string(),
            period: r.period_id.map(|p| format!("P{}", p)).unwrap_or_default(),
            source: r.source.clone(),
            timestamp: r.timestamp.to_rfc3339(),
        }
    }
}
