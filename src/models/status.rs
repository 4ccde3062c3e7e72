use crate::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Status persisted on an attendance record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AttendanceStatus {
    Present,
    HalfPresent,
    Late,
    Absent,
}

impl AttendanceStatus {
    pub fn to_db_str(&self) -> &'static str {
        match self {
            AttendanceStatus::Present => "PRESENT",
            AttendanceStatus::HalfPresent => "HALF_PRESENT",
            AttendanceStatus::Late => "LATE",
            AttendanceStatus::Absent => "ABSENT",
        }
    }

    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "PRESENT" => Some(AttendanceStatus::Present),
            "HALF_PRESENT" => Some(AttendanceStatus::HalfPresent),
            "LATE" => Some(AttendanceStatus::Late),
            "ABSENT" => Some(AttendanceStatus::Absent),
            _ => None,
        }
    }

    pub fn parse(s: &str) -> AppResult<Self> {
        Self::from_db_str(&s.to_uppercase()).ok_or_else(|| AppError::InvalidStatus(s.to_string()))
    }

    /// Any status other than ABSENT means the subject was seen.
    pub fn is_attended(&self) -> bool {
        !matches!(self, AttendanceStatus::Absent)
    }
}

impl fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_db_str())
    }
}

/// Raw output of the status classifier for one detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Classification {
    Present,
    HalfPresent,
    Late,
    /// The detection precedes the window start.
    None,
}

impl Classification {
    /// Persistable status, if this classification maps to one.
    pub fn as_status(&self) -> Option<AttendanceStatus> {
        match self {
            Classification::Present => Some(AttendanceStatus::Present),
            Classification::HalfPresent => Some(AttendanceStatus::HalfPresent),
            Classification::Late => Some(AttendanceStatus::Late),
            Classification::None => None,
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_status() {
            Some(s) => s.fmt(f),
            None => f.write_str("NONE"),
        }
    }
}
