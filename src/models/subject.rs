use crate::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Who was detected: a student (per-period attendance) or a staff member
/// (single daily check-in window).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[derive(clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SubjectKind {
    Student,
    Staff,
}

impl SubjectKind {
    /// Convert enum → DB string
    pub fn to_db_str(&self) -> &'static str {
        match self {
            SubjectKind::Student => "student",
            SubjectKind::Staff => "staff",
        }
    }

    /// Convert DB string → enum
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "student" => Some(SubjectKind::Student),
            "staff" => Some(SubjectKind::Staff),
            _ => None,
        }
    }

    /// Helper: convert CLI input (any case)
    pub fn parse(s: &str) -> AppResult<Self> {
        Self::from_db_str(&s.to_lowercase())
            .ok_or_else(|| AppError::InvalidSubjectKind(s.to_string()))
    }
}

impl fmt::Display for SubjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_db_str())
    }
}

/// Opaque identity handed over by the scan or recognition layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubjectId(String);

impl SubjectId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SubjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SubjectId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// A subject identity together with its kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubjectRef {
    pub kind: SubjectKind,
    pub id: SubjectId,
}

impl SubjectRef {
    pub fn student(id: impl Into<String>) -> Self {
        Self {
            kind: SubjectKind::Student,
            id: SubjectId::new(id),
        }
    }

    pub fn staff(id: impl Into<String>) -> Self {
        Self {
            kind: SubjectKind::Staff,
            id: SubjectId::new(id),
        }
    }
}

impl fmt::Display for SubjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}

/// Result of a face match or badge lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognitionResult {
    Student(SubjectId),
    Staff(SubjectId),
    Unknown,
}

impl RecognitionResult {
    /// The recognised subject, or `None` when nobody matched.
    pub fn subject(self) -> Option<SubjectRef> {
        match self {
            RecognitionResult::Student(id) => Some(SubjectRef {
                kind: SubjectKind::Student,
                id,
            }),
            RecognitionResult::Staff(id) => Some(SubjectRef {
                kind: SubjectKind::Staff,
                id,
            }),
            RecognitionResult::Unknown => None,
        }
    }
}
