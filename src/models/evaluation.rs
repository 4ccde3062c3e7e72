use super::record::AttendanceRecord;
use super::status::{AttendanceStatus, Classification};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Outcome {
    AcceptedNew,
    AcceptedDuplicate,
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RejectReason {
    /// Holiday, before the first period, in a gap or after the last one.
    NoActivePeriod,
    /// A period is running but the detection is past the grace thresholds.
    WindowClosed,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::NoActivePeriod => f.write_str("NO_ACTIVE_PERIOD"),
            RejectReason::WindowClosed => f.write_str("WINDOW_CLOSED"),
        }
    }
}

/// Result of one `AttendanceRecorder::evaluate` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Evaluation {
    /// A new record was written.
    AcceptedNew(AttendanceRecord),
    /// The subject already had a record in this window; nothing was written.
    AcceptedDuplicate(AttendanceRecord),
    Rejected {
        reason: RejectReason,
        classification: Classification,
        period_id: Option<u32>,
    },
}

impl Evaluation {
    pub fn outcome(&self) -> Outcome {
        match self {
            Evaluation::AcceptedNew(_) => Outcome::AcceptedNew,
            Evaluation::AcceptedDuplicate(_) => Outcome::AcceptedDuplicate,
            Evaluation::Rejected { .. } => Outcome::Rejected,
        }
    }

    pub fn status(&self) -> Option<AttendanceStatus> {
        match self {
            Evaluation::AcceptedNew(r) | Evaluation::AcceptedDuplicate(r) => Some(r.status),
            Evaluation::Rejected { classification, .. } => classification.as_status(),
        }
    }

    pub fn reason(&self) -> Option<RejectReason> {
        match self {
            Evaluation::Rejected { reason, .. } => Some(*reason),
            _ => None,
        }
    }

    pub fn period_id(&self) -> Option<u32> {
        match self {
            Evaluation::AcceptedNew(r) | Evaluation::AcceptedDuplicate(r) => r.period_id,
            Evaluation::Rejected { period_id, .. } => *period_id,
        }
    }

    pub fn is_accepted(&self) -> bool {
        !matches!(self, Evaluation::Rejected { .. })
    }

    /// Short user-facing message for scanners and displays.
    pub fn message(&self) -> String {
        match self {
            Evaluation::AcceptedNew(r) => match r.status {
                AttendanceStatus::HalfPresent => "Welcome (Half Day)".to_string(),
                AttendanceStatus::Late => format!("Welcome {} (Late)", r.subject.id),
                _ => format!("Welcome {}", r.subject.id),
            },
            Evaluation::AcceptedDuplicate(r) => format!("Already marked ({})", r.status),
            Evaluation::Rejected {
                reason: RejectReason::NoActivePeriod,
                ..
            } => "No active class period".to_string(),
            Evaluation::Rejected {
                reason: RejectReason::WindowClosed,
                ..
            } => "Late: Attendance closed".to_string(),
        }
    }
}
