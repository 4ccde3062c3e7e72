//! Domain types shared by the attendance engine, the database layer and the CLI.

pub mod detection;
pub mod evaluation;
pub mod period;
pub mod record;
pub mod status;
pub mod subject;
pub mod timetable;

pub use detection::{Channel, DetectionEvent};
pub use evaluation::{Evaluation, Outcome, RejectReason};
pub use period::{PeriodDefinition, Window};
pub use record::AttendanceRecord;
pub use status::{AttendanceStatus, Classification};
pub use subject::{RecognitionResult, SubjectId, SubjectKind, SubjectRef};
pub use timetable::{GraceConfig, StaffWindow, TimetableConfig};
