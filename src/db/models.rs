//! Database row models that have no engine counterpart.

use crate::models::SubjectRef;
use serde::Serialize;

/// One row of the `subjects` registry.
#[derive(Debug, Clone, Serialize)]
pub struct EnrolledSubject {
    pub subject: SubjectRef,
    pub name: String,
    pub enrolled_at: String,
}
