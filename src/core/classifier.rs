//! Status classification against grace thresholds.
//!
//! Every threshold is inclusive on the earlier side: a detection exactly at
//! `start + full` is still PRESENT, exactly at `start + half` still
//! HALF_PRESENT.

use crate::models::{Classification, GraceConfig, PeriodDefinition, StaffWindow};
use chrono::{Duration, NaiveDateTime, NaiveTime};

fn classify_from(start: NaiveTime, at: NaiveDateTime, grace: &GraceConfig) -> Classification {
    let start = at.date().and_time(start);
    let full = start + Duration::minutes(i64::from(grace.full_present_minutes));
    let half = start + Duration::minutes(i64::from(grace.half_present_minutes));

    if at < start {
        Classification::None
    } else if at <= full {
        Classification::Present
    } else if at <= half {
        Classification::HalfPresent
    } else {
        Classification::Late
    }
}

/// Classify a student detection inside `period`.
pub fn classify(period: &PeriodDefinition, at: NaiveDateTime, grace: &GraceConfig) -> Classification {
    classify_from(period.start_time, at, grace)
}

/// Staff have no half-day status: anything past the full-present mark is LATE.
pub fn classify_staff(window: &StaffWindow, at: NaiveDateTime, grace: &GraceConfig) -> Classification {
    match classify_from(window.start_time, at, grace) {
        Classification::HalfPresent => Classification::Late,
        other => other,
    }
}
