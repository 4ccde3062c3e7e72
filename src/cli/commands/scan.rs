use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::provider::TimetableProvider;
use crate::core::recorder::AttendanceRecorder;
use crate::db::queries::is_enrolled;
use crate::errors::AppResult;
use crate::models::{DetectionEvent, RecognitionResult, SubjectId, SubjectKind, SubjectRef};
use crate::ui::messages::{verdict, warning};

use super::{instant_or_now, open_pool};

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Scan {
        id,
        kind,
        at,
        channel,
        period,
    } = cmd
    {
        let clock = cfg.clock()?;
        let detected_at = instant_or_now(&clock, at.as_deref())?;
        let pool = open_pool(cfg)?;

        let recognition = match id.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => {
                let candidate = SubjectRef {
                    kind: *kind,
                    id: SubjectId::new(raw),
                };
                if is_enrolled(&pool.conn, &candidate)? {
                    match kind {
                        SubjectKind::Student => RecognitionResult::Student(candidate.id),
                        SubjectKind::Staff => RecognitionResult::Staff(candidate.id),
                    }
                } else {
                    RecognitionResult::Unknown
                }
            }
            _ => RecognitionResult::Unknown,
        };

        let Some(subject) = recognition.subject() else {
            warning("Not Recognized");
            return Ok(());
        };

        let provider = TimetableProvider::new(&pool, cfg.settings_refresh());
        let timetable = provider.snapshot();

        let event = DetectionEvent::new(subject, detected_at, *channel)
            .with_period(*period)
            .with_device(&cfg.device_label);

        let evaluation = AttendanceRecorder::new(&pool).evaluate(&timetable, &event)?;
        verdict(&evaluation);
    }

    Ok(())
}
