use crate::db::pool::DbPool;
use crate::db::queries::list_records;
use crate::errors::{AppError, AppResult};
use crate::export::ExportFormat;
use crate::export::fs_utils::ensure_writable;
use crate::export::json_csv::{export_csv, export_json};
use crate::export::model::RecordExport;
use crate::models::SubjectKind;
use crate::ui::messages::warning;
use crate::utils::date::parse_date;
use chrono::NaiveDate;
use std::path::Path;

pub struct ExportLogic;

impl ExportLogic {
    /// Export attendance records.
    ///
    /// `range` is `None`, `"all"`, a single day `YYYY-MM-DD` or an inclusive
    /// span `YYYY-MM-DD:YYYY-MM-DD`. Returns the number of rows written.
    pub fn export(
        pool: &DbPool,
        format: ExportFormat,
        file: &str,
        range: Option<&str>,
        kind: Option<SubjectKind>,
        force: bool,
    ) -> AppResult<usize> {
        let path = Path::new(file);

        if !path.is_absolute() {
            return Err(AppError::Export(format!(
                "output file path must be absolute: {file}"
            )));
        }

        let bounds = match range {
            None => None,
            Some(r) if r.eq_ignore_ascii_case("all") => None,
            Some(r) => Some(parse_range(r)?),
        };

        let rows: Vec<RecordExport> = list_records(&pool.conn, bounds, kind)?
            .iter()
            .map(RecordExport::from)
            .collect();

        if rows.is_empty() {
            warning("No attendance records found for selected range.");
            return Ok(0);
        }

        ensure_writable(path, force)?;

        match format {
            ExportFormat::Csv => export_csv(&rows, path)?,
            ExportFormat::Json => export_json(&rows, path)?,
        }

        Ok(rows.len())
    }
}

/// `YYYY-MM-DD` or `YYYY-MM-DD:YYYY-MM-DD`.
pub fn parse_range(s: &str) -> AppResult<(NaiveDate, NaiveDate)> {
    let day = |p: &str| parse_date(p).ok_or_else(|| AppError::InvalidDate(p.to_string()));

    let (from, to) = match s.split_once(':') {
        Some((a, b)) => (day(a)?, day(b)?),
        None => {
            let d = day(s)?;
            (d, d)
        }
    };

    if to < from {
        return Err(AppError::InvalidDate(format!("range ends before it starts: {s}")));
    }
    Ok((from, to))
}
