//! The timetable document, stored as JSON in the single-row `settings` table.

use crate::errors::{AppError, AppResult};
use crate::models::TimetableConfig;
use chrono::Local;
use rusqlite::{Connection, OptionalExtension, params};

/// Raw stored document, if any.
pub fn load_raw(conn: &Connection) -> AppResult<Option<String>> {
    let raw = conn
        .query_row("SELECT timetable FROM settings WHERE id = 1", [], |row| {
            row.get::<_, String>(0)
        })
        .optional()?;
    Ok(raw)
}

/// The stored timetable. A document that does not parse or validate is a
/// configuration error.
pub fn load_timetable(conn: &Connection) -> AppResult<Option<TimetableConfig>> {
    let Some(raw) = load_raw(conn)? else {
        return Ok(None);
    };

    let cfg: TimetableConfig = serde_json::from_str(&raw)
        .map_err(|e| AppError::Configuration(format!("stored timetable is not valid JSON: {}", e)))?;
    cfg.validate()?;
    Ok(Some(cfg))
}

/// Validate and store `cfg`, replacing any previous document.
pub fn save_timetable(conn: &Connection, cfg: &TimetableConfig) -> AppResult<()> {
    cfg.validate()?;
    let json = serde_json::to_string(cfg)?;

    conn.execute(
        "INSERT INTO settings (id, timetable, updated_at) VALUES (1, ?1, ?2)
         ON CONFLICT(id) DO UPDATE SET timetable = excluded.timetable,
                                       updated_at = excluded.updated_at",
        params![json, Local::now().to_rfc3339()],
    )?;
    Ok(())
}

/// Drop the stored document so the built-in default applies again.
pub fn clear_timetable(conn: &Connection) -> AppResult<()> {
    conn.execute("DELETE FROM settings WHERE id = 1", [])?;
    Ok(())
}
