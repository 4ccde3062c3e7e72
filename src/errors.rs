//! Unified application error type.
//! Every layer (db, core, cli, utils) returns AppError so that callers can
//! tell a retryable storage failure apart from a configuration mistake.

use rusqlite::ErrorCode;
use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    // ---------------------------
    // IO
    // ---------------------------
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    // ---------------------------
    // Database-related
    // ---------------------------
    #[error("Database error: {0}")]
    Db(#[source] rusqlite::Error),

    #[error("Database migration error: {0}")]
    Migration(String),

    /// Storage is busy, locked or timed out. The caller may retry.
    #[error("Persistence unavailable: {0}")]
    PersistenceUnavailable(String),

    // ---------------------------
    // Parsing errors
    // ---------------------------
    #[error("Invalid date format: {0}")]
    InvalidDate(String),

    #[error("Invalid time format: {0}")]
    InvalidTime(String),

    #[error("Invalid subject kind: {0}")]
    InvalidSubjectKind(String),

    #[error("Invalid attendance status: {0}")]
    InvalidStatus(String),

    #[error("Invalid period: {0}")]
    InvalidPeriod(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // ---------------------------
    // Config errors
    // ---------------------------
    /// Malformed timetable or application configuration. Never retried.
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Failed to load configuration")]
    ConfigLoad,

    #[error("Failed to save configuration")]
    ConfigSave,

    // ---------------------------
    // Registry errors
    // ---------------------------
    #[error("Subject not enrolled: {0}")]
    NotEnrolled(String),

    // ---------------------------
    // Export errors
    // ---------------------------
    #[error("Export error: {0}")]
    Export(String),

    // ---------------------------
    // Generic fallback
    // ---------------------------
    #[error("Internal error: {0}")]
    Other(String),
}

impl From<rusqlite::Error> for AppError {
    fn from(e: rusqlite::Error) -> Self {
        match e.sqlite_error_code() {
            Some(ErrorCode::DatabaseBusy) | Some(ErrorCode::DatabaseLocked) => {
                AppError::PersistenceUnavailable(e.to_string())
            }
            _ => AppError::Db(e),
        }
    }
}

impl AppError {
    /// True when the same call may succeed if repeated later.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AppError::PersistenceUnavailable(_))
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, AppError::Configuration(_))
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn busy_database_maps_to_retryable_error() {
        let busy = rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_BUSY),
            Some("database is locked".into()),
        );
        let err = AppError::from(busy);
        assert!(err.is_retryable());

        let other = AppError::from(rusqlite::Error::QueryReturnedNoRows);
        assert!(!other.is_retryable());
        assert!(matches!(other, AppError::Db(_)));
    }
}
