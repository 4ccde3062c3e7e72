pub mod config;
pub mod db;
pub mod enroll;
pub mod export;
pub mod init;
pub mod list;
pub mod log;
pub mod scan;
pub mod settings;
pub mod stats;
pub mod status;
pub mod sweep;

use crate::config::Config;
use crate::core::clock::SchoolClock;
use crate::db::initialize::init_db;
use crate::db::pool::DbPool;
use crate::errors::{AppError, AppResult};
use crate::utils::date::parse_date;
use chrono::{DateTime, FixedOffset, NaiveDate};

/// Open the configured database and bring its schema up to date.
pub(crate) fn open_pool(cfg: &Config) -> AppResult<DbPool> {
    let pool = DbPool::with_timeout(&cfg.database, cfg.busy_timeout_ms)?;
    init_db(&pool.conn)?;
    Ok(pool)
}

/// `--at` value in school time, or the current instant.
pub(crate) fn instant_or_now(
    clock: &SchoolClock,
    at: Option<&str>,
) -> AppResult<DateTime<FixedOffset>> {
    match at {
        Some(s) => clock.parse_instant(s),
        None => Ok(clock.now()),
    }
}

/// `--date` value, or today in school time.
pub(crate) fn date_or_today(clock: &SchoolClock, date: Option<&str>) -> AppResult<NaiveDate> {
    match date {
        Some(s) => parse_date(s).ok_or_else(|| AppError::InvalidDate(s.to_string())),
        None => Ok(clock.now().date_naive()),
    }
}
