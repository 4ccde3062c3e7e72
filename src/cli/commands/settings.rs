use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::provider::{SnapshotOrigin, TimetableProvider};
use crate::db::log::ttlog;
use crate::db::settings::{clear_timetable, load_timetable, save_timetable};
use crate::errors::{AppError, AppResult};
use crate::models::{GraceConfig, PeriodDefinition, StaffWindow, TimetableConfig};
use crate::ui::messages::{header, info, success, warning};
use crate::utils::date::{DAY_LABELS, parse_day_list};
use crate::utils::table::{Column, Table};
use crate::utils::time::{format_minutes, format_time, parse_grace, parse_slot};

use super::open_pool;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Settings {
        print,
        periods,
        grace,
        holidays,
        staff,
        reset,
    } = cmd
    {
        let pool = open_pool(cfg)?;

        if *reset {
            clear_timetable(&pool.conn)?;
            log_change(&pool.conn, "reset to built-in default");
            success("Stored timetable removed; the built-in default applies.");
        }

        let edited = periods.is_some() || grace.is_some() || holidays.is_some() || staff.is_some();

        if edited {
            let mut tt = load_timetable(&pool.conn)?.unwrap_or_default();
            apply_edits(
                &mut tt,
                periods.as_deref(),
                grace.as_deref(),
                holidays.as_deref(),
                staff.as_deref(),
            )?;
            save_timetable(&pool.conn, &tt)?;
            log_change(&pool.conn, &summary(&tt));
            success("Timetable saved.");
        }

        if *print || !(edited || *reset) {
            let provider = TimetableProvider::new(&pool, cfg.settings_refresh());
            let (tt, origin) = provider.snapshot_with_origin();
            print_timetable(&tt, origin);
        }
    }

    Ok(())
}

/// Apply command-line edits on top of `tt`. Periods are renumbered from 1
/// in the order given.
pub fn apply_edits(
    tt: &mut TimetableConfig,
    periods: Option<&str>,
    grace: Option<&str>,
    holidays: Option<&str>,
    staff: Option<&str>,
) -> AppResult<()> {
    if let Some(list) = periods {
        tt.periods = list
            .split(',')
            .filter(|s| !s.trim().is_empty())
            .zip(1u32..)
            .map(|(slot, id)| parse_slot(slot).map(|(start, mins)| PeriodDefinition::new(id, start, mins)))
            .collect::<AppResult<Vec<_>>>()?;
    }

    if let Some(g) = grace {
        let (full, half) = parse_grace(g)?;
        tt.grace = GraceConfig::new(full, half)?;
    }

    if let Some(days) = holidays {
        tt.weekly_holidays = parse_day_list(days)
            .map_err(AppError::Configuration)?
            .into_iter()
            .collect();
    }

    if let Some(s) = staff {
        let (start_time, duration_minutes) = parse_slot(s)?;
        tt.staff = StaffWindow {
            start_time,
            duration_minutes,
        };
    }

    tt.validate()
}

fn summary(tt: &TimetableConfig) -> String {
    format!(
        "{} periods, grace {}/{}, staff {}/{}",
        tt.periods.len(),
        tt.grace.full_present_minutes,
        tt.grace.half_present_minutes,
        format_time(&tt.staff.start_time),
        tt.staff.duration_minutes
    )
}

fn log_change(conn: &rusqlite::Connection, message: &str) {
    if let Err(e) = ttlog(conn, "settings", "timetable", message) {
        warning(format!("Failed to write internal log: {}", e));
    }
}

fn print_timetable(tt: &TimetableConfig, origin: SnapshotOrigin) {
    header("Timetable");

    let mut table = Table::new(vec![
        Column::new("Period", 7),
        Column::new("Start", 6),
        Column::new("End", 6),
        Column::new("Length", 7),
    ]);

    for p in &tt.periods {
        let end = p.start_time + chrono::Duration::minutes(i64::from(p.duration_minutes));
        table.add_row(vec![
            p.label(),
            format_time(&p.start_time),
            format_time(&end),
            format_minutes(i64::from(p.duration_minutes)),
        ]);
    }
    print!("{}", table.render());
    println!();

    println!(
        "Grace      : present ≤ {} min, half day ≤ {} min",
        tt.grace.full_present_minutes, tt.grace.half_present_minutes
    );

    let holidays: Vec<&str> = tt
        .weekly_holidays
        .iter()
        .filter_map(|d| DAY_LABELS.get(*d as usize).copied())
        .collect();
    println!(
        "Holidays   : {}",
        if holidays.is_empty() {
            "none".to_string()
        } else {
            holidays.join(", ")
        }
    );

    println!(
        "Staff      : {} for {} min",
        format_time(&tt.staff.start_time),
        tt.staff.duration_minutes
    );

    match origin {
        SnapshotOrigin::Store => info("Source: stored settings"),
        SnapshotOrigin::LastKnownGood => warning("Source: last known good (store unavailable)"),
        SnapshotOrigin::BuiltInDefault => info("Source: built-in default"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edits_renumber_periods_and_validate() {
        let mut tt = TimetableConfig::default();
        apply_edits(&mut tt, Some("08:00/40,09:00/40"), Some("3/10"), Some("none"), Some("08:30/30"))
            .unwrap();

        assert_eq!(tt.periods.len(), 2);
        assert_eq!(tt.periods[1].id, 2);
        assert_eq!(tt.grace.half_present_minutes, 10);
        assert!(tt.weekly_holidays.is_empty());
        assert_eq!(tt.staff.duration_minutes, 30);

        let mut bad = TimetableConfig::default();
        assert!(apply_edits(&mut bad, Some("08:00/60,08:30/45"), None, None, None).is_err());
        assert!(apply_edits(&mut bad, None, Some("20/5"), None, None).is_err());
    }
}
