use crate::cli::parser::Commands;
use crate::config::Config;
use crate::db::queries::list_records;
use crate::errors::AppResult;
use crate::utils::colorize_status;
use crate::utils::date::day_label;
use crate::utils::table::{Column, Table};

use super::{date_or_today, open_pool};

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::List { date, kind } = cmd {
        let clock = cfg.clock()?;
        let day = date_or_today(&clock, date.as_deref())?;
        let pool = open_pool(cfg)?;

        let records = list_records(&pool.conn, Some((day, day)), *kind)?;

        if records.is_empty() {
            println!("No attendance records for {}", day);
            return Ok(());
        }

        println!("📅 {} ({})\n", day, day_label(&day));

        let mut table = Table::new(vec![
            Column::new("Time", 8),
            Column::new("Kind", 7),
            Column::new("Id", 14),
            Column::new("Period", 6),
            Column::new("Source", 12),
            Column::new("Status", 12),
        ]);

        for r in &records {
            let period = r
                .period_id
                .map(|p| format!("P{}", p))
                .unwrap_or_else(|| "--".to_string());
            table.add_row(vec![
                r.local_at().format("%H:%M:%S").to_string(),
                r.subject.kind.to_string(),
                r.subject.id.to_string(),
                period,
                r.source.clone(),
                colorize_status(r.status),
            ]);
        }

        print!("{}", table.render());
        println!("\n{} records", records.len());
    }

    Ok(())
}
