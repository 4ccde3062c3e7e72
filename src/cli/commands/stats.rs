use crate::cli::parser::Commands;
use crate::config::Config;
use crate::db::stats::weekly_presence;
use crate::errors::AppResult;
use crate::ui::messages::header;
use crate::utils::colors::{GREEN, RESET};
use crate::utils::date::{DAY_LABELS, day_index, last_seven_days};

use super::{date_or_today, open_pool};

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Stats { date } = cmd {
        let clock = cfg.clock()?;
        let last = date_or_today(&clock, date.as_deref())?;
        let pool = open_pool(cfg)?;

        let counts = weekly_presence(&pool, last)?;
        let max = counts.iter().copied().max().unwrap_or(0).max(1);

        header(format!("Presence, week ending {}", last));

        // oldest first
        for d in last_seven_days(last) {
            let idx = day_index(&d) as usize;
            let n = counts[idx];
            let bar = "█".repeat((n as usize * 30).div_ceil(max as usize));
            println!(
                "{} {}  {:>4}  {}{}{}",
                DAY_LABELS[idx], d, n, GREEN, bar, RESET
            );
        }
    }

    Ok(())
}
