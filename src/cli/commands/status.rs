use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::provider::TimetableProvider;
use crate::core::status::live_status;
use crate::errors::AppResult;
use crate::utils::colors::{CYAN, GREEN, RESET};

use super::{instant_or_now, open_pool};

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Status { at } = cmd {
        let clock = cfg.clock()?;
        let now = instant_or_now(&clock, at.as_deref())?;
        let pool = open_pool(cfg)?;
        let provider = TimetableProvider::new(&pool, cfg.settings_refresh());

        let status = live_status(&pool, &provider.snapshot(), now.naive_local())?;

        println!("{}• Now:{} {}", CYAN, RESET, now.format("%Y-%m-%d %H:%M"));
        println!("{}• Period:{} {}", CYAN, RESET, status.label);
        println!(
            "{}• Present:{} {}{}{}/{}",
            CYAN, RESET, GREEN, status.present, RESET, status.total
        );
    }

    Ok(())
}
