use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::provider::TimetableProvider;
use crate::core::sweeper::{AbsenteeSweeper, SweepReport};
use crate::errors::AppResult;
use crate::ui::messages::{error, info, success, warning};
use std::thread;
use std::time::Duration;

use super::{instant_or_now, open_pool};

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Sweep { at, watch } = cmd {
        let clock = cfg.clock()?;
        let pool = open_pool(cfg)?;
        let provider = TimetableProvider::new(&pool, cfg.settings_refresh());
        let sweeper = AbsenteeSweeper::new(&pool);

        if *watch {
            info(format!(
                "Sweeping every {}s (Ctrl+C to stop)",
                cfg.sweep_interval_secs
            ));
            loop {
                match sweeper.sweep(&provider.snapshot(), clock.now()) {
                    Ok(report) if report.created > 0 || report.failed > 0 => print_report(&report),
                    Ok(_) => {}
                    // Abandoned pass; the next tick starts over.
                    Err(e) if e.is_retryable() => error(format!("Sweep skipped: {}", e)),
                    Err(e) => return Err(e),
                }
                thread::sleep(Duration::from_secs(cfg.sweep_interval_secs));
            }
        }

        let now = instant_or_now(&clock, at.as_deref())?;
        let report = sweeper.sweep(&provider.snapshot(), now)?;
        print_report(&report);
    }

    Ok(())
}

fn print_report(report: &SweepReport) {
    if report.holiday {
        info("Holiday: nothing to sweep.");
        return;
    }

    if report.periods_swept.is_empty() && !report.staff_swept {
        info("No closed windows yet.");
        return;
    }

    let mut windows: Vec<String> = report
        .periods_swept
        .iter()
        .map(|p| format!("P{}", p))
        .collect();
    if report.staff_swept {
        windows.push("staff".to_string());
    }

    success(format!(
        "{} marked absent ({})",
        report.created,
        windows.join(", ")
    ));

    if report.failed > 0 {
        warning(format!(
            "{} subjects could not be marked; they will be retried on the next sweep",
            report.failed
        ));
    }
}
