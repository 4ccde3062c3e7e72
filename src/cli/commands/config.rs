use crate::cli::parser::Commands;
use crate::config::migrate::{fill_missing_keys, missing_keys};
use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::ui::messages::{info, success, warning};

/// Handle the `config` subcommand
pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Config {
        print_config,
        check,
        migrate,
    } = cmd
    {
        let path = Config::config_file();

        // ---- PRINT CONFIG ----
        if *print_config {
            println!("📄 Current configuration:\n");
            let yaml = serde_yaml::to_string(cfg).map_err(|e| AppError::Other(e.to_string()))?;
            println!("{}", yaml);
        }

        // ---- CHECK / MIGRATE ----
        if *check || *migrate {
            if !path.exists() {
                warning(format!(
                    "No configuration file at {}; run `rattendance init`",
                    path.display()
                ));
                return Ok(());
            }

            let missing = missing_keys(&path)?;
            if missing.is_empty() {
                success("Configuration file is complete.");
            } else if *migrate {
                let added = fill_missing_keys(&path, &cfg.database)?;
                success(format!("Added missing fields: {}", added.join(", ")));
            } else {
                warning(format!("Missing fields: {}", missing.join(", ")));
                info("Run `rattendance config --migrate` to add them with defaults.");
            }
        }
    }

    Ok(())
}
