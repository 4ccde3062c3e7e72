use crate::cli::parser::Commands;
use crate::config::Config;
use crate::errors::AppResult;
use crate::export::ExportLogic;

use super::open_pool;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Export {
        format,
        file,
        range,
        kind,
        force,
    } = cmd
    {
        let pool = open_pool(cfg)?;
        ExportLogic::export(&pool, *format, file, range.as_deref(), *kind, *force)?;
    }
    Ok(())
}
