use crate::cli::parser::Commands;
use crate::config::Config;
use crate::db::log::ttlog;
use crate::db::queries::{enroll_subject, list_subjects, unenroll_subject};
use crate::errors::{AppError, AppResult};
use crate::models::{SubjectId, SubjectRef};
use crate::ui::messages::{success, warning};
use crate::utils::table::{Column, Table};

use super::open_pool;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Enroll {
        id,
        kind,
        name,
        remove,
        list,
    } = cmd
    {
        let pool = open_pool(cfg)?;

        if let Some(id) = id {
            let subject = SubjectRef {
                kind: *kind,
                id: SubjectId::new(id.trim()),
            };

            if *remove {
                unenroll_subject(&pool.conn, &subject)?;
                audit(&pool.conn, "unenroll", &subject, "removed from registry");
                success(format!("Removed {}", subject));
            } else if enroll_subject(&pool.conn, &subject, name.as_deref().unwrap_or(""))? {
                audit(&pool.conn, "enroll", &subject, name.as_deref().unwrap_or(""));
                success(format!("Enrolled {}", subject));
            } else {
                warning(format!("{} is already enrolled", subject));
            }
        } else if !*list {
            return Err(AppError::Other(
                "missing subject id (or use --list)".to_string(),
            ));
        }

        if *list {
            let rows = list_subjects(&pool.conn, None)?;
            if rows.is_empty() {
                println!("No subjects enrolled.");
                return Ok(());
            }

            let mut table = Table::new(vec![
                Column::new("Kind", 8),
                Column::new("Id", 14),
                Column::new("Name", 24),
                Column::new("Enrolled", 10),
            ]);
            for r in rows {
                table.add_row(vec![
                    r.subject.kind.to_string(),
                    r.subject.id.to_string(),
                    r.name,
                    r.enrolled_at.chars().take(10).collect(),
                ]);
            }
            print!("{}", table.render());
        }
    }

    Ok(())
}

fn audit(conn: &rusqlite::Connection, op: &str, subject: &SubjectRef, message: &str) {
    if let Err(e) = ttlog(conn, op, &subject.to_string(), message) {
        warning(format!("Failed to write internal log: {}", e));
    }
}
