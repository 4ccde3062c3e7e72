use crate::db::pool::DbPool;
use crate::errors::AppResult;
use crate::utils::colors::{CYAN, GREEN, GREY, RESET, YELLOW};
use crate::utils::date::{day_index, last_seven_days};
use chrono::NaiveDate;
use std::fs;

/// PRESENT + HALF_PRESENT student records per weekday (0 = Sunday) over
/// the seven days ending with `last`.
pub fn weekly_presence(pool: &DbPool, last: NaiveDate) -> AppResult<[u32; 7]> {
    let days = last_seven_days(last);
    let mut counts = [0u32; 7];

    let mut stmt = pool.conn.prepare_cached(
        "SELECT COUNT(*) FROM attendance
         WHERE subject_kind = 'student' AND day = ?1
           AND status IN ('PRESENT', 'HALF_PRESENT')",
    )?;

    for d in days {
        let n: u32 = stmt.query_row([d.format("%Y-%m-%d").to_string()], |row| row.get(0))?;
        counts[day_index(&d) as usize] += n;
    }

    Ok(counts)
}

pub fn print_db_info(pool: &DbPool, db_path: &str) -> AppResult<()> {
    println!();

    //
    // 1) FILE SIZE
    //
    let file_size = fs::metadata(db_path).map(|m| m.len()).unwrap_or(0);
    let file_mb = (file_size as f64) / (1024.0 * 1024.0);

    println!("{}• File:{} {}{}{}", CYAN, RESET, YELLOW, db_path, RESET);
    println!("{}• Size:{} {:.2} MB", CYAN, RESET, file_mb);

    //
    // 2) REGISTRY
    //
    let (students, staff): (i64, i64) = pool.conn.query_row(
        "SELECT
            COALESCE(SUM(kind = 'student'), 0),
            COALESCE(SUM(kind = 'staff'), 0)
         FROM subjects",
        [],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )?;
    println!(
        "{}• Enrolled:{} {}{}{} students, {}{}{} staff",
        CYAN, RESET, GREEN, students, RESET, GREEN, staff, RESET
    );

    //
    // 3) TOTAL RECORDS
    //
    let count: i64 = pool
        .conn
        .query_row("SELECT COUNT(*) FROM attendance", [], |row| row.get(0))?;
    println!(
        "{}• Attendance records:{} {}{}{}",
        CYAN, RESET, GREEN, count, RESET
    );

    //
    // 4) DATE RANGE
    //
    let (first, last): (Option<String>, Option<String>) = pool.conn.query_row(
        "SELECT MIN(day), MAX(day) FROM attendance",
        [],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )?;
    let range = first.zip(last);

    println!("{}• Date range:{}", CYAN, RESET);
    match &range {
        Some((first, last)) => {
            println!("    from: {}", first);
            println!("    to:   {}", last);
        }
        None => {
            println!("    from: {GREY}--{RESET}");
            println!("    to:   {GREY}--{RESET}");
        }
    }

    //
    // 5) AVERAGE RECORDS/DAY
    //
    if let Some((f, l)) = range
        && let (Ok(d1), Ok(d2)) = (
            NaiveDate::parse_from_str(&f, "%Y-%m-%d"),
            NaiveDate::parse_from_str(&l, "%Y-%m-%d"),
        )
    {
        let days = (d2 - d1).num_days().max(1);
        let avg = count as f64 / days as f64;
        println!("{}• Average records/day:{} {:.2}", CYAN, RESET, avg);
    }

    println!();
    Ok(())
}
