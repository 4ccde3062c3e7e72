use chrono::{Datelike, NaiveDate};

/// Weekday labels indexed like the holiday set (0 = Sunday).
pub const DAY_LABELS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()
}

pub fn day_index(d: &NaiveDate) -> u8 {
    d.weekday().num_days_from_sunday() as u8
}

pub fn day_label(d: &NaiveDate) -> &'static str {
    DAY_LABELS[day_index(d) as usize]
}

/// Parse "5,6" or "fri,sat" into day indices. "none" yields an empty list.
pub fn parse_day_list(s: &str) -> Result<Vec<u8>, String> {
    let s = s.trim();
    if s.is_empty() || s.eq_ignore_ascii_case("none") {
        return Ok(Vec::new());
    }

    s.split(',')
        .map(|part| {
            let part = part.trim();
            if let Ok(n) = part.parse::<u8>() {
                return Ok(n);
            }
            DAY_LABELS
                .iter()
                .position(|l| l.eq_ignore_ascii_case(part))
                .map(|i| i as u8)
                .ok_or_else(|| format!("Invalid weekday: {}", part))
        })
        .collect()
}

/// The seven days ending with `last`, oldest first.
pub fn last_seven_days(last: NaiveDate) -> Vec<NaiveDate> {
    let mut out: Vec<NaiveDate> = (0..7)
        .filter_map(|back| last.checked_sub_days(chrono::Days::new(back)))
        .collect();
    out.reverse();
    out
}
