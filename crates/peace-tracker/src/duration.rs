//! The tracker's compact duration encoding: `"{h}h {m}m"`.

use std::sync::OnceLock;

use regex::Regex;

/// Format a minute count as the tracker's compact duration string. Either
/// part is omitted if zero; a duration of zero minutes still reports the
/// minimum billable unit of one minute.
pub fn format_time_spent(minutes: i64) -> String {
    if minutes <= 0 {
        return "1m".to_string();
    }

    let hours = minutes / 60;
    let remaining = minutes % 60;

    match (hours > 0, remaining > 0) {
        (true, true) => format!("{hours}h {remaining}m"),
        (true, false) => format!("{hours}h"),
        _ => format!("{remaining}m"),
    }
}

fn days_pattern() -> &'static Regex {
    static CELL: OnceLock<Regex> = OnceLock::new();
    CELL.get_or_init(|| Regex::new(r"(\d+)d").unwrap())
}

fn hours_pattern() -> &'static Regex {
    static CELL: OnceLock<Regex> = OnceLock::new();
    CELL.get_or_init(|| Regex::new(r"(\d+)h").unwrap())
}

fn minutes_pattern() -> &'static Regex {
    static CELL: OnceLock<Regex> = OnceLock::new();
    CELL.get_or_init(|| Regex::new(r"(\d+)m").unwrap())
}

/// Parse a compact duration string (`"1d 2h 30m"`, `"45m"`, ...) into
/// minutes. A day is 8 working hours. Returns at least 1.
pub fn parse_time_spent(text: &str) -> i64 {
    let mut total = 0i64;

    if let Some(caps) = days_pattern().captures(text) {
        if let Ok(days) = caps[1].parse::<i64>() {
            total += days * 8 * 60;
        }
    }
    if let Some(caps) = hours_pattern().captures(text) {
        if let Ok(hours) = caps[1].parse::<i64>() {
            total += hours * 60;
        }
    }
    if let Some(caps) = minutes_pattern().captures(text) {
        if let Ok(minutes) = caps[1].parse::<i64>() {
            total += minutes;
        }
    }

    total.max(1)
}
