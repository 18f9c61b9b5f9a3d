//! Shared helper functions for CLI commands

use chrono::{NaiveDate, NaiveDateTime};
use std::io::{self, IsTerminal};

/// Parse a `--brush-from/--brush-to` value
///
/// Accepts a plain date (midnight) or a full `YYYY-MM-DDTHH:MM:SS` timestamp;
/// a space instead of `T` is also accepted.
pub fn parse_datetime(s: &str) -> Result<NaiveDateTime, String> {
    let s = s.trim();
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Ok(dt);
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Ok(dt);
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .ok_or_else(|| format!("invalid date '{}': expected YYYY-MM-DD[THH:MM:SS]", s))
}

/// Format a measurement for tables (µm, 3 decimals)
pub fn format_measurement(value: f64) -> String {
    format!("{:.3}", value)
}

/// Format a failure percentage
pub fn format_percent(value: f64) -> String {
    format!("{:.1}%", value)
}

/// Truncate a string to `max_len` characters, ending with an ellipsis
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 1 {
        s.chars().take(max_len).collect()
    } else {
        format!("{}…", s.chars().take(max_len - 1).collect::<String>())
    }
}

/// Check whether prompts can be shown
pub fn stdin_is_terminal() -> bool {
    io::stdin().is_terminal()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_datetime() {
        let d = parse_datetime("2024-05-03").unwrap();
        assert_eq!(d.to_string(), "2024-05-03 00:00:00");

        let dt = parse_datetime("2024-05-03T12:30:00").unwrap();
        assert_eq!(dt.to_string(), "2024-05-03 12:30:00");

        let spaced = parse_datetime(" 2024-05-03 12:30:00 ").unwrap();
        assert_eq!(spaced, dt);

        assert!(parse_datetime("05/03/2024").is_err());
        assert!(parse_datetime("2024-13-01").is_err());
    }

    #[test]
    fn test_formatting() {
        assert_eq!(format_measurement(10.0), "10.000");
        assert_eq!(format_measurement(9.87654), "9.877");
        assert_eq!(format_percent(33.3333), "33.3%");
    }

    #[test]
    fn test_truncate_str() {
        assert_eq!(truncate_str("EQ-01", 10), "EQ-01");
        assert_eq!(truncate_str("Per-equipment mean", 8), "Per-equ…");
        assert_eq!(truncate_str("µm", 2), "µm");
        assert_eq!(truncate_str("abc", 1), "a");
    }
}
