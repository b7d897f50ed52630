//! Date tokens used by `HOY`, `AHORA`, `FORMATO_FECHA` and `LOTE`.
//!
//! | Token | Meaning |
//! |-------|---------|
//! | `DD` | day, 2 digits |
//! | `MM` | month, 2 digits |
//! | `AAAA` | year, 4 digits |
//! | `AA` | year, 2 digits |
//! | `hh` | hour (24h), 2 digits |
//! | `mm` | minutes, 2 digits |
//! | `ss` | seconds, 2 digits |
//!
//! Tokens are case-sensitive and matched longest first (`AAAA` before `AA`).
//! Anything else is copied through.

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};

use super::ExprError;

pub(crate) const DEFAULT_DATE_FORMAT: &str = "DD/MM/AAAA";
pub(crate) const DEFAULT_DATETIME_FORMAT: &str = "DD/MM/AAAA hh:mm";

/// Longest tokens first.
const TOKENS: [&str; 7] = ["AAAA", "DD", "MM", "AA", "hh", "mm", "ss"];

fn token_value(token: &str, dt: &NaiveDateTime) -> String {
    match token {
        "AAAA" => format!("{:04}", dt.year()),
        "AA" => format!("{:02}", dt.year().rem_euclid(100)),
        "MM" => format!("{:02}", dt.month()),
        "DD" => format!("{:02}", dt.day()),
        "hh" => format!("{:02}", dt.hour()),
        "mm" => format!("{:02}", dt.minute()),
        "ss" => format!("{:02}", dt.second()),
        _ => token.to_string(),
    }
}

/// Try to match a date token at the start of `s`.
pub(crate) fn match_token(s: &str) -> Option<&'static str> {
    TOKENS.into_iter().find(|t| s.starts_with(t))
}

/// Substitute date tokens in `pattern`.
pub(crate) fn format_date(dt: &NaiveDateTime, pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len() + 8);
    let mut rest = pattern;
    while let Some(ch) = rest.chars().next() {
        if let Some(token) = match_token(rest) {
            out.push_str(&token_value(token, dt));
            rest = &rest[token.len()..];
        } else {
            out.push(ch);
            rest = &rest[ch.len_utf8()..];
        }
    }
    out
}

const DATETIME_INPUTS: [&str; 6] = [
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

const DATE_INPUTS: [&str; 4] = ["%d/%m/%Y", "%Y-%m-%d", "%d-%m-%Y", "%Y/%m/%d"];

/// Parse a date as it commonly appears in spreadsheet cells.
pub(crate) fn parse_date(input: &str) -> Result<NaiveDateTime, ExprError> {
    let s = input.trim();
    // ISO timestamps with fractional seconds or zone suffixes
    let s_no_zone = s
        .split_once('.')
        .map(|(head, _)| head)
        .unwrap_or(s)
        .trim_end_matches('Z');

    for fmt in DATETIME_INPUTS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s_no_zone, fmt) {
            return Ok(dt);
        }
    }
    for fmt in DATE_INPUTS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            if let Some(dt) = d.and_hms_opt(0, 0, 0) {
                return Ok(dt);
            }
        }
    }
    Err(ExprError::InvalidDate(input.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dt(y: i32, m: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, mi, s)
            .unwrap()
    }

    #[test]
    fn test_default_formats() {
        let now = dt(2024, 3, 5, 14, 7, 9);
        assert_eq!(format_date(&now, DEFAULT_DATE_FORMAT), "05/03/2024");
        assert_eq!(format_date(&now, DEFAULT_DATETIME_FORMAT), "05/03/2024 14:07");
    }

    #[test]
    fn test_longest_match_and_case() {
        let now = dt(2024, 3, 5, 14, 7, 9);
        assert_eq!(format_date(&now, "AAAAMMDD"), "20240305");
        assert_eq!(format_date(&now, "AAMM"), "2403");
        assert_eq!(format_date(&now, "hh:mm:ss"), "14:07:09");
        // lower-case dd is not a token
        assert_eq!(format_date(&now, "dd"), "dd");
    }

    #[test]
    fn test_parse_date_inputs() {
        assert_eq!(parse_date("15/03/2024").unwrap(), dt(2024, 3, 15, 0, 0, 0));
        assert_eq!(parse_date("2024-03-15").unwrap(), dt(2024, 3, 15, 0, 0, 0));
        assert_eq!(
            parse_date("2024-03-15T10:20:30.123Z").unwrap(),
            dt(2024, 3, 15, 10, 20, 30)
        );
        assert_eq!(
            parse_date("15/03/2024 08:15").unwrap(),
            dt(2024, 3, 15, 8, 15, 0)
        );
        assert!(parse_date("mañana").is_err());
        assert!(parse_date("31/02/2024").is_err());
    }
}
