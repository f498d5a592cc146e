//! Multi-format date parser backing the format rule family's date checks.
//! Patterns are tried in the order listed in the specification; the first
//! one that parses wins.

use chrono::NaiveDate;

const FORMATS: &[&str] = &[
    "%Y-%m-%d",       // YYYY-MM-DD
    "%d-%m-%Y",       // DD-MM-YYYY
    "%d/%m/%Y",       // DD/MM/YYYY
    "%m-%d-%Y",       // MM-DD-YYYY
    "%m/%d/%Y",       // MM/DD/YYYY
    "%Y/%m/%d",       // YYYY/MM/DD
    "%d %b %Y",       // DD Mon YYYY / D Mon YYYY (chrono's %d accepts both widths)
    "%b %d, %Y",      // Mon DD, YYYY
    "%B %d, %Y",      // Month DD, YYYY
    "%d-%m-%Y %H:%M:%S", // DD-MM-YYYY HH:MM:SS
];

/// Parses a date string against every accepted pattern, falling back to
/// RFC3339. Returns `None` if nothing matches.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let value = raw.trim();
    if value.is_empty() {
        return None;
    }
    for fmt in FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(value, fmt) {
            return Some(date);
        }
        if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(value, fmt) {
            return Some(dt.date());
        }
    }
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(value) {
        return Some(dt.date_naive());
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_iso() {
        assert_eq!(
            parse_date("2025-01-15"),
            NaiveDate::from_ymd_opt(2025, 1, 15)
        );
    }

    #[test]
    fn parses_day_month_year_slash() {
        assert_eq!(
            parse_date("15/01/2025"),
            NaiveDate::from_ymd_opt(2025, 1, 15)
        );
    }

    #[test]
    fn parses_month_name_forms() {
        assert_eq!(
            parse_date("15 Jan 2025"),
            NaiveDate::from_ymd_opt(2025, 1, 15)
        );
        assert_eq!(
            parse_date("Jan 15, 2025"),
            NaiveDate::from_ymd_opt(2025, 1, 15)
        );
        assert_eq!(
            parse_date("January 15, 2025"),
            NaiveDate::from_ymd_opt(2025, 1, 15)
        );
    }

    #[test]
    fn parses_rfc3339() {
        assert_eq!(
            parse_date("2025-01-15T10:30:00Z"),
            NaiveDate::from_ymd_opt(2025, 1, 15)
        );
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(parse_date("not a date"), None);
        assert_eq!(parse_date(""), None);
    }

    #[test]
    fn trims_whitespace() {
        assert_eq!(
            parse_date("  2025-01-15  "),
            NaiveDate::from_ymd_opt(2025, 1, 15)
        );
    }
}
