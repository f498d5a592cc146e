use chrono::NaiveDate;

/// Absolute-tolerance float comparison used throughout the math rule family.
pub fn approx_eq(a: f64, b: f64, tolerance: f64) -> bool {
    (a - b).abs() <= tolerance
}

/// Indian financial year (April–March) for a given invoice date, rendered
/// as `YYYY-YY`. Month >= April belongs to the FY starting that year;
/// earlier months belong to the FY that started the previous calendar year.
pub fn financial_year(date: NaiveDate) -> String {
    use chrono::Datelike;
    let year = date.year();
    if date.month() >= 4 {
        format!("{}-{:02}", year, (year + 1).rem_euclid(100))
    } else {
        format!("{}-{:02}", year - 1, year.rem_euclid(100))
    }
}

/// Normalises whitespace-padded identifiers the way the format rule family
/// expects before they are matched against a regex.
pub fn trimmed(value: &str) -> &str {
    value.trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn approx_eq_within_tolerance() {
        assert!(approx_eq(100.0, 100.4, 0.5));
        assert!(!approx_eq(100.0, 100.6, 0.5));
    }

    #[test]
    fn financial_year_before_april() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
        assert_eq!(financial_year(date), "2024-25");
    }

    #[test]
    fn financial_year_on_or_after_april() {
        let date = NaiveDate::from_ymd_opt(2025, 4, 1).unwrap();
        assert_eq!(financial_year(date), "2025-26");
    }

    #[test]
    fn financial_year_wraps_century() {
        let date = NaiveDate::from_ymd_opt(2099, 6, 1).unwrap();
        assert_eq!(financial_year(date), "2099-00");
    }
}
