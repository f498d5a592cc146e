//! In-memory HSN/SAC code and rate lookup (C5). Built once from an external
//! master list and thereafter immutable, so a shared `Arc<HsnLookup>` is
//! safe for concurrent readers without any locking.

use std::collections::HashMap;

use gst_core::HSNRateEntry;

const PREFIX_LENGTHS: [usize; 2] = [6, 4];

#[derive(Debug, Default)]
pub struct HsnLookup {
    by_code: HashMap<String, Vec<HSNRateEntry>>,
}

impl HsnLookup {
    pub fn new(entries: Vec<HSNRateEntry>) -> Self {
        let mut by_code: HashMap<String, Vec<HSNRateEntry>> = HashMap::new();
        for entry in entries {
            by_code.entry(entry.code.clone()).or_default().push(entry);
        }
        Self { by_code }
    }

    fn candidates(code: &str) -> Vec<&str> {
        let mut out = vec![code];
        for len in PREFIX_LENGTHS {
            if code.len() > len {
                out.push(&code[..len]);
            }
        }
        out
    }

    /// Exact match first, then 6-digit and 4-digit prefix fallback.
    pub fn exists(&self, code: &str) -> bool {
        Self::candidates(code)
            .into_iter()
            .any(|candidate| self.by_code.contains_key(candidate))
    }

    /// Same fallback order as `exists`; returns the first matching bucket.
    pub fn rates(&self, code: &str) -> Option<&[HSNRateEntry]> {
        for candidate in Self::candidates(code) {
            if let Some(entries) = self.by_code.get(candidate) {
                return Some(entries.as_slice());
            }
        }
        None
    }

    /// `(matched, allowed_rates)` — match uses `|r - rate| < 0.01`.
    pub fn rate_matches(&self, code: &str, rate: f64) -> (bool, Vec<f64>) {
        match self.rates(code) {
            None => (false, Vec::new()),
            Some(entries) => {
                let allowed: Vec<f64> = entries.iter().map(|e| e.gst_rate).collect();
                let matched = allowed.iter().any(|r| (r - rate).abs() < 0.01);
                (matched, allowed)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(code: &str, rate: f64) -> HSNRateEntry {
        HSNRateEntry {
            code: code.to_string(),
            description: "test".to_string(),
            gst_rate: rate,
            condition_desc: String::new(),
        }
    }

    #[test]
    fn exact_match() {
        let lookup = HsnLookup::new(vec![entry("851712", 18.0)]);
        assert!(lookup.exists("851712"));
        assert!(lookup.rate_matches("851712", 18.0).0);
    }

    #[test]
    fn falls_back_to_six_digit_prefix() {
        let lookup = HsnLookup::new(vec![entry("851712", 18.0)]);
        assert!(lookup.exists("85171299"));
        let (matched, allowed) = lookup.rate_matches("85171299", 18.0);
        assert!(matched);
        assert_eq!(allowed, vec![18.0]);
    }

    #[test]
    fn falls_back_to_four_digit_prefix_when_six_digit_absent() {
        let lookup = HsnLookup::new(vec![entry("8517", 18.0)]);
        assert!(lookup.exists("851799"));
    }

    #[test]
    fn unknown_code_does_not_exist() {
        let lookup = HsnLookup::new(vec![entry("851712", 18.0)]);
        assert!(!lookup.exists("000000"));
        assert_eq!(lookup.rate_matches("000000", 18.0), (false, Vec::new()));
    }
}
