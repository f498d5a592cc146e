pub mod cross_field;
pub mod format;
pub mod hsn_rules;
pub mod irn_cross_field;
pub mod irn_format;
pub mod irn_logical;
pub mod logical;
pub mod math;
pub mod required;

use crate::validator::BuiltinValidator;

/// The full static catalogue (rule families 1–8, 56 validators). HSN and
/// duplicate-invoice rules are intentionally excluded — they need external
/// data and are registered by the service layer (spec §4.1, §9).
pub fn static_catalogue() -> Vec<BuiltinValidator> {
    let mut all = Vec::new();
    all.extend(required::catalogue());
    all.extend(format::catalogue());
    all.extend(math::catalogue());
    all.extend(cross_field::catalogue());
    all.extend(logical::catalogue());
    all.extend(irn_format::catalogue());
    all.extend(irn_cross_field::catalogue());
    all.extend(irn_logical::catalogue());
    all
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalogue_has_no_duplicate_keys() {
        let all = static_catalogue();
        let mut keys: Vec<&str> = all.iter().map(|v| v.meta.key).collect();
        keys.sort_unstable();
        let mut deduped = keys.clone();
        deduped.dedup();
        assert_eq!(keys.len(), deduped.len());
    }

    #[test]
    fn catalogue_has_expected_family_counts() {
        assert_eq!(required::catalogue().len(), 12);
        assert_eq!(format::catalogue().len(), 12);
        assert_eq!(math::catalogue().len(), 12);
        assert_eq!(cross_field::catalogue().len(), 8);
        assert_eq!(logical::catalogue().len(), 7);
        assert_eq!(irn_format::catalogue().len(), 3);
        assert_eq!(irn_cross_field::catalogue().len(), 1);
        assert_eq!(irn_logical::catalogue().len(), 1);
    }

    #[test]
    fn reconciliation_critical_set_has_twenty_two_keys() {
        let count = static_catalogue()
            .iter()
            .filter(|v| v.meta.reconciliation_critical)
            .count();
        assert_eq!(count, 22);
    }
}
