//! Rule registry (C3): maps `rule_key -> validator` and seeds built-in
//! rules for a (tenant, document_type) pair on first use.

use std::collections::HashMap;
use std::sync::Arc;

use gst_core::DocumentValidationRule;

use crate::rules::static_catalogue;
use crate::validator::Validator;

/// In-memory name->validator map. Populated at startup with the static
/// catalogue (rule families 1–8) and may be extended with HSN and
/// duplicate-finder closures once their providers are available (spec §9).
#[derive(Clone)]
pub struct RuleRegistry {
    validators: HashMap<&'static str, Arc<dyn Validator>>,
}

impl RuleRegistry {
    /// Builds a registry pre-populated with the static catalogue.
    pub fn with_static_catalogue() -> Self {
        let mut validators: HashMap<&'static str, Arc<dyn Validator>> = HashMap::new();
        for builtin in static_catalogue() {
            validators.insert(builtin.meta.key, Arc::new(builtin));
        }
        Self { validators }
    }

    /// Registers an externally-sourced validator (HSN or duplicate-invoice
    /// rules) under a stable key. Called once at boot by the service layer.
    pub fn register(&mut self, key: &'static str, validator: Arc<dyn Validator>) {
        self.validators.insert(key, validator);
    }

    pub fn get(&self, key: &str) -> Option<Arc<dyn Validator>> {
        self.validators.get(key).cloned()
    }

    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.validators.keys().copied()
    }
}

/// Computes the set of seed rows missing for a (tenant, document_type) pair,
/// given the built-in keys already persisted. Pure function — the caller
/// (gst-db's rule repository) is responsible for persisting the result,
/// which makes `EnsureBuiltinRules` idempotent: a second call against rows
/// this function already produced yields an empty vec.
pub fn missing_builtin_rules(
    tenant_id: gst_core::TenantId,
    document_type: &str,
    existing_builtin_keys: &[String],
) -> Vec<DocumentValidationRule> {
    static_catalogue()
        .into_iter()
        .filter(|builtin| !existing_builtin_keys.iter().any(|k| k == builtin.meta.key))
        .map(|builtin| DocumentValidationRule {
            id: gst_core::ValidationRuleId::new(),
            tenant_id,
            document_type: document_type.to_string(),
            rule_name: builtin.meta.name.to_string(),
            rule_type: builtin.meta.rule_type,
            rule_config: serde_json::Value::Null,
            severity: builtin.meta.severity,
            is_active: true,
            is_builtin: true,
            builtin_rule_key: Some(builtin.meta.key.to_string()),
            reconciliation_critical: builtin.meta.reconciliation_critical,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use gst_core::TenantId;

    #[test]
    fn seeds_every_rule_on_first_use() {
        let tenant_id = TenantId::new();
        let missing = missing_builtin_rules(tenant_id, "gst_invoice", &[]);
        assert_eq!(missing.len(), static_catalogue().len());
    }

    #[test]
    fn ensure_builtin_rules_is_idempotent() {
        let tenant_id = TenantId::new();
        let first = missing_builtin_rules(tenant_id, "gst_invoice", &[]);
        let existing: Vec<String> = first
            .iter()
            .filter_map(|r| r.builtin_rule_key.clone())
            .collect();
        let second = missing_builtin_rules(tenant_id, "gst_invoice", &existing);
        assert!(second.is_empty());
    }

    #[test]
    fn registered_hsn_validator_is_retrievable() {
        use crate::hsn::HsnLookup;
        use crate::rules::hsn_rules::HsnExistsValidator;
        let mut registry = RuleRegistry::with_static_catalogue();
        let lookup = Arc::new(HsnLookup::new(Vec::new()));
        registry.register("hsn.exists", Arc::new(HsnExistsValidator::new(lookup)));
        assert!(registry.get("hsn.exists").is_some());
    }
}
