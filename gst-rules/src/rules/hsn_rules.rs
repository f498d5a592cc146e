//! HSN existence + rate-match rules (2 rules). Not part of the static
//! catalogue — closed over an `HsnLookup` and registered by the service
//! layer at boot, per the dependency-injection note in the design notes.

use std::sync::Arc;

use gst_core::{Invoice, RuleSeverity, RuleType};

use crate::hsn::HsnLookup;
use crate::validator::{RuleOutcome, ValidationContext, Validator, ValidatorMeta};

pub struct HsnExistsValidator {
    lookup: Arc<HsnLookup>,
}

impl HsnExistsValidator {
    pub fn new(lookup: Arc<HsnLookup>) -> Self {
        Self { lookup }
    }
}

#[async_trait::async_trait]
impl Validator for HsnExistsValidator {
    fn meta(&self) -> ValidatorMeta {
        ValidatorMeta {
            key: "hsn.exists",
            name: "HSN/SAC code exists",
            rule_type: RuleType::Custom,
            severity: RuleSeverity::Warning,
            reconciliation_critical: false,
        }
    }

    async fn validate(&self, _ctx: &ValidationContext, invoice: &Invoice) -> Vec<RuleOutcome> {
        invoice
            .line_items
            .iter()
            .enumerate()
            .map(|(i, line)| {
                let path = format!("line_items[{i}].hsn_sac_exists");
                let code = line.hsn_sac.trim();
                if code.is_empty() {
                    RuleOutcome::skipping(path, "hsn_sac absent")
                } else if self.lookup.exists(code) {
                    RuleOutcome::pass(path, "hsn_sac exists in the master list")
                } else {
                    RuleOutcome::fail(
                        path,
                        "a known HSN/SAC code",
                        code,
                        "hsn_sac does not exist in the master list",
                    )
                }
            })
            .collect()
    }
}

pub struct HsnRateMatchValidator {
    lookup: Arc<HsnLookup>,
}

impl HsnRateMatchValidator {
    pub fn new(lookup: Arc<HsnLookup>) -> Self {
        Self { lookup }
    }
}

#[async_trait::async_trait]
impl Validator for HsnRateMatchValidator {
    fn meta(&self) -> ValidatorMeta {
        ValidatorMeta {
            key: "hsn.rate_matches",
            name: "Line rate matches the HSN/SAC master rate",
            rule_type: RuleType::Custom,
            severity: RuleSeverity::Warning,
            reconciliation_critical: false,
        }
    }

    async fn validate(&self, _ctx: &ValidationContext, invoice: &Invoice) -> Vec<RuleOutcome> {
        invoice
            .line_items
            .iter()
            .enumerate()
            .map(|(i, line)| {
                let path = format!("line_items[{i}].hsn_sac_rate");
                let code = line.hsn_sac.trim();
                if code.is_empty() {
                    return RuleOutcome::skipping(path, "hsn_sac absent");
                }
                let rate = line.effective_rate();
                let (matched, allowed) = self.lookup.rate_matches(code, rate);
                if allowed.is_empty() {
                    RuleOutcome::skipping(path, "hsn_sac not found, skipping rate check")
                } else if matched {
                    RuleOutcome::pass(path, "rate matches the HSN/SAC master rate")
                } else {
                    RuleOutcome::fail(
                        path,
                        format!("{allowed:?}"),
                        format!("{rate:.2}"),
                        "rate does not match any HSN/SAC master rate",
                    )
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gst_core::{DocumentId, HSNRateEntry, LineItem, TenantId};

    fn ctx() -> ValidationContext {
        ValidationContext {
            tenant_id: TenantId::new(),
            document_id: DocumentId::new(),
        }
    }

    fn lookup() -> Arc<HsnLookup> {
        Arc::new(HsnLookup::new(vec![HSNRateEntry {
            code: "851712".to_string(),
            description: "phones".to_string(),
            gst_rate: 18.0,
            condition_desc: String::new(),
        }]))
    }

    #[tokio::test]
    async fn unknown_code_fails_exists() {
        let validator = HsnExistsValidator::new(lookup());
        let mut invoice = Invoice::default();
        invoice.line_items.push(LineItem {
            hsn_sac: "999999".to_string(),
            ..Default::default()
        });
        let out = validator.validate(&ctx(), &invoice).await;
        assert!(!out[0].passed);
    }

    #[tokio::test]
    async fn matching_rate_passes() {
        let validator = HsnRateMatchValidator::new(lookup());
        let mut invoice = Invoice::default();
        invoice.line_items.push(LineItem {
            hsn_sac: "851712".to_string(),
            igst_rate: 18.0,
            ..Default::default()
        });
        let out = validator.validate(&ctx(), &invoice).await;
        assert!(out[0].passed);
    }
}
