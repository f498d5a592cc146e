//! Rule family 8: IRN logical — whether e-invoicing appears to be missing.

use gst_core::{Invoice, RuleSeverity, RuleType};

use crate::validator::{BuiltinValidator, RuleOutcome, ValidationContext, ValidatorMeta};

fn irn_presence_expected(_ctx: &ValidationContext, invoice: &Invoice) -> Vec<RuleOutcome> {
    if !invoice.seller.gstin.trim().is_empty() && invoice.header.irn.trim().is_empty() {
        vec![RuleOutcome::fail(
            "irn",
            "non-empty",
            "",
            "e-invoicing may be required",
        )]
    } else {
        vec![RuleOutcome::pass("irn", "irn presence is consistent with GSTIN registration")]
    }
}

pub fn catalogue() -> Vec<BuiltinValidator> {
    vec![BuiltinValidator {
        meta: ValidatorMeta {
            key: "irn.presence_expected",
            name: "IRN presence expected for GST-registered sellers",
            rule_type: RuleType::Custom,
            severity: RuleSeverity::Warning,
            reconciliation_critical: false,
        },
        run: irn_presence_expected,
    }]
}

#[cfg(test)]
mod tests {
    use super::*;
    use gst_core::{DocumentId, TenantId};

    fn ctx() -> ValidationContext {
        ValidationContext {
            tenant_id: TenantId::new(),
            document_id: DocumentId::new(),
        }
    }

    #[test]
    fn missing_irn_with_gstin_warns() {
        let mut invoice = Invoice::default();
        invoice.seller.gstin = "29ABCDE1234F1Z5".to_string();
        let out = irn_presence_expected(&ctx(), &invoice);
        assert!(!out[0].passed);
        assert_eq!(out[0].message, "e-invoicing may be required");
    }

    #[test]
    fn no_gstin_is_fine_without_irn() {
        let invoice = Invoice::default();
        let out = irn_presence_expected(&ctx(), &invoice);
        assert!(out[0].passed);
    }
}
