//! Rule family 7: IRN cross-field — the hash identity tying the IRN to the
//! seller GSTIN, invoice number, and financial year. Reconciliation-critical.

use sha2::{Digest, Sha256};

use gst_core::utils::financial_year;
use gst_core::{Invoice, RuleSeverity, RuleType};

use crate::date_parser::parse_date;
use crate::validator::{BuiltinValidator, RuleOutcome, ValidationContext, ValidatorMeta};

fn expected_irn(seller_gstin: &str, invoice_number: &str, fy: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(seller_gstin.as_bytes());
    hasher.update(invoice_number.as_bytes());
    hasher.update(fy.as_bytes());
    hex::encode(hasher.finalize())
}

fn irn_hash(_ctx: &ValidationContext, invoice: &Invoice) -> Vec<RuleOutcome> {
    let irn = invoice.header.irn.trim();
    let seller_gstin = invoice.seller.gstin.trim();
    let invoice_number = invoice.header.invoice_number.trim();

    if irn.is_empty() || seller_gstin.is_empty() || invoice_number.is_empty() {
        return vec![RuleOutcome::skipping(
            "xf.invoice.irn_hash",
            "irn, seller gstin, or invoice number absent",
        )];
    }
    let Some(invoice_date) = parse_date(&invoice.header.invoice_date) else {
        return vec![RuleOutcome::skipping(
            "xf.invoice.irn_hash",
            "invoice_date absent or unparseable",
        )];
    };

    let fy = financial_year(invoice_date);
    let expected = expected_irn(seller_gstin, invoice_number, &fy);
    let actual = irn.to_lowercase();

    if actual == expected {
        vec![RuleOutcome::pass(
            "xf.invoice.irn_hash",
            "irn matches sha256(seller_gstin || invoice_number || financial_year)",
        )]
    } else {
        vec![RuleOutcome::fail(
            "xf.invoice.irn_hash",
            expected,
            actual,
            "irn does not match the expected hash",
        )]
    }
}

pub fn catalogue() -> Vec<BuiltinValidator> {
    vec![BuiltinValidator {
        meta: ValidatorMeta {
            key: "xf.irn_hash",
            name: "IRN hash identity",
            rule_type: RuleType::CrossField,
            severity: RuleSeverity::Error,
            reconciliation_critical: true,
        },
        run: irn_hash,
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
    fn matching_hash_passes() {
        let mut invoice = Invoice::default();
        invoice.seller.gstin = "29ABCDE1234F1Z5".to_string();
        invoice.header.invoice_number = "INV-001".to_string();
        invoice.header.invoice_date = "15/01/2025".to_string();
        invoice.header.irn = expected_irn("29ABCDE1234F1Z5", "INV-001", "2024-25");
        let out = irn_hash(&ctx(), &invoice);
        assert!(out[0].passed, "{:?}", out);
    }

    #[test]
    fn mismatched_hash_fails() {
        let mut invoice = Invoice::default();
        invoice.seller.gstin = "29ABCDE1234F1Z5".to_string();
        invoice.header.invoice_number = "INV-001".to_string();
        invoice.header.invoice_date = "15/01/2025".to_string();
        invoice.header.irn = "0".repeat(64);
        let out = irn_hash(&ctx(), &invoice);
        assert!(!out[0].passed);
    }
}
