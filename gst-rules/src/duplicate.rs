//! Duplicate invoice detection (1 rule). Not part of the static catalogue —
//! closed over a `DuplicateInvoiceFinder` and registered by the service
//! layer at boot, per the dependency-injection note in the design notes.
//! Absence or error of the finder is a passing result with an "unavailable"
//! message (spec §6.3), never a hard failure.

use gst_core::{DocumentId, Invoice, RuleSeverity, RuleType, TenantId};

use crate::validator::{RuleOutcome, ValidationContext, Validator, ValidatorMeta};

#[derive(Debug, Clone)]
pub struct DuplicateMatch {
    pub document_name: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// External collaborator (spec §6.3). Errors are swallowed by the caller —
/// the rule treats "could not check" the same as "no duplicates found", but
/// with an explicit "unavailable" message rather than a silent pass.
#[async_trait::async_trait]
pub trait DuplicateInvoiceFinder: Send + Sync {
    async fn find_duplicates(
        &self,
        tenant_id: TenantId,
        excluding_doc_id: DocumentId,
        seller_gstin: &str,
        invoice_number: &str,
    ) -> Result<Vec<DuplicateMatch>, gst_core::GstError>;
}

pub struct DuplicateInvoiceValidator<F: DuplicateInvoiceFinder> {
    finder: F,
}

impl<F: DuplicateInvoiceFinder> DuplicateInvoiceValidator<F> {
    pub fn new(finder: F) -> Self {
        Self { finder }
    }
}

#[async_trait::async_trait]
impl<F: DuplicateInvoiceFinder> Validator for DuplicateInvoiceValidator<F> {
    fn meta(&self) -> ValidatorMeta {
        ValidatorMeta {
            key: "duplicate.invoice",
            name: "No duplicate invoice exists for this seller",
            rule_type: RuleType::Custom,
            severity: RuleSeverity::Warning,
            reconciliation_critical: false,
        }
    }

    async fn validate(&self, ctx: &ValidationContext, invoice: &Invoice) -> Vec<RuleOutcome> {
        let seller_gstin = invoice.seller.gstin.trim();
        let invoice_number = invoice.header.invoice_number.trim();
        if seller_gstin.is_empty() || invoice_number.is_empty() {
            return vec![RuleOutcome::skipping(
                "duplicate.invoice",
                "seller gstin or invoice number absent",
            )];
        }
        match self
            .finder
            .find_duplicates(ctx.tenant_id, ctx.document_id, seller_gstin, invoice_number)
            .await
        {
            Ok(matches) if matches.is_empty() => {
                vec![RuleOutcome::pass("duplicate.invoice", "no duplicates found")]
            }
            Ok(matches) => {
                let names = matches
                    .iter()
                    .map(|m| m.document_name.as_str())
                    .collect::<Vec<_>>()
                    .join(", ");
                vec![RuleOutcome::fail(
                    "duplicate.invoice",
                    "no duplicates",
                    names,
                    "a document with this seller and invoice number already exists",
                )]
            }
            Err(_) => vec![RuleOutcome::pass(
                "duplicate.invoice",
                "duplicate check unavailable",
            )],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    struct AlwaysEmpty;

    #[async_trait::async_trait]
    impl DuplicateInvoiceFinder for AlwaysEmpty {
        async fn find_duplicates(
            &self,
            _tenant_id: TenantId,
            _excluding_doc_id: DocumentId,
            _seller_gstin: &str,
            _invoice_number: &str,
        ) -> Result<Vec<DuplicateMatch>, gst_core::GstError> {
            Ok(Vec::new())
        }
    }

    struct AlwaysFails;

    #[async_trait::async_trait]
    impl DuplicateInvoiceFinder for AlwaysFails {
        async fn find_duplicates(
            &self,
            _tenant_id: TenantId,
            _excluding_doc_id: DocumentId,
            _seller_gstin: &str,
            _invoice_number: &str,
        ) -> Result<Vec<DuplicateMatch>, gst_core::GstError> {
            Ok(vec![DuplicateMatch {
                document_name: "other-invoice.pdf".to_string(),
                created_at: Utc::now(),
            }])
        }
    }

    fn ctx() -> ValidationContext {
        ValidationContext {
            tenant_id: TenantId::new(),
            document_id: DocumentId::new(),
        }
    }

    fn invoice() -> Invoice {
        let mut invoice = Invoice::default();
        invoice.seller.gstin = "29ABCDE1234F1Z5".to_string();
        invoice.header.invoice_number = "INV-001".to_string();
        invoice
    }

    #[tokio::test]
    async fn no_duplicates_passes() {
        let validator = DuplicateInvoiceValidator::new(AlwaysEmpty);
        let out = validator.validate(&ctx(), &invoice()).await;
        assert!(out[0].passed);
    }

    #[tokio::test]
    async fn duplicate_found_fails() {
        let validator = DuplicateInvoiceValidator::new(AlwaysFails);
        let out = validator.validate(&ctx(), &invoice()).await;
        assert!(!out[0].passed);
    }
}
