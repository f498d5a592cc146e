//! Bridges the document store (C6) into the validation engine's (C4)
//! `ValidationStore` boundary. Lives here, not in `gst-db`, because C6 and
//! C4 are siblings in the dependency order (both feed C7) and neither
//! should depend on the other directly.

use gst_core::{
    Document, DocumentId, DocumentValidationRule, GstResult, ReconciliationStatus, TenantId,
    ValidationResultEntry, ValidationStatus,
};
use gst_rules::{DuplicateInvoiceFinder, DuplicateMatch};

/// Bridges the document store into `DuplicateInvoiceFinder` (spec §6.3), the
/// other C4/C6 seam alongside `DbValidationStore`.
pub struct DbDuplicateFinder {
    pub store: std::sync::Arc<gst_db::Store>,
}

#[async_trait::async_trait]
impl DuplicateInvoiceFinder for DbDuplicateFinder {
    async fn find_duplicates(
        &self,
        tenant_id: TenantId,
        excluding_doc_id: DocumentId,
        seller_gstin: &str,
        invoice_number: &str,
    ) -> GstResult<Vec<DuplicateMatch>> {
        let rows = self
            .store
            .documents
            .find_duplicates_by_invoice(tenant_id, excluding_doc_id, seller_gstin, invoice_number)
            .await?;
        Ok(rows
            .into_iter()
            .map(|(document_name, created_at)| DuplicateMatch {
                document_name,
                created_at,
            })
            .collect())
    }
}

pub struct DbValidationStore<'a> {
    pub documents: &'a gst_db::DocumentRepository,
    pub rules: &'a gst_db::DocumentValidationRuleRepository,
}

#[async_trait::async_trait]
impl gst_validation::ValidationStore for DbValidationStore<'_> {
    async fn get_document(&self, tenant_id: TenantId, doc_id: DocumentId) -> GstResult<Document> {
        self.documents.get(tenant_id, doc_id).await
    }

    async fn existing_builtin_keys(
        &self,
        tenant_id: TenantId,
        document_type: &str,
    ) -> GstResult<Vec<String>> {
        self.rules.existing_builtin_keys(tenant_id, document_type).await
    }

    async fn insert_rules(&self, rules: Vec<DocumentValidationRule>) -> GstResult<()> {
        self.rules.insert_many(rules).await
    }

    async fn active_rules(
        &self,
        tenant_id: TenantId,
        document_type: &str,
    ) -> GstResult<Vec<DocumentValidationRule>> {
        self.rules.active_rules(tenant_id, document_type).await
    }

    async fn persist_validation(
        &self,
        tenant_id: TenantId,
        doc_id: DocumentId,
        results: Vec<ValidationResultEntry>,
        validation_status: ValidationStatus,
        reconciliation_status: ReconciliationStatus,
    ) -> GstResult<()> {
        self.documents
            .persist_validation(tenant_id, doc_id, &results, validation_status, reconciliation_status)
            .await
    }
}
