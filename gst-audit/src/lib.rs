//! Append-only audit trail for document lifecycle actions. A write failure
//! here must never fail the action being audited, so the convenience
//! `record_best_effort` swallows errors after logging them.

use chrono::Utc;
use serde_json::Value;

use gst_core::{AuditAction, AuditEntryId, DocumentAuditEntry, DocumentId, GstResult, TenantId, UserId};

#[async_trait::async_trait]
pub trait AuditSink: Send + Sync {
    async fn record(&self, entry: DocumentAuditEntry) -> GstResult<()>;

    async fn history(&self, tenant_id: TenantId, document_id: DocumentId) -> GstResult<Vec<DocumentAuditEntry>>;
}

pub struct PostgresAuditSink {
    repo: gst_db::DocumentAuditEntryRepository,
}

impl PostgresAuditSink {
    pub fn new(repo: gst_db::DocumentAuditEntryRepository) -> Self {
        Self { repo }
    }
}

#[async_trait::async_trait]
impl AuditSink for PostgresAuditSink {
    async fn record(&self, entry: DocumentAuditEntry) -> GstResult<()> {
        self.repo.create(&entry).await
    }

    async fn history(&self, tenant_id: TenantId, document_id: DocumentId) -> GstResult<Vec<DocumentAuditEntry>> {
        self.repo.list_for_document(tenant_id, document_id).await
    }
}

/// Builds and writes one audit entry, logging and swallowing any failure
/// instead of propagating it to the caller.
pub async fn record_best_effort<S: AuditSink + ?Sized>(
    sink: &S,
    tenant_id: TenantId,
    document_id: DocumentId,
    user_id: Option<UserId>,
    action: AuditAction,
    details: Value,
) {
    let entry = DocumentAuditEntry {
        id: AuditEntryId::new(),
        tenant_id,
        document_id,
        user_id,
        action,
        details,
        created_at: Utc::now(),
    };
    if let Err(err) = sink.record(entry).await {
        tracing::warn!(%document_id, ?action, error = %err, "failed to record audit entry");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct FakeSink {
        entries: Mutex<Vec<DocumentAuditEntry>>,
        fail: bool,
    }

    #[async_trait::async_trait]
    impl AuditSink for FakeSink {
        async fn record(&self, entry: DocumentAuditEntry) -> GstResult<()> {
            if self.fail {
                return Err(gst_core::GstError::Internal("boom".to_string()));
            }
            self.entries.lock().unwrap().push(entry);
            Ok(())
        }

        async fn history(&self, _tenant_id: TenantId, _document_id: DocumentId) -> GstResult<Vec<DocumentAuditEntry>> {
            Ok(self.entries.lock().unwrap().clone())
        }
    }

    #[tokio::test]
    async fn record_best_effort_writes_on_success() {
        let sink = FakeSink {
            entries: Mutex::new(Vec::new()),
            fail: false,
        };
        record_best_effort(
            &sink,
            TenantId::new(),
            DocumentId::new(),
            None,
            AuditAction::Created,
            Value::Null,
        )
        .await;
        assert_eq!(sink.entries.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn record_best_effort_swallows_failure() {
        let sink = FakeSink {
            entries: Mutex::new(Vec::new()),
            fail: true,
        };
        record_best_effort(
            &sink,
            TenantId::new(),
            DocumentId::new(),
            None,
            AuditAction::Created,
            Value::Null,
        )
        .await;
        assert_eq!(sink.entries.lock().unwrap().len(), 0);
    }
}
