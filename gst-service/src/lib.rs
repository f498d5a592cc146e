//! Document service façade (C10): composes authorization, the document
//! store, audit, and the parse pipeline behind the flows named in spec §4.9.

pub mod config;
pub mod quota;

use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;

use gst_core::{
    AuditAction, CollectionId, Document, DocumentId, DocumentTag, DocumentTagId, GstError,
    GstResult, Invoice, ParsingStatus, ReviewStatus, TagSource, TenantId, UserId,
};

pub use config::GstConfig;
pub use quota::{NoQuota, QuotaPolicy};

pub struct DocumentService {
    pub store: Arc<gst_db::Store>,
    pub audit: Arc<dyn gst_audit::AuditSink>,
    pub pipeline: Arc<gst_pipeline::PipelineDeps>,
    pub quota: Arc<dyn QuotaPolicy>,
}

impl DocumentService {
    async fn effective_permission(
        &self,
        user_id: UserId,
        role: gst_core::Role,
        collection_id: CollectionId,
    ) -> Option<gst_core::CollectionPermissionLevel> {
        if role == gst_core::Role::Admin {
            return Some(gst_core::CollectionPermissionLevel::Owner);
        }
        let explicit = self
            .store
            .collections
            .permission_for(collection_id, user_id)
            .await
            .unwrap_or(None);
        gst_auth::effective_permission(role, explicit)
    }

    async fn audit(
        &self,
        tenant_id: TenantId,
        document_id: DocumentId,
        user_id: Option<UserId>,
        action: AuditAction,
        details: Value,
    ) {
        gst_audit::record_best_effort(self.audit.as_ref(), tenant_id, document_id, user_id, action, details).await;
    }

    fn enqueue_parse(&self, tenant_id: TenantId, doc_id: DocumentId) {
        let deps = Arc::clone(&self.pipeline);
        let max_retries = 5;
        tokio::spawn(async move {
            if let Err(e) = gst_pipeline::parse_document(&deps, tenant_id, doc_id, max_retries).await {
                tracing::error!(%doc_id, error = %e, "parse_document failed");
            }
        });
    }

    pub async fn create_and_parse(
        &self,
        tenant_id: TenantId,
        actor: UserId,
        role: gst_core::Role,
        collection_id: CollectionId,
        file_id: gst_core::FileId,
        document_type: &str,
        name: &str,
        user_tags: Vec<(String, String)>,
    ) -> GstResult<Document> {
        let effective = self.effective_permission(actor, role, collection_id).await;
        gst_auth::can_edit(effective, collection_id)?;

        if self.store.documents.exists_for_file(tenant_id, file_id).await? {
            return Err(GstError::DocumentAlreadyExists {
                tenant_id: tenant_id.0,
                file_id: file_id.0,
            });
        }

        self.quota.check_and_increment(tenant_id).await?;

        let file = self
            .store
            .files
            .get(tenant_id, file_id)
            .await
            .map_err(|e| GstError::context("looking up file", e))?;

        let doc_name = if name.is_empty() { file.original_name.clone() } else { name.to_string() };
        let doc = Document::new_pending(tenant_id, collection_id, file_id, document_type, doc_name, actor);
        self.store.documents.create(&doc).await?;

        for (key, value) in user_tags {
            self.store
                .tags
                .create(&DocumentTag {
                    id: DocumentTagId::new(),
                    document_id: doc.id,
                    key,
                    value,
                    source: TagSource::User,
                    created_at: Utc::now(),
                })
                .await?;
        }

        self.audit(tenant_id, doc.id, Some(actor), AuditAction::Created, Value::Null).await;
        self.enqueue_parse(tenant_id, doc.id);
        Ok(doc)
    }

    pub async fn retry_parse(
        &self,
        tenant_id: TenantId,
        actor: UserId,
        role: gst_core::Role,
        doc_id: DocumentId,
    ) -> GstResult<()> {
        let doc = self.store.documents.get(tenant_id, doc_id).await?;
        let effective = self.effective_permission(actor, role, doc.collection_id).await;
        gst_auth::can_edit(effective, doc.collection_id)?;

        for tag in self.store.tags.list_for_document(doc_id).await? {
            if tag.source == TagSource::Auto {
                self.store.tags.delete(doc_id, tag.id).await?;
            }
        }
        self.store.documents.reset_for_retry(tenant_id, doc_id).await?;

        self.store
            .files
            .get(tenant_id, doc.file_id)
            .await
            .map_err(|e| GstError::context("looking up file for retry", e))?;

        self.audit(tenant_id, doc_id, Some(actor), AuditAction::RetryParse, Value::Null).await;
        self.enqueue_parse(tenant_id, doc_id);
        Ok(())
    }

    pub async fn edit_structured_data(
        &self,
        tenant_id: TenantId,
        actor: UserId,
        role: gst_core::Role,
        doc_id: DocumentId,
        new_structured_data: Value,
    ) -> GstResult<()> {
        let doc = self.store.documents.get(tenant_id, doc_id).await?;
        let effective = self.effective_permission(actor, role, doc.collection_id).await;
        gst_auth::can_edit(effective, doc.collection_id)?;

        if doc.parsing_status != ParsingStatus::Completed {
            return Err(GstError::DocumentNotParsed { id: doc_id.0 });
        }

        let invoice = Invoice::decode(&new_structured_data).map_err(|e| GstError::InvalidStructuredData {
            reason: e.to_string(),
        })?;

        self.store
            .documents
            .update_structured_data(tenant_id, doc_id, &new_structured_data, &doc.confidence_scores)
            .await?;
        self.store.documents.clear_review(tenant_id, doc_id).await?;

        for tag in self.store.tags.list_for_document(doc_id).await? {
            if tag.source == TagSource::Auto {
                self.store.tags.delete(doc_id, tag.id).await?;
            }
        }
        for extracted in gst_pipeline::autotag::extract(&invoice) {
            self.store
                .tags
                .create(&DocumentTag {
                    id: DocumentTagId::new(),
                    document_id: doc_id,
                    key: extracted.key.to_string(),
                    value: extracted.value,
                    source: TagSource::Auto,
                    created_at: Utc::now(),
                })
                .await?;
        }

        let engine = gst_validation::ValidationEngine::new(
            self.pipeline.registry.clone(),
            gst_pipeline::store_adapter::DbValidationStore {
                documents: &self.store.documents,
                rules: &self.store.validation_rules,
            },
        );
        engine.validate_document(tenant_id, doc_id).await?;

        self.audit(tenant_id, doc_id, Some(actor), AuditAction::EditStructured, Value::Null).await;
        Ok(())
    }

    pub async fn update_review(
        &self,
        tenant_id: TenantId,
        actor: UserId,
        role: gst_core::Role,
        doc_id: DocumentId,
        status: ReviewStatus,
        notes: &str,
    ) -> GstResult<()> {
        let doc = self.store.documents.get(tenant_id, doc_id).await?;
        let effective = self.effective_permission(actor, role, doc.collection_id).await;
        gst_auth::can_edit(effective, doc.collection_id)?;

        if doc.parsing_status != ParsingStatus::Completed {
            return Err(GstError::DocumentNotParsed { id: doc_id.0 });
        }

        self.store
            .documents
            .update_review_status(tenant_id, doc_id, status, actor, notes)
            .await?;
        self.audit(tenant_id, doc_id, Some(actor), AuditAction::Review, Value::Null).await;
        Ok(())
    }

    pub async fn assign_document(
        &self,
        tenant_id: TenantId,
        actor: UserId,
        role: gst_core::Role,
        doc_id: DocumentId,
        assignee: Option<UserId>,
    ) -> GstResult<()> {
        let doc = self.store.documents.get(tenant_id, doc_id).await?;
        let effective = self.effective_permission(actor, role, doc.collection_id).await;
        gst_auth::can_edit(effective, doc.collection_id)?;

        if doc.parsing_status != ParsingStatus::Completed {
            return Err(GstError::DocumentNotParsed { id: doc_id.0 });
        }

        if let Some(assignee_id) = assignee {
            let assignee_user = self.store.users.get(tenant_id, assignee_id).await?;
            let assignee_effective = self
                .effective_permission(assignee_user.id, assignee_user.role, doc.collection_id)
                .await;
            if assignee_effective.map(|p| p < gst_core::CollectionPermissionLevel::Editor).unwrap_or(true) {
                return Err(GstError::AssigneeCannotReview {
                    reason: "assignee lacks editor access on the document's collection".to_string(),
                });
            }
        }

        self.store
            .documents
            .update_assignment(tenant_id, doc_id, assignee, actor)
            .await?;
        self.audit(tenant_id, doc_id, Some(actor), AuditAction::Assigned, Value::Null).await;
        Ok(())
    }

    pub async fn delete(
        &self,
        tenant_id: TenantId,
        actor: UserId,
        role: gst_core::Role,
        doc_id: DocumentId,
    ) -> GstResult<()> {
        let doc = self.store.documents.get(tenant_id, doc_id).await?;
        let effective = self.effective_permission(actor, role, doc.collection_id).await;
        gst_auth::can_edit(effective, doc.collection_id)?;

        self.store.documents.delete(tenant_id, doc_id).await?;
        self.audit(tenant_id, doc_id, Some(actor), AuditAction::Deleted, Value::Null).await;
        Ok(())
    }
}
