//! `ParseDocument` (C7): download, invoke the parser, persist the result,
//! trigger auto-tagging and validation, audit. One call per claimed
//! document; safe to run from many worker tasks concurrently because the
//! parsing-status CAS in `ClaimQueued` already guarantees at-most-one
//! owner.

use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;

use gst_core::{AuditAction, Document, DocumentId, DocumentTag, DocumentTagId, GstResult, Invoice, ParsingStatus, TagSource, TenantId};
use gst_rules::RuleRegistry;

use crate::autotag;
use crate::store_adapter::DbValidationStore;
use crate::traits::{DocumentParser, ObjectStorage, ParseError, ParseInput};

pub struct PipelineDeps {
    pub store: Arc<gst_db::Store>,
    pub audit: Arc<dyn gst_audit::AuditSink>,
    pub parser: Arc<dyn DocumentParser>,
    pub storage: Arc<dyn ObjectStorage>,
    pub registry: RuleRegistry,
}

/// Runs the full parse pipeline for one document. Returns `Ok(())` whether
/// the parse itself succeeded or was recorded as failed/retried — an `Err`
/// here means the state machine could not be progressed at all (e.g. the
/// document has already moved past `processing` and the CAS silently no-ops
/// by returning zero rows affected on the subsequent writes).
pub async fn parse_document(
    deps: &PipelineDeps,
    tenant_id: TenantId,
    doc_id: DocumentId,
    max_attempts: i32,
) -> GstResult<()> {
    if !deps.store.documents.try_claim_for_processing(doc_id).await? {
        return Ok(());
    }
    let doc = deps.store.documents.get(tenant_id, doc_id).await?;

    let file = match deps.store.files.get(tenant_id, doc.file_id).await {
        Ok(file) => file,
        Err(e) => {
            fail_parse(deps, &doc, format!("looking up file: {e}")).await?;
            return Ok(());
        }
    };

    let bytes = match deps.storage.download(&file.s3_bucket, &file.s3_key).await {
        Ok(bytes) => bytes,
        Err(e) => {
            fail_parse(deps, &doc, format!("downloading file: {e}")).await?;
            return Ok(());
        }
    };

    let input = ParseInput {
        bytes,
        content_type: file.content_type.clone(),
        document_type: doc.document_type.clone(),
    };

    match deps.parser.parse(input).await {
        Ok(output) => complete_parse(deps, tenant_id, doc_id, output.structured_data, output.confidence_scores).await,
        Err(ParseError::RateLimit {
            provider,
            retry_after_seconds,
        }) => {
            if doc.parse_attempts < max_attempts {
                let retry_after = Utc::now() + chrono::Duration::seconds(retry_after_seconds as i64);
                deps.store
                    .documents
                    .update_parsing_status(
                        doc_id,
                        ParsingStatus::Queued,
                        Some(&format!("rate limited by {provider}")),
                        Some(retry_after),
                        false,
                    )
                    .await
            } else {
                deps.store
                    .documents
                    .update_parsing_status(
                        doc_id,
                        ParsingStatus::Failed,
                        Some(&format!("rate limited by {provider}, attempts exhausted")),
                        None,
                        false,
                    )
                    .await
            }
        }
        Err(ParseError::Other(reason)) => fail_parse(deps, &doc, reason).await,
    }
}

async fn fail_parse(deps: &PipelineDeps, doc: &Document, reason: String) -> GstResult<()> {
    deps.store
        .documents
        .update_parsing_status(doc.id, ParsingStatus::Failed, Some(&reason), None, false)
        .await
}

async fn complete_parse(
    deps: &PipelineDeps,
    tenant_id: TenantId,
    doc_id: DocumentId,
    structured_data: Value,
    confidence_scores: Value,
) -> GstResult<()> {
    deps.store
        .documents
        .update_structured_data(tenant_id, doc_id, &structured_data, &confidence_scores)
        .await?;
    deps.store
        .documents
        .update_parsing_status(doc_id, ParsingStatus::Completed, None, None, false)
        .await?;

    match Invoice::decode(&structured_data) {
        Ok(invoice) => {
            if let Err(e) = re_derive_auto_tags(deps, doc_id, &invoice).await {
                tracing::warn!(%doc_id, error = %e, "auto-tag extraction failed, continuing parse");
            }
        }
        Err(e) => {
            tracing::warn!(%doc_id, error = %e, "could not decode invoice for auto-tagging");
        }
    }

    let engine = gst_validation::ValidationEngine::new(
        deps.registry.clone(),
        DbValidationStore {
            documents: &deps.store.documents,
            rules: &deps.store.validation_rules,
        },
    );
    if let Err(e) = engine.validate_document(tenant_id, doc_id).await {
        tracing::warn!(%doc_id, error = %e, "validation failed after successful parse");
    }

    gst_audit::record_best_effort(
        deps.audit.as_ref(),
        tenant_id,
        doc_id,
        None,
        AuditAction::Parsed,
        Value::Null,
    )
    .await;

    Ok(())
}

async fn re_derive_auto_tags(deps: &PipelineDeps, doc_id: DocumentId, invoice: &Invoice) -> GstResult<()> {
    let existing = deps.store.tags.list_for_document(doc_id).await?;
    for tag in existing.into_iter().filter(|t| t.source == TagSource::Auto) {
        deps.store.tags.delete(doc_id, tag.id).await?;
    }
    for extracted in autotag::extract(invoice) {
        deps.store
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
    Ok(())
}
