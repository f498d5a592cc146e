use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres, Row};

use gst_core::{
    CollectionId, Document, DocumentId, FileId, GstError, GstResult, ParsingStatus,
    ReconciliationStatus, ReviewStatus, TenantId, UserId, ValidationResultEntry, ValidationStatus,
};

use crate::convert::{enum_from_sql, enum_to_sql};

pub struct DocumentRepository {
    pool: Pool<Postgres>,
}

impl DocumentRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub async fn create(&self, document: &Document) -> GstResult<()> {
        sqlx::query(
            "INSERT INTO documents (id, tenant_id, collection_id, file_id, document_type, name,
                created_by, created_at, structured_data, confidence_scores, parsing_status,
                parsing_error, parse_attempts, retry_after, review_status, reviewed_by,
                reviewed_at, reviewer_notes, validation_status, validation_results,
                reconciliation_status, assigned_to, assigned_at, assigned_by)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17,
                $18, $19, $20, $21, $22, $23, $24)",
        )
        .bind(document.id.0)
        .bind(document.tenant_id.0)
        .bind(document.collection_id.0)
        .bind(document.file_id.0)
        .bind(&document.document_type)
        .bind(&document.name)
        .bind(document.created_by.0)
        .bind(document.created_at)
        .bind(&document.structured_data)
        .bind(&document.confidence_scores)
        .bind(enum_to_sql(&document.parsing_status))
        .bind(&document.parsing_error)
        .bind(document.parse_attempts)
        .bind(document.retry_after)
        .bind(enum_to_sql(&document.review_status))
        .bind(document.reviewed_by.map(|id| id.0))
        .bind(document.reviewed_at)
        .bind(&document.reviewer_notes)
        .bind(enum_to_sql(&document.validation_status))
        .bind(serde_json::to_value(&document.validation_results)?)
        .bind(enum_to_sql(&document.reconciliation_status))
        .bind(document.assigned_to.map(|id| id.0))
        .bind(document.assigned_at)
        .bind(document.assigned_by.map(|id| id.0))
        .execute(&self.pool)
        .await
        .map_err(|e| GstError::context("create_document", e))?;
        Ok(())
    }

    pub async fn get(&self, tenant_id: TenantId, id: DocumentId) -> GstResult<Document> {
        let row = sqlx::query(SELECT_COLUMNS)
            .bind(tenant_id.0)
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| GstError::context("get_document", e))?
            .ok_or(GstError::DocumentNotFound { id: id.0 })?;
        row_to_document(&row)
    }

    pub async fn list_for_collection(
        &self,
        tenant_id: TenantId,
        collection_id: CollectionId,
    ) -> GstResult<Vec<Document>> {
        let rows = sqlx::query(
            "SELECT id, tenant_id, collection_id, file_id, document_type, name, created_by,
                created_at, structured_data, confidence_scores, parsing_status, parsing_error,
                parse_attempts, retry_after, review_status, reviewed_by, reviewed_at,
                reviewer_notes, validation_status, validation_results, reconciliation_status,
                assigned_to, assigned_at, assigned_by
             FROM documents WHERE tenant_id = $1 AND collection_id = $2 ORDER BY created_at DESC",
        )
        .bind(tenant_id.0)
        .bind(collection_id.0)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| GstError::context("list_documents_for_collection", e))?;
        rows.iter().map(row_to_document).collect()
    }

    pub async fn exists_for_file(&self, tenant_id: TenantId, file_id: FileId) -> GstResult<bool> {
        let row = sqlx::query("SELECT 1 FROM documents WHERE tenant_id = $1 AND file_id = $2")
            .bind(tenant_id.0)
            .bind(file_id.0)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| GstError::context("check_document_exists_for_file", e))?;
        Ok(row.is_some())
    }

    /// Step 1 of the parse pipeline: moves a single document from
    /// `pending`/`queued` to `processing` and increments `parse_attempts`
    /// in one statement. Returns `false` (zero rows affected) when another
    /// worker already owns the document — the caller returns silently.
    pub async fn try_claim_for_processing(&self, id: DocumentId) -> GstResult<bool> {
        let result = sqlx::query(
            "UPDATE documents SET parsing_status = 'processing', parse_attempts = parse_attempts + 1
             WHERE id = $1 AND parsing_status IN ('pending', 'queued')",
        )
        .bind(id.0)
        .execute(&self.pool)
        .await
        .map_err(|e| GstError::context("try_claim_for_processing", e))?;
        Ok(result.rows_affected() > 0)
    }

    /// Selects up to `limit` queued documents whose retry backoff has
    /// elapsed and atomically moves them to `processing`, so two worker
    /// instances never claim the same row.
    pub async fn claim_queued(&self, limit: i64) -> GstResult<Vec<Document>> {
        let rows = sqlx::query(
            "WITH claimed AS (
                SELECT id FROM documents
                WHERE parsing_status = 'queued'
                    AND (retry_after IS NULL OR retry_after <= NOW())
                ORDER BY retry_after NULLS FIRST, created_at
                LIMIT $1
                FOR UPDATE SKIP LOCKED
            )
            UPDATE documents SET parsing_status = 'processing'
            WHERE id IN (SELECT id FROM claimed)
            RETURNING id, tenant_id, collection_id, file_id, document_type, name, created_by,
                created_at, structured_data, confidence_scores, parsing_status, parsing_error,
                parse_attempts, retry_after, review_status, reviewed_by, reviewed_at,
                reviewer_notes, validation_status, validation_results, reconciliation_status,
                assigned_to, assigned_at, assigned_by",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| GstError::context("claim_queued_documents", e))?;
        rows.iter().map(row_to_document).collect()
    }

    pub async fn update_structured_data(
        &self,
        tenant_id: TenantId,
        id: DocumentId,
        structured_data: &serde_json::Value,
        confidence_scores: &serde_json::Value,
    ) -> GstResult<()> {
        let result = sqlx::query(
            "UPDATE documents SET structured_data = $1, confidence_scores = $2
             WHERE tenant_id = $3 AND id = $4",
        )
        .bind(structured_data)
        .bind(confidence_scores)
        .bind(tenant_id.0)
        .bind(id.0)
        .execute(&self.pool)
        .await
        .map_err(|e| GstError::context("update_structured_data", e))?;
        if result.rows_affected() == 0 {
            return Err(GstError::DocumentNotFound { id: id.0 });
        }
        Ok(())
    }

    pub async fn update_parsing_status(
        &self,
        id: DocumentId,
        status: ParsingStatus,
        error: Option<&str>,
        retry_after: Option<DateTime<Utc>>,
        increment_attempts: bool,
    ) -> GstResult<()> {
        sqlx::query(
            "UPDATE documents SET parsing_status = $1, parsing_error = $2, retry_after = $3,
                parse_attempts = parse_attempts + $4
             WHERE id = $5",
        )
        .bind(enum_to_sql(&status))
        .bind(error)
        .bind(retry_after)
        .bind(if increment_attempts { 1 } else { 0 })
        .bind(id.0)
        .execute(&self.pool)
        .await
        .map_err(|e| GstError::context("update_parsing_status", e))?;
        Ok(())
    }

    pub async fn update_review_status(
        &self,
        tenant_id: TenantId,
        id: DocumentId,
        status: ReviewStatus,
        reviewed_by: UserId,
        notes: &str,
    ) -> GstResult<()> {
        sqlx::query(
            "UPDATE documents SET review_status = $1, reviewed_by = $2, reviewed_at = NOW(),
                reviewer_notes = $3
             WHERE tenant_id = $4 AND id = $5",
        )
        .bind(enum_to_sql(&status))
        .bind(reviewed_by.0)
        .bind(notes)
        .bind(tenant_id.0)
        .bind(id.0)
        .execute(&self.pool)
        .await
        .map_err(|e| GstError::context("update_review_status", e))?;
        Ok(())
    }

    /// Resets review to `pending` and clears the reviewer fields to null.
    /// Used when an edit to `structured_data` invalidates a prior review
    /// decision — the edit is not itself a review, so `reviewed_by`/
    /// `reviewed_at` must not be attributed to the editor.
    pub async fn clear_review(&self, tenant_id: TenantId, id: DocumentId) -> GstResult<()> {
        sqlx::query(
            "UPDATE documents SET review_status = $1, reviewed_by = NULL, reviewed_at = NULL,
                reviewer_notes = NULL
             WHERE tenant_id = $2 AND id = $3",
        )
        .bind(enum_to_sql(&ReviewStatus::Pending))
        .bind(tenant_id.0)
        .bind(id.0)
        .execute(&self.pool)
        .await
        .map_err(|e| GstError::context("clear_review", e))?;
        Ok(())
    }

    /// Resets a document for a retry: back to `pending`, error cleared,
    /// assignment cleared, `parse_attempts` preserved so the pipeline's
    /// `max_attempts` check still sees prior history.
    pub async fn reset_for_retry(&self, tenant_id: TenantId, id: DocumentId) -> GstResult<()> {
        sqlx::query(
            "UPDATE documents SET parsing_status = 'pending', parsing_error = NULL,
                retry_after = NULL, assigned_to = NULL, assigned_at = NULL, assigned_by = NULL
             WHERE tenant_id = $1 AND id = $2",
        )
        .bind(tenant_id.0)
        .bind(id.0)
        .execute(&self.pool)
        .await
        .map_err(|e| GstError::context("reset_for_retry", e))?;
        Ok(())
    }

    pub async fn update_assignment(
        &self,
        tenant_id: TenantId,
        id: DocumentId,
        assigned_to: Option<UserId>,
        assigned_by: UserId,
    ) -> GstResult<()> {
        sqlx::query(
            "UPDATE documents SET assigned_to = $1, assigned_at = NOW(), assigned_by = $2
             WHERE tenant_id = $3 AND id = $4",
        )
        .bind(assigned_to.map(|id| id.0))
        .bind(assigned_by.0)
        .bind(tenant_id.0)
        .bind(id.0)
        .execute(&self.pool)
        .await
        .map_err(|e| GstError::context("update_assignment", e))?;
        Ok(())
    }

    pub async fn persist_validation(
        &self,
        tenant_id: TenantId,
        id: DocumentId,
        results: &[ValidationResultEntry],
        validation_status: ValidationStatus,
        reconciliation_status: ReconciliationStatus,
    ) -> GstResult<()> {
        sqlx::query(
            "UPDATE documents SET validation_results = $1, validation_status = $2,
                reconciliation_status = $3
             WHERE tenant_id = $4 AND id = $5",
        )
        .bind(serde_json::to_value(results)?)
        .bind(enum_to_sql(&validation_status))
        .bind(enum_to_sql(&reconciliation_status))
        .bind(tenant_id.0)
        .bind(id.0)
        .execute(&self.pool)
        .await
        .map_err(|e| GstError::context("persist_validation", e))?;
        Ok(())
    }

    /// Backs `DuplicateInvoiceFinder` (spec §6.3): matches on the JSON
    /// seller GSTIN and invoice number fields of completed documents,
    /// excluding the document being validated.
    pub async fn find_duplicates_by_invoice(
        &self,
        tenant_id: TenantId,
        excluding_doc_id: DocumentId,
        seller_gstin: &str,
        invoice_number: &str,
    ) -> GstResult<Vec<(String, DateTime<Utc>)>> {
        let rows = sqlx::query(
            "SELECT name, created_at FROM documents
             WHERE tenant_id = $1 AND id != $2
                AND structured_data -> 'seller' ->> 'gstin' = $3
                AND structured_data -> 'header' ->> 'invoice_number' = $4",
        )
        .bind(tenant_id.0)
        .bind(excluding_doc_id.0)
        .bind(seller_gstin)
        .bind(invoice_number)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| GstError::context("find_duplicates_by_invoice", e))?;
        Ok(rows
            .iter()
            .map(|row| (row.get("name"), row.get("created_at")))
            .collect())
    }

    pub async fn delete(&self, tenant_id: TenantId, id: DocumentId) -> GstResult<()> {
        sqlx::query("DELETE FROM documents WHERE tenant_id = $1 AND id = $2")
            .bind(tenant_id.0)
            .bind(id.0)
            .execute(&self.pool)
            .await
            .map_err(|e| GstError::context("delete_document", e))?;
        Ok(())
    }
}

const SELECT_COLUMNS: &str = "SELECT id, tenant_id, collection_id, file_id, document_type, name,
    created_by, created_at, structured_data, confidence_scores, parsing_status, parsing_error,
    parse_attempts, retry_after, review_status, reviewed_by, reviewed_at, reviewer_notes,
    validation_status, validation_results, reconciliation_status, assigned_to, assigned_at,
    assigned_by
    FROM documents WHERE tenant_id = $1 AND id = $2";

fn row_to_document(row: &sqlx::postgres::PgRow) -> GstResult<Document> {
    let parsing_status_raw: String = row.get("parsing_status");
    let review_status_raw: String = row.get("review_status");
    let validation_status_raw: String = row.get("validation_status");
    let reconciliation_status_raw: String = row.get("reconciliation_status");
    let validation_results_raw: serde_json::Value = row.get("validation_results");

    Ok(Document {
        id: row.get::<uuid::Uuid, _>("id").into(),
        tenant_id: row.get::<uuid::Uuid, _>("tenant_id").into(),
        collection_id: row.get::<uuid::Uuid, _>("collection_id").into(),
        file_id: row.get::<uuid::Uuid, _>("file_id").into(),
        document_type: row.get("document_type"),
        name: row.get("name"),
        created_by: row.get::<uuid::Uuid, _>("created_by").into(),
        created_at: row.get("created_at"),
        structured_data: row.get("structured_data"),
        confidence_scores: row.get("confidence_scores"),
        parsing_status: enum_from_sql("parsing_status", &parsing_status_raw)?,
        parsing_error: row.get("parsing_error"),
        parse_attempts: row.get("parse_attempts"),
        retry_after: row.get("retry_after"),
        review_status: enum_from_sql("review_status", &review_status_raw)?,
        reviewed_by: row.get::<Option<uuid::Uuid>, _>("reviewed_by").map(Into::into),
        reviewed_at: row.get("reviewed_at"),
        reviewer_notes: row.get("reviewer_notes"),
        validation_status: enum_from_sql("validation_status", &validation_status_raw)?,
        validation_results: serde_json::from_value(validation_results_raw)?,
        reconciliation_status: enum_from_sql("reconciliation_status", &reconciliation_status_raw)?,
        assigned_to: row.get::<Option<uuid::Uuid>, _>("assigned_to").map(Into::into),
        assigned_at: row.get("assigned_at"),
        assigned_by: row.get::<Option<uuid::Uuid>, _>("assigned_by").map(Into::into),
    })
}
