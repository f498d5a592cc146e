use sqlx::{Pool, Postgres, Row};

use gst_core::{AuditAction, DocumentAuditEntry, DocumentId, GstError, GstResult, TenantId};

use crate::convert::{enum_from_sql, enum_to_sql};

pub struct DocumentAuditEntryRepository {
    pool: Pool<Postgres>,
}

impl DocumentAuditEntryRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub async fn create(&self, entry: &DocumentAuditEntry) -> GstResult<()> {
        sqlx::query(
            "INSERT INTO document_audit_entries (id, tenant_id, document_id, user_id, action,
                details, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(entry.id.0)
        .bind(entry.tenant_id.0)
        .bind(entry.document_id.0)
        .bind(entry.user_id.map(|id| id.0))
        .bind(enum_to_sql(&entry.action))
        .bind(&entry.details)
        .bind(entry.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| GstError::context("create_audit_entry", e))?;
        Ok(())
    }

    pub async fn list_for_document(
        &self,
        tenant_id: TenantId,
        document_id: DocumentId,
    ) -> GstResult<Vec<DocumentAuditEntry>> {
        let rows = sqlx::query(
            "SELECT id, tenant_id, document_id, user_id, action, details, created_at
             FROM document_audit_entries
             WHERE tenant_id = $1 AND document_id = $2 ORDER BY created_at",
        )
        .bind(tenant_id.0)
        .bind(document_id.0)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| GstError::context("list_audit_entries", e))?;
        rows.iter()
            .map(|row| {
                let action_raw: String = row.get("action");
                Ok(DocumentAuditEntry {
                    id: row.get::<uuid::Uuid, _>("id").into(),
                    tenant_id: row.get::<uuid::Uuid, _>("tenant_id").into(),
                    document_id: row.get::<uuid::Uuid, _>("document_id").into(),
                    user_id: row.get::<Option<uuid::Uuid>, _>("user_id").map(Into::into),
                    action: enum_from_sql::<AuditAction>("action", &action_raw)?,
                    details: row.get("details"),
                    created_at: row.get("created_at"),
                })
            })
            .collect()
    }
}
