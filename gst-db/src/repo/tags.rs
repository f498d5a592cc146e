use sqlx::{Pool, Postgres, Row};

use gst_core::{DocumentId, DocumentTag, GstError, GstResult, TagSource};

use crate::convert::{enum_from_sql, enum_to_sql};

pub struct DocumentTagRepository {
    pool: Pool<Postgres>,
}

impl DocumentTagRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub async fn create(&self, tag: &DocumentTag) -> GstResult<()> {
        sqlx::query(
            "INSERT INTO document_tags (id, document_id, key, value, source, created_at)
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(tag.id.0)
        .bind(tag.document_id.0)
        .bind(&tag.key)
        .bind(&tag.value)
        .bind(enum_to_sql(&tag.source))
        .bind(tag.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| GstError::context("create_document_tag", e))?;
        Ok(())
    }

    pub async fn list_for_document(&self, document_id: DocumentId) -> GstResult<Vec<DocumentTag>> {
        let rows = sqlx::query(
            "SELECT id, document_id, key, value, source, created_at
             FROM document_tags WHERE document_id = $1 ORDER BY created_at",
        )
        .bind(document_id.0)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| GstError::context("list_document_tags", e))?;
        rows.iter()
            .map(|row| {
                let source_raw: String = row.get("source");
                Ok(DocumentTag {
                    id: row.get::<uuid::Uuid, _>("id").into(),
                    document_id: row.get::<uuid::Uuid, _>("document_id").into(),
                    key: row.get("key"),
                    value: row.get("value"),
                    source: enum_from_sql::<TagSource>("source", &source_raw)?,
                    created_at: row.get("created_at"),
                })
            })
            .collect()
    }

    pub async fn delete(&self, document_id: DocumentId, tag_id: gst_core::DocumentTagId) -> GstResult<()> {
        sqlx::query("DELETE FROM document_tags WHERE document_id = $1 AND id = $2")
            .bind(document_id.0)
            .bind(tag_id.0)
            .execute(&self.pool)
            .await
            .map_err(|e| GstError::context("delete_document_tag", e))?;
        Ok(())
    }
}
