use sqlx::{Pool, Postgres, Row};

use gst_core::{FileId, FileMeta, FileStatus, GstError, GstResult, TenantId};

use crate::convert::{enum_from_sql, enum_to_sql};

pub struct FileRepository {
    pool: Pool<Postgres>,
}

impl FileRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub async fn create(&self, file: &FileMeta) -> GstResult<()> {
        sqlx::query(
            "INSERT INTO files (id, tenant_id, s3_bucket, s3_key, original_name, content_type,
                file_type, size, status)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(file.id.0)
        .bind(file.tenant_id.0)
        .bind(&file.s3_bucket)
        .bind(&file.s3_key)
        .bind(&file.original_name)
        .bind(&file.content_type)
        .bind(enum_to_sql(&file.file_type))
        .bind(file.size as i64)
        .bind(enum_to_sql(&file.status))
        .execute(&self.pool)
        .await
        .map_err(|e| GstError::context("create_file", e))?;
        Ok(())
    }

    pub async fn get(&self, tenant_id: TenantId, id: FileId) -> GstResult<FileMeta> {
        let row = sqlx::query(
            "SELECT id, tenant_id, s3_bucket, s3_key, original_name, content_type, file_type,
                size, status
             FROM files WHERE tenant_id = $1 AND id = $2",
        )
        .bind(tenant_id.0)
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| GstError::context("get_file", e))?
        .ok_or_else(|| GstError::NotFound(format!("file {id}")))?;
        row_to_file(&row)
    }

    pub async fn update_status(&self, tenant_id: TenantId, id: FileId, status: FileStatus) -> GstResult<()> {
        sqlx::query("UPDATE files SET status = $1 WHERE tenant_id = $2 AND id = $3")
            .bind(enum_to_sql(&status))
            .bind(tenant_id.0)
            .bind(id.0)
            .execute(&self.pool)
            .await
            .map_err(|e| GstError::context("update_file_status", e))?;
        Ok(())
    }
}

fn row_to_file(row: &sqlx::postgres::PgRow) -> GstResult<FileMeta> {
    let file_type_raw: String = row.get("file_type");
    let status_raw: String = row.get("status");
    Ok(FileMeta {
        id: row.get::<uuid::Uuid, _>("id").into(),
        tenant_id: row.get::<uuid::Uuid, _>("tenant_id").into(),
        s3_bucket: row.get("s3_bucket"),
        s3_key: row.get("s3_key"),
        original_name: row.get("original_name"),
        content_type: row.get("content_type"),
        file_type: enum_from_sql("file_type", &file_type_raw)?,
        size: row.get::<i64, _>("size") as u64,
        status: enum_from_sql("status", &status_raw)?,
    })
}
