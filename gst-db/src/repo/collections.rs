use std::collections::HashMap;

use sqlx::{Pool, Postgres, Row};

use gst_core::{
    CollectionId, CollectionPermission, CollectionPermissionLevel, GstError, GstResult, TenantId,
    UserId,
};
use gst_core::Collection;

use crate::convert::{enum_from_sql, enum_to_sql};

pub struct CollectionRepository {
    pool: Pool<Postgres>,
}

impl CollectionRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub async fn create(&self, collection: &Collection) -> GstResult<()> {
        sqlx::query(
            "INSERT INTO collections (id, tenant_id, name, description, created_by)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(collection.id.0)
        .bind(collection.tenant_id.0)
        .bind(&collection.name)
        .bind(&collection.description)
        .bind(collection.created_by.0)
        .execute(&self.pool)
        .await
        .map_err(|e| GstError::context("create_collection", e))?;
        Ok(())
    }

    pub async fn get(&self, tenant_id: TenantId, id: CollectionId) -> GstResult<Collection> {
        let row = sqlx::query(
            "SELECT c.id, c.tenant_id, c.name, c.description, c.created_by,
                (SELECT COUNT(*) FROM documents d WHERE d.collection_id = c.id) AS document_count
             FROM collections c WHERE c.tenant_id = $1 AND c.id = $2",
        )
        .bind(tenant_id.0)
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| GstError::context("get_collection", e))?
        .ok_or_else(|| GstError::NotFound(format!("collection {id}")))?;
        Ok(row_to_collection(&row))
    }

    pub async fn list_for_tenant(&self, tenant_id: TenantId) -> GstResult<Vec<Collection>> {
        let rows = sqlx::query(
            "SELECT c.id, c.tenant_id, c.name, c.description, c.created_by,
                (SELECT COUNT(*) FROM documents d WHERE d.collection_id = c.id) AS document_count
             FROM collections c WHERE c.tenant_id = $1 ORDER BY c.name",
        )
        .bind(tenant_id.0)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| GstError::context("list_collections", e))?;
        Ok(rows.iter().map(row_to_collection).collect())
    }

    pub async fn upsert_permission(&self, perm: &CollectionPermission) -> GstResult<()> {
        sqlx::query(
            "INSERT INTO collection_permissions (collection_id, user_id, permission)
             VALUES ($1, $2, $3)
             ON CONFLICT (collection_id, user_id) DO UPDATE SET permission = EXCLUDED.permission",
        )
        .bind(perm.collection_id.0)
        .bind(perm.user_id.0)
        .bind(enum_to_sql(&perm.permission))
        .execute(&self.pool)
        .await
        .map_err(|e| GstError::context("upsert_collection_permission", e))?;
        Ok(())
    }

    pub async fn remove_permission(&self, collection_id: CollectionId, user_id: UserId) -> GstResult<()> {
        sqlx::query("DELETE FROM collection_permissions WHERE collection_id = $1 AND user_id = $2")
            .bind(collection_id.0)
            .bind(user_id.0)
            .execute(&self.pool)
            .await
            .map_err(|e| GstError::context("remove_collection_permission", e))?;
        Ok(())
    }

    pub async fn permission_for(
        &self,
        collection_id: CollectionId,
        user_id: UserId,
    ) -> GstResult<Option<CollectionPermissionLevel>> {
        let row = sqlx::query(
            "SELECT permission FROM collection_permissions WHERE collection_id = $1 AND user_id = $2",
        )
        .bind(collection_id.0)
        .bind(user_id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| GstError::context("get_collection_permission", e))?;
        row.map(|r| {
            let raw: String = r.get("permission");
            enum_from_sql("permission", &raw)
        })
        .transpose()
    }

    /// Batch permission lookup across every collection a user can see,
    /// for listing endpoints that need per-collection effective access.
    pub async fn permissions_for_user(
        &self,
        user_id: UserId,
    ) -> GstResult<HashMap<CollectionId, CollectionPermissionLevel>> {
        let rows = sqlx::query(
            "SELECT collection_id, permission FROM collection_permissions WHERE user_id = $1",
        )
        .bind(user_id.0)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| GstError::context("get_permissions_for_user", e))?;
        let mut map = HashMap::with_capacity(rows.len());
        for row in rows {
            let raw: String = row.get("permission");
            let level = enum_from_sql("permission", &raw)?;
            map.insert(row.get::<uuid::Uuid, _>("collection_id").into(), level);
        }
        Ok(map)
    }
}

fn row_to_collection(row: &sqlx::postgres::PgRow) -> Collection {
    Collection {
        id: row.get::<uuid::Uuid, _>("id").into(),
        tenant_id: row.get::<uuid::Uuid, _>("tenant_id").into(),
        name: row.get("name"),
        description: row.get("description"),
        created_by: row.get::<uuid::Uuid, _>("created_by").into(),
        document_count: row.get("document_count"),
    }
}
