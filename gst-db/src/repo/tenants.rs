use sqlx::{Pool, Postgres, Row};

use gst_core::{GstError, GstResult, Tenant, TenantId};

pub struct TenantRepository {
    pool: Pool<Postgres>,
}

impl TenantRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub async fn create(&self, tenant: &Tenant) -> GstResult<()> {
        sqlx::query(
            "INSERT INTO tenants (id, slug, name, active) VALUES ($1, $2, $3, $4)
             ON CONFLICT (slug) DO NOTHING",
        )
        .bind(tenant.id.0)
        .bind(&tenant.slug)
        .bind(&tenant.name)
        .bind(tenant.active)
        .execute(&self.pool)
        .await
        .map_err(|e| GstError::context("create_tenant", e))?;
        Ok(())
    }

    pub async fn get(&self, id: TenantId) -> GstResult<Tenant> {
        let row = sqlx::query("SELECT id, slug, name, active FROM tenants WHERE id = $1")
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| GstError::context("get_tenant", e))?
            .ok_or_else(|| GstError::NotFound(format!("tenant {id}")))?;
        Ok(Tenant {
            id: row.get::<uuid::Uuid, _>("id").into(),
            slug: row.get("slug"),
            name: row.get("name"),
            active: row.get("active"),
        })
    }

    pub async fn get_by_slug(&self, slug: &str) -> GstResult<Option<Tenant>> {
        let row = sqlx::query("SELECT id, slug, name, active FROM tenants WHERE slug = $1")
            .bind(slug)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| GstError::context("get_tenant_by_slug", e))?;
        Ok(row.map(|row| Tenant {
            id: row.get::<uuid::Uuid, _>("id").into(),
            slug: row.get("slug"),
            name: row.get("name"),
            active: row.get("active"),
        }))
    }
}
