use sqlx::{Pool, Postgres, Row};

use gst_core::{GstError, GstResult, Role, TenantId, User, UserId};

use crate::convert::{enum_from_sql, enum_to_sql};

pub struct UserRepository {
    pool: Pool<Postgres>,
}

impl UserRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub async fn create(&self, user: &User) -> GstResult<()> {
        sqlx::query(
            "INSERT INTO users (id, tenant_id, email, role, active, email_verified,
                auth_provider, provider_user_id)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(user.id.0)
        .bind(user.tenant_id.0)
        .bind(&user.email)
        .bind(enum_to_sql(&user.role))
        .bind(user.active)
        .bind(user.email_verified)
        .bind(&user.auth_provider)
        .bind(&user.provider_user_id)
        .execute(&self.pool)
        .await
        .map_err(|e| GstError::context("create_user", e))?;
        Ok(())
    }

    pub async fn get(&self, tenant_id: TenantId, id: UserId) -> GstResult<User> {
        let row = sqlx::query(
            "SELECT id, tenant_id, email, role, active, email_verified, auth_provider,
                provider_user_id
             FROM users WHERE tenant_id = $1 AND id = $2",
        )
        .bind(tenant_id.0)
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| GstError::context("get_user", e))?
        .ok_or_else(|| GstError::NotFound(format!("user {id}")))?;
        row_to_user(&row)
    }

    pub async fn get_by_email(&self, tenant_id: TenantId, email: &str) -> GstResult<Option<User>> {
        let row = sqlx::query(
            "SELECT id, tenant_id, email, role, active, email_verified, auth_provider,
                provider_user_id
             FROM users WHERE tenant_id = $1 AND email = $2",
        )
        .bind(tenant_id.0)
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| GstError::context("get_user_by_email", e))?;
        row.map(|r| row_to_user(&r)).transpose()
    }

    pub async fn update_role(&self, tenant_id: TenantId, id: UserId, role: Role) -> GstResult<()> {
        sqlx::query("UPDATE users SET role = $1 WHERE tenant_id = $2 AND id = $3")
            .bind(enum_to_sql(&role))
            .bind(tenant_id.0)
            .bind(id.0)
            .execute(&self.pool)
            .await
            .map_err(|e| GstError::context("update_user_role", e))?;
        Ok(())
    }
}

fn row_to_user(row: &sqlx::postgres::PgRow) -> GstResult<User> {
    let role_raw: String = row.get("role");
    Ok(User {
        id: row.get::<uuid::Uuid, _>("id").into(),
        tenant_id: row.get::<uuid::Uuid, _>("tenant_id").into(),
        email: row.get("email"),
        role: enum_from_sql("role", &role_raw)?,
        active: row.get("active"),
        email_verified: row.get("email_verified"),
        auth_provider: row.get("auth_provider"),
        provider_user_id: row.get("provider_user_id"),
    })
}
