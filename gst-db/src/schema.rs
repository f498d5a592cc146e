//! DDL for every entity in the domain model. Idempotent — every statement
//! is `CREATE TABLE IF NOT EXISTS` so `ensure_schema` is safe to call on
//! every boot.

use sqlx::{Pool, Postgres};

use gst_core::{GstError, GstResult};

pub struct Schema;

impl Schema {
    pub async fn ensure_all(pool: &Pool<Postgres>) -> GstResult<()> {
        Self::create_schema_version_table(pool).await?;
        Self::create_tenants_table(pool).await?;
        Self::create_users_table(pool).await?;
        Self::create_collections_table(pool).await?;
        Self::create_collection_permissions_table(pool).await?;
        Self::create_files_table(pool).await?;
        Self::create_documents_table(pool).await?;
        Self::create_document_tags_table(pool).await?;
        Self::create_document_validation_rules_table(pool).await?;
        Self::create_document_audit_entries_table(pool).await?;
        Self::create_hsn_rates_table(pool).await?;
        Self::create_indexes(pool).await?;
        Self::record_version(pool, 1).await?;
        Ok(())
    }

    async fn run(pool: &Pool<Postgres>, operation: &str, query: &str) -> GstResult<()> {
        sqlx::query(query)
            .execute(pool)
            .await
            .map_err(|e| GstError::context(operation, e))?;
        Ok(())
    }

    async fn create_schema_version_table(pool: &Pool<Postgres>) -> GstResult<()> {
        Self::run(
            pool,
            "create_schema_version_table",
            r#"
            CREATE TABLE IF NOT EXISTS schema_version (
                version INTEGER PRIMARY KEY,
                applied_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            );
            "#,
        )
        .await
    }

    async fn record_version(pool: &Pool<Postgres>, version: i32) -> GstResult<()> {
        sqlx::query("INSERT INTO schema_version (version) VALUES ($1) ON CONFLICT DO NOTHING")
            .bind(version)
            .execute(pool)
            .await
            .map_err(|e| GstError::context("record_schema_version", e))?;
        Ok(())
    }

    async fn create_tenants_table(pool: &Pool<Postgres>) -> GstResult<()> {
        Self::run(
            pool,
            "create_tenants_table",
            r#"
            CREATE TABLE IF NOT EXISTS tenants (
                id UUID PRIMARY KEY,
                slug VARCHAR(100) NOT NULL UNIQUE,
                name VARCHAR(200) NOT NULL,
                active BOOLEAN NOT NULL DEFAULT TRUE
            );
            "#,
        )
        .await
    }

    async fn create_users_table(pool: &Pool<Postgres>) -> GstResult<()> {
        Self::run(
            pool,
            "create_users_table",
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id UUID PRIMARY KEY,
                tenant_id UUID NOT NULL REFERENCES tenants(id) ON DELETE CASCADE,
                email VARCHAR(320) NOT NULL,
                role VARCHAR(20) NOT NULL,
                active BOOLEAN NOT NULL DEFAULT TRUE,
                email_verified BOOLEAN NOT NULL DEFAULT FALSE,
                auth_provider VARCHAR(50) NOT NULL,
                provider_user_id VARCHAR(200),
                CONSTRAINT valid_role CHECK (role IN ('free', 'viewer', 'member', 'manager', 'admin')),
                CONSTRAINT unique_email_per_tenant UNIQUE (tenant_id, email)
            );
            "#,
        )
        .await
    }

    async fn create_collections_table(pool: &Pool<Postgres>) -> GstResult<()> {
        Self::run(
            pool,
            "create_collections_table",
            r#"
            CREATE TABLE IF NOT EXISTS collections (
                id UUID PRIMARY KEY,
                tenant_id UUID NOT NULL REFERENCES tenants(id) ON DELETE CASCADE,
                name VARCHAR(200) NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                created_by UUID NOT NULL REFERENCES users(id)
            );
            "#,
        )
        .await
    }

    async fn create_collection_permissions_table(pool: &Pool<Postgres>) -> GstResult<()> {
        Self::run(
            pool,
            "create_collection_permissions_table",
            r#"
            CREATE TABLE IF NOT EXISTS collection_permissions (
                collection_id UUID NOT NULL REFERENCES collections(id) ON DELETE CASCADE,
                user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                permission VARCHAR(10) NOT NULL,
                CONSTRAINT valid_permission CHECK (permission IN ('viewer', 'editor', 'owner')),
                PRIMARY KEY (collection_id, user_id)
            );
            "#,
        )
        .await
    }

    async fn create_files_table(pool: &Pool<Postgres>) -> GstResult<()> {
        Self::run(
            pool,
            "create_files_table",
            r#"
            CREATE TABLE IF NOT EXISTS files (
                id UUID PRIMARY KEY,
                tenant_id UUID NOT NULL REFERENCES tenants(id) ON DELETE CASCADE,
                s3_bucket VARCHAR(200) NOT NULL,
                s3_key VARCHAR(1000) NOT NULL,
                original_name VARCHAR(500) NOT NULL,
                content_type VARCHAR(200) NOT NULL,
                file_type VARCHAR(10) NOT NULL,
                size BIGINT NOT NULL,
                status VARCHAR(10) NOT NULL DEFAULT 'pending',
                CONSTRAINT valid_file_type CHECK (file_type IN ('pdf', 'png', 'jpeg', 'other')),
                CONSTRAINT valid_file_status CHECK (status IN ('pending', 'uploaded', 'failed'))
            );
            "#,
        )
        .await
    }

    async fn create_documents_table(pool: &Pool<Postgres>) -> GstResult<()> {
        Self::run(
            pool,
            "create_documents_table",
            r#"
            CREATE TABLE IF NOT EXISTS documents (
                id UUID PRIMARY KEY,
                tenant_id UUID NOT NULL REFERENCES tenants(id) ON DELETE CASCADE,
                collection_id UUID NOT NULL REFERENCES collections(id) ON DELETE CASCADE,
                file_id UUID NOT NULL REFERENCES files(id),
                document_type VARCHAR(100) NOT NULL,
                name VARCHAR(500) NOT NULL,
                created_by UUID NOT NULL REFERENCES users(id),
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                structured_data JSONB NOT NULL DEFAULT 'null',
                confidence_scores JSONB NOT NULL DEFAULT 'null',
                parsing_status VARCHAR(12) NOT NULL DEFAULT 'pending',
                parsing_error TEXT,
                parse_attempts INTEGER NOT NULL DEFAULT 0,
                retry_after TIMESTAMPTZ,
                review_status VARCHAR(10) NOT NULL DEFAULT 'pending',
                reviewed_by UUID REFERENCES users(id),
                reviewed_at TIMESTAMPTZ,
                reviewer_notes TEXT NOT NULL DEFAULT '',
                validation_status VARCHAR(10) NOT NULL DEFAULT 'pending',
                validation_results JSONB NOT NULL DEFAULT '[]',
                reconciliation_status VARCHAR(10) NOT NULL DEFAULT 'pending',
                assigned_to UUID REFERENCES users(id),
                assigned_at TIMESTAMPTZ,
                assigned_by UUID REFERENCES users(id),
                CONSTRAINT valid_parsing_status CHECK (parsing_status IN ('pending', 'queued', 'processing', 'completed', 'failed')),
                CONSTRAINT valid_review_status CHECK (review_status IN ('pending', 'approved', 'rejected')),
                CONSTRAINT valid_validation_status CHECK (validation_status IN ('pending', 'valid', 'warning', 'invalid')),
                CONSTRAINT valid_reconciliation_status CHECK (reconciliation_status IN ('pending', 'valid', 'invalid')),
                CONSTRAINT unique_file_per_tenant UNIQUE (tenant_id, file_id)
            );
            "#,
        )
        .await
    }

    async fn create_document_tags_table(pool: &Pool<Postgres>) -> GstResult<()> {
        Self::run(
            pool,
            "create_document_tags_table",
            r#"
            CREATE TABLE IF NOT EXISTS document_tags (
                id UUID PRIMARY KEY,
                document_id UUID NOT NULL REFERENCES documents(id) ON DELETE CASCADE,
                key VARCHAR(100) NOT NULL,
                value VARCHAR(500) NOT NULL,
                source VARCHAR(10) NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                CONSTRAINT valid_tag_source CHECK (source IN ('user', 'auto'))
            );
            "#,
        )
        .await
    }

    async fn create_document_validation_rules_table(pool: &Pool<Postgres>) -> GstResult<()> {
        Self::run(
            pool,
            "create_document_validation_rules_table",
            r#"
            CREATE TABLE IF NOT EXISTS document_validation_rules (
                id UUID PRIMARY KEY,
                tenant_id UUID NOT NULL REFERENCES tenants(id) ON DELETE CASCADE,
                document_type VARCHAR(100) NOT NULL,
                rule_name VARCHAR(200) NOT NULL,
                rule_type VARCHAR(20) NOT NULL,
                rule_config JSONB NOT NULL DEFAULT 'null',
                severity VARCHAR(10) NOT NULL,
                is_active BOOLEAN NOT NULL DEFAULT TRUE,
                is_builtin BOOLEAN NOT NULL DEFAULT FALSE,
                builtin_rule_key VARCHAR(100),
                reconciliation_critical BOOLEAN NOT NULL DEFAULT FALSE,
                CONSTRAINT valid_rule_type CHECK (rule_type IN ('required', 'regex', 'sum_check', 'cross_field', 'custom')),
                CONSTRAINT valid_rule_severity CHECK (severity IN ('error', 'warning')),
                CONSTRAINT unique_builtin_per_tenant_type UNIQUE (tenant_id, document_type, builtin_rule_key)
            );
            "#,
        )
        .await
    }

    async fn create_document_audit_entries_table(pool: &Pool<Postgres>) -> GstResult<()> {
        Self::run(
            pool,
            "create_document_audit_entries_table",
            r#"
            CREATE TABLE IF NOT EXISTS document_audit_entries (
                id UUID PRIMARY KEY,
                tenant_id UUID NOT NULL REFERENCES tenants(id) ON DELETE CASCADE,
                document_id UUID NOT NULL,
                user_id UUID REFERENCES users(id),
                action VARCHAR(20) NOT NULL,
                details JSONB NOT NULL DEFAULT 'null',
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                CONSTRAINT valid_audit_action CHECK (action IN ('created', 'parsed', 'review', 'edit_structured', 'assigned', 'deleted', 'retry_parse'))
            );
            "#,
        )
        .await
    }

    async fn create_hsn_rates_table(pool: &Pool<Postgres>) -> GstResult<()> {
        Self::run(
            pool,
            "create_hsn_rates_table",
            r#"
            CREATE TABLE IF NOT EXISTS hsn_rates (
                code VARCHAR(8) NOT NULL,
                description VARCHAR(500) NOT NULL,
                gst_rate DOUBLE PRECISION NOT NULL,
                condition_desc VARCHAR(500) NOT NULL DEFAULT '',
                PRIMARY KEY (code, gst_rate)
            );
            "#,
        )
        .await
    }

    async fn create_indexes(pool: &Pool<Postgres>) -> GstResult<()> {
        let statements = [
            "CREATE INDEX IF NOT EXISTS idx_users_tenant ON users (tenant_id);",
            "CREATE INDEX IF NOT EXISTS idx_collections_tenant ON collections (tenant_id);",
            "CREATE INDEX IF NOT EXISTS idx_collection_permissions_user ON collection_permissions (user_id);",
            "CREATE INDEX IF NOT EXISTS idx_files_tenant ON files (tenant_id);",
            "CREATE INDEX IF NOT EXISTS idx_documents_tenant ON documents (tenant_id);",
            "CREATE INDEX IF NOT EXISTS idx_documents_collection ON documents (collection_id);",
            "CREATE INDEX IF NOT EXISTS idx_documents_claim_queued ON documents (parsing_status, retry_after, created_at) WHERE parsing_status = 'queued';",
            "CREATE INDEX IF NOT EXISTS idx_document_tags_document ON document_tags (document_id);",
            "CREATE INDEX IF NOT EXISTS idx_document_validation_rules_tenant_type ON document_validation_rules (tenant_id, document_type);",
            "CREATE INDEX IF NOT EXISTS idx_document_audit_entries_document ON document_audit_entries (document_id);",
        ];
        for statement in statements {
            Self::run(pool, "create_indexes", statement).await?;
        }
        Ok(())
    }
}
