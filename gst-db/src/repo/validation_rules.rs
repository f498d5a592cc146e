use sqlx::{Pool, Postgres, Row};

use gst_core::{DocumentValidationRule, GstError, GstResult, TenantId, ValidationRuleId};

use crate::convert::{enum_from_sql, enum_to_sql};

pub struct DocumentValidationRuleRepository {
    pool: Pool<Postgres>,
}

impl DocumentValidationRuleRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub async fn insert_many(&self, rules: Vec<DocumentValidationRule>) -> GstResult<()> {
        for rule in &rules {
            sqlx::query(
                "INSERT INTO document_validation_rules (id, tenant_id, document_type, rule_name,
                    rule_type, rule_config, severity, is_active, is_builtin, builtin_rule_key,
                    reconciliation_critical)
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
                 ON CONFLICT (tenant_id, document_type, builtin_rule_key) DO NOTHING",
            )
            .bind(rule.id.0)
            .bind(rule.tenant_id.0)
            .bind(&rule.document_type)
            .bind(&rule.rule_name)
            .bind(enum_to_sql(&rule.rule_type))
            .bind(&rule.rule_config)
            .bind(enum_to_sql(&rule.severity))
            .bind(rule.is_active)
            .bind(rule.is_builtin)
            .bind(&rule.builtin_rule_key)
            .bind(rule.reconciliation_critical)
            .execute(&self.pool)
            .await
            .map_err(|e| GstError::context("insert_validation_rule", e))?;
        }
        Ok(())
    }

    pub async fn existing_builtin_keys(
        &self,
        tenant_id: TenantId,
        document_type: &str,
    ) -> GstResult<Vec<String>> {
        let rows = sqlx::query(
            "SELECT builtin_rule_key FROM document_validation_rules
             WHERE tenant_id = $1 AND document_type = $2 AND is_builtin = TRUE",
        )
        .bind(tenant_id.0)
        .bind(document_type)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| GstError::context("existing_builtin_keys", e))?;
        Ok(rows
            .iter()
            .filter_map(|row| row.get::<Option<String>, _>("builtin_rule_key"))
            .collect())
    }

    pub async fn active_rules(
        &self,
        tenant_id: TenantId,
        document_type: &str,
    ) -> GstResult<Vec<DocumentValidationRule>> {
        let rows = sqlx::query(
            "SELECT id, tenant_id, document_type, rule_name, rule_type, rule_config, severity,
                is_active, is_builtin, builtin_rule_key, reconciliation_critical
             FROM document_validation_rules
             WHERE tenant_id = $1 AND document_type = $2 AND is_active = TRUE",
        )
        .bind(tenant_id.0)
        .bind(document_type)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| GstError::context("active_validation_rules", e))?;
        rows.iter().map(row_to_rule).collect()
    }

    pub async fn set_active(&self, tenant_id: TenantId, id: ValidationRuleId, active: bool) -> GstResult<()> {
        sqlx::query("UPDATE document_validation_rules SET is_active = $1 WHERE tenant_id = $2 AND id = $3")
            .bind(active)
            .bind(tenant_id.0)
            .bind(id.0)
            .execute(&self.pool)
            .await
            .map_err(|e| GstError::context("set_validation_rule_active", e))?;
        Ok(())
    }
}

fn row_to_rule(row: &sqlx::postgres::PgRow) -> GstResult<DocumentValidationRule> {
    let rule_type_raw: String = row.get("rule_type");
    let severity_raw: String = row.get("severity");
    Ok(DocumentValidationRule {
        id: row.get::<uuid::Uuid, _>("id").into(),
        tenant_id: row.get::<uuid::Uuid, _>("tenant_id").into(),
        document_type: row.get("document_type"),
        rule_name: row.get("rule_name"),
        rule_type: enum_from_sql("rule_type", &rule_type_raw)?,
        rule_config: row.get("rule_config"),
        severity: enum_from_sql("severity", &severity_raw)?,
        is_active: row.get("is_active"),
        is_builtin: row.get("is_builtin"),
        builtin_rule_key: row.get("builtin_rule_key"),
        reconciliation_critical: row.get("reconciliation_critical"),
    })
}
