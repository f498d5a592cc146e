use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ids::{
    AuditEntryId, CollectionId, DocumentId, DocumentTagId, FileId, TenantId, UserId,
    ValidationRuleId,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tenant {
    pub id: TenantId,
    pub slug: String,
    pub name: String,
    pub active: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Free,
    Viewer,
    Member,
    Manager,
    Admin,
}

impl Role {
    /// Ordinal used by the authorization model. `free` is a billing flag and
    /// is treated as `member` for permission purposes everywhere but here.
    pub fn ordinal(self) -> u8 {
        match self {
            Role::Viewer => 0,
            Role::Free | Role::Member => 1,
            Role::Manager => 2,
            Role::Admin => 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub tenant_id: TenantId,
    pub email: String,
    pub role: Role,
    pub active: bool,
    pub email_verified: bool,
    pub auth_provider: String,
    pub provider_user_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collection {
    pub id: CollectionId,
    pub tenant_id: TenantId,
    pub name: String,
    pub description: String,
    pub created_by: UserId,
    /// Derived count, not stored authoritatively — recomputed by the store.
    pub document_count: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollectionPermissionLevel {
    Viewer,
    Editor,
    Owner,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionPermission {
    pub collection_id: CollectionId,
    pub user_id: UserId,
    pub permission: CollectionPermissionLevel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    Pdf,
    Png,
    Jpeg,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Pending,
    Uploaded,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMeta {
    pub id: FileId,
    pub tenant_id: TenantId,
    pub s3_bucket: String,
    pub s3_key: String,
    pub original_name: String,
    pub content_type: String,
    pub file_type: FileType,
    pub size: u64,
    pub status: FileStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParsingStatus {
    Pending,
    Queued,
    Processing,
    Completed,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewStatus {
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationStatus {
    Pending,
    Valid,
    Warning,
    Invalid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReconciliationStatus {
    Pending,
    Valid,
    Invalid,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResultEntry {
    pub rule_id: ValidationRuleId,
    pub passed: bool,
    pub field_path: String,
    pub expected_value: Option<String>,
    pub actual_value: Option<String>,
    pub message: String,
    pub reconciliation_critical: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: DocumentId,
    pub tenant_id: TenantId,
    pub collection_id: CollectionId,
    pub file_id: FileId,
    pub document_type: String,
    pub name: String,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
    pub structured_data: Value,
    pub confidence_scores: Value,
    pub parsing_status: ParsingStatus,
    pub parsing_error: Option<String>,
    pub parse_attempts: i32,
    pub retry_after: Option<DateTime<Utc>>,
    pub review_status: ReviewStatus,
    pub reviewed_by: Option<UserId>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub reviewer_notes: String,
    pub validation_status: ValidationStatus,
    pub validation_results: Vec<ValidationResultEntry>,
    pub reconciliation_status: ReconciliationStatus,
    pub assigned_to: Option<UserId>,
    pub assigned_at: Option<DateTime<Utc>>,
    pub assigned_by: Option<UserId>,
}

impl Document {
    pub fn new_pending(
        tenant_id: TenantId,
        collection_id: CollectionId,
        file_id: FileId,
        document_type: impl Into<String>,
        name: impl Into<String>,
        created_by: UserId,
    ) -> Self {
        Self {
            id: DocumentId::new(),
            tenant_id,
            collection_id,
            file_id,
            document_type: document_type.into(),
            name: name.into(),
            created_by,
            created_at: Utc::now(),
            structured_data: Value::Null,
            confidence_scores: Value::Null,
            parsing_status: ParsingStatus::Pending,
            parsing_error: None,
            parse_attempts: 0,
            retry_after: None,
            review_status: ReviewStatus::Pending,
            reviewed_by: None,
            reviewed_at: None,
            reviewer_notes: String::new(),
            validation_status: ValidationStatus::Pending,
            validation_results: Vec::new(),
            reconciliation_status: ReconciliationStatus::Pending,
            assigned_to: None,
            assigned_at: None,
            assigned_by: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TagSource {
    User,
    Auto,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentTag {
    pub id: DocumentTagId,
    pub document_id: DocumentId,
    pub key: String,
    pub value: String,
    pub source: TagSource,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleSeverity {
    Error,
    Warning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleType {
    Required,
    Regex,
    SumCheck,
    CrossField,
    Custom,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentValidationRule {
    pub id: ValidationRuleId,
    pub tenant_id: TenantId,
    pub document_type: String,
    pub rule_name: String,
    pub rule_type: RuleType,
    pub rule_config: Value,
    pub severity: RuleSeverity,
    pub is_active: bool,
    pub is_builtin: bool,
    pub builtin_rule_key: Option<String>,
    pub reconciliation_critical: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    Created,
    Parsed,
    Review,
    EditStructured,
    Assigned,
    Deleted,
    RetryParse,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentAuditEntry {
    pub id: AuditEntryId,
    pub tenant_id: TenantId,
    pub document_id: DocumentId,
    pub user_id: Option<UserId>,
    pub action: AuditAction,
    pub details: Value,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HSNRateEntry {
    pub code: String,
    pub description: String,
    pub gst_rate: f64,
    pub condition_desc: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_ordinal_treats_free_as_member() {
        assert_eq!(Role::Free.ordinal(), Role::Member.ordinal());
        assert!(Role::Viewer.ordinal() < Role::Member.ordinal());
        assert!(Role::Member.ordinal() < Role::Manager.ordinal());
        assert!(Role::Manager.ordinal() < Role::Admin.ordinal());
    }

    #[test]
    fn collection_permission_ordering() {
        assert!(CollectionPermissionLevel::Viewer < CollectionPermissionLevel::Editor);
        assert!(CollectionPermissionLevel::Editor < CollectionPermissionLevel::Owner);
    }

    #[test]
    fn document_new_pending_defaults() {
        let doc = Document::new_pending(
            TenantId::new(),
            CollectionId::new(),
            FileId::new(),
            "gst_invoice",
            "invoice.pdf",
            UserId::new(),
        );
        assert_eq!(doc.parsing_status, ParsingStatus::Pending);
        assert_eq!(doc.validation_status, ValidationStatus::Pending);
        assert_eq!(doc.parse_attempts, 0);
        assert!(doc.validation_results.is_empty());
    }
}
