use thiserror::Error;

/// Error kinds surfaced by the domain and service layers.
///
/// Repository-layer failures are wrapped with one line of call-site context
/// before being returned; the service layer otherwise passes these straight
/// through so callers can classify them without string matching.
#[derive(Error, Debug)]
pub enum GstError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("document not found: {id}")]
    DocumentNotFound { id: uuid::Uuid },

    #[error("document already exists for tenant {tenant_id} and file {file_id}")]
    DocumentAlreadyExists {
        tenant_id: uuid::Uuid,
        file_id: uuid::Uuid,
    },

    #[error("document has not finished parsing: {id}")]
    DocumentNotParsed { id: uuid::Uuid },

    #[error("invalid structured data: {reason}")]
    InvalidStructuredData { reason: String },

    #[error("invalid permission: {reason}")]
    InvalidPermission { reason: String },

    #[error("permission denied on collection {collection_id}")]
    CollectionPermDenied { collection_id: uuid::Uuid },

    #[error("cannot remove your own permission from a collection")]
    SelfPermissionRemoval,

    #[error("a document already exists in this collection for that file")]
    DuplicateCollectionFile,

    #[error("assignee cannot review this document: {reason}")]
    AssigneeCannotReview { reason: String },

    #[error("unsupported file type: {content_type}")]
    UnsupportedFileType { content_type: String },

    #[error("file too large: {size} bytes exceeds the {limit} byte limit")]
    FileTooLarge { size: u64, limit: u64 },

    #[error("upload failed: {reason}")]
    UploadFailed { reason: String },

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("user is inactive")]
    UserInactive,

    #[error("tenant is inactive")]
    TenantInactive,

    #[error("email already in use within tenant")]
    DuplicateEmail,

    #[error("tenant slug already in use")]
    DuplicateTenantSlug,

    #[error("social auth token invalid: {reason}")]
    SocialAuthTokenInvalid { reason: String },

    #[error("password reset token invalid or expired")]
    PasswordResetTokenInvalid,

    #[error("unauthorized")]
    Unauthorized,

    #[error("rate limited by {provider}, retry after {retry_after_seconds}s")]
    RateLimit {
        provider: String,
        retry_after_seconds: u64,
    },

    #[error("{operation}: {reason}")]
    Database { operation: String, reason: String },

    #[error("{context}: {reason}")]
    External { context: String, reason: String },

    #[error("configuration error: {parameter}: {reason}")]
    Configuration { parameter: String, reason: String },

    #[error("internal error: {0}")]
    Internal(String),
}

pub type GstResult<T> = Result<T, GstError>;

impl GstError {
    /// Wraps any error with one line of call-site context, per the
    /// repository-layer propagation convention.
    pub fn context(operation: impl Into<String>, err: impl std::fmt::Display) -> Self {
        GstError::Database {
            operation: operation.into(),
            reason: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for GstError {
    fn from(err: serde_json::Error) -> Self {
        GstError::InvalidStructuredData {
            reason: err.to_string(),
        }
    }
}
