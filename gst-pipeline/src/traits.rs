use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Clone)]
pub struct ParseInput {
    pub bytes: Vec<u8>,
    pub content_type: String,
    pub document_type: String,
}

#[derive(Debug, Clone)]
pub struct ParseOutput {
    pub structured_data: Value,
    pub confidence_scores: Value,
    pub model_used: String,
    pub prompt_used: String,
}

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("rate limited by {provider}, retry after {retry_after_seconds}s")]
    RateLimit {
        provider: String,
        retry_after_seconds: u64,
    },
    #[error("{0}")]
    Other(String),
}

/// May cascade across primary/secondary/tertiary providers internally; the
/// pipeline treats every implementation as a single parser.
#[async_trait::async_trait]
pub trait DocumentParser: Send + Sync {
    async fn parse(&self, input: ParseInput) -> Result<ParseOutput, ParseError>;
}

pub struct UploadInput {
    pub bucket: String,
    pub key: String,
    pub bytes: Vec<u8>,
    pub content_type: String,
}

pub struct UploadOutput {
    pub location: String,
    pub etag: String,
}

#[async_trait::async_trait]
pub trait ObjectStorage: Send + Sync {
    async fn upload(&self, input: UploadInput) -> Result<UploadOutput, String>;
    async fn download(&self, bucket: &str, key: &str) -> Result<Vec<u8>, String>;
    async fn delete(&self, bucket: &str, key: &str) -> Result<(), String>;
    async fn presigned_url(&self, bucket: &str, key: &str, ttl_seconds: u64) -> Result<String, String>;
}

/// `tenants/<tenant_id>/files/<file_id>/<original_name>`.
pub fn object_key(tenant_id: gst_core::TenantId, file_id: gst_core::FileId, original_name: &str) -> String {
    format!("tenants/{tenant_id}/files/{file_id}/{original_name}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_key_follows_the_fixed_layout() {
        let tenant_id = gst_core::TenantId::new();
        let file_id = gst_core::FileId::new();
        let key = object_key(tenant_id, file_id, "invoice.pdf");
        assert_eq!(key, format!("tenants/{tenant_id}/files/{file_id}/invoice.pdf"));
    }
}
