//! Placeholder `DocumentParser`/`ObjectStorage` implementations.
//!
//! The LLM provider cascade and the object-storage client are external
//! collaborators the core is handed pre-configured (spec §6.1, §6.2); their
//! concrete HTTP/S3 implementations are out of scope here. These stand in so
//! the binary links and the queue loop can be exercised end to end; a real
//! deployment swaps them for provider-backed adapters behind the same traits.

use gst_pipeline::{ParseError, ParseInput, ParseOutput, UploadInput, UploadOutput};

pub struct UnconfiguredParser;

#[async_trait::async_trait]
impl gst_pipeline::DocumentParser for UnconfiguredParser {
    async fn parse(&self, _input: ParseInput) -> Result<ParseOutput, ParseError> {
        Err(ParseError::Other("no DocumentParser provider configured".to_string()))
    }
}

pub struct UnconfiguredStorage;

#[async_trait::async_trait]
impl gst_pipeline::ObjectStorage for UnconfiguredStorage {
    async fn upload(&self, _input: UploadInput) -> Result<UploadOutput, String> {
        Err("no ObjectStorage provider configured".to_string())
    }

    async fn download(&self, _bucket: &str, _key: &str) -> Result<Vec<u8>, String> {
        Err("no ObjectStorage provider configured".to_string())
    }

    async fn delete(&self, _bucket: &str, _key: &str) -> Result<(), String> {
        Err("no ObjectStorage provider configured".to_string())
    }

    async fn presigned_url(&self, _bucket: &str, _key: &str, _ttl_seconds: u64) -> Result<String, String> {
        Err("no ObjectStorage provider configured".to_string())
    }
}
