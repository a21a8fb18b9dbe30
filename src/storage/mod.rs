//! Object storage for product media.

pub mod r2;

pub use r2::*;

use std::time::Duration;

use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage is not configured: {0}")]
    Config(String),
    #[error("failed to presign request: {0}")]
    Presign(String),
    #[error("upload failed: {0}")]
    Transport(String),
    #[error("upload rejected with status {status}: {body}")]
    Rejected { status: u16, body: String },
    #[error("delete failed: {0}")]
    Delete(String),
}

impl From<reqwest::Error> for StorageError {
    fn from(err: reqwest::Error) -> Self {
        StorageError::Transport(err.to_string())
    }
}

/// A signed URL plus the headers the caller has to send with it
#[derive(Debug, Clone, PartialEq)]
pub struct PresignedUrl {
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub expires_in: Duration,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredObject {
    pub key: String,
    pub url: String,
    pub size: usize,
    pub content_type: String,
}

#[async_trait::async_trait]
pub trait ObjectStorage: Send + Sync {
    async fn presign_put(&self, key: &str, content_type: &str) -> Result<PresignedUrl, StorageError>;
    async fn presign_get(&self, key: &str) -> Result<PresignedUrl, StorageError>;
    async fn upload(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<StoredObject, StorageError>;
    async fn delete(&self, key: &str) -> Result<(), StorageError>;
    fn public_url(&self, key: &str) -> String;
    fn key_prefix(&self) -> &str;

    /// Content-addressed key under this storage's prefix
    fn object_key(&self, owner_id: &str, content: &[u8], content_type: &str) -> String {
        object_key(self.key_prefix(), owner_id, content, content_type)
    }
}
