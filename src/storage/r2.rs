use std::time::Duration;

use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::presigning::{PresignedRequest, PresigningConfig};
use aws_sdk_s3::Client;
use sha2::{Digest, Sha256};

use crate::config::StorageConfig;
use crate::storage::{ObjectStorage, PresignedUrl, StorageError, StoredObject};

/// File extension for an upload's content type
pub fn extension_for(content_type: &str) -> &'static str {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    match essence.as_str() {
        "image/jpeg" | "image/jpg" => "jpg",
        "image/png" => "png",
        "image/webp" => "webp",
        "image/gif" => "gif",
        _ => "bin",
    }
}

fn key_segment(value: &str) -> String {
    value
        .trim()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

/// `{prefix}/{owner}/{first 16 hex chars of sha256(content)}.{ext}`
pub fn object_key(prefix: &str, owner_id: &str, content: &[u8], content_type: &str) -> String {
    let digest = hex::encode(Sha256::digest(content));
    let name = format!("{}.{}", &digest[..16], extension_for(content_type));
    let prefix = prefix.trim_matches('/');
    if prefix.is_empty() {
        format!("{}/{}", key_segment(owner_id), name)
    } else {
        format!("{}/{}/{}", prefix, key_segment(owner_id), name)
    }
}

/// Cloudflare R2 through its S3-compatible endpoint
#[derive(Debug, Clone)]
pub struct R2StorageService {
    client: Client,
    http: reqwest::Client,
    bucket: String,
    endpoint: String,
    public_base_url: Option<String>,
    key_prefix: String,
    expiry: Duration,
}

impl R2StorageService {
    pub fn from_config(config: &StorageConfig) -> Result<Self, StorageError> {
        let required = |value: &Option<String>, name: &str| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
                .ok_or_else(|| StorageError::Config(format!("{} must be set", name)))
        };
        let endpoint = required(&config.endpoint, "storage.endpoint")?;
        let access_key_id = required(&config.access_key_id, "storage.access_key_id")?;
        let secret_access_key = required(&config.secret_access_key, "storage.secret_access_key")?;
        if config.bucket.trim().is_empty() {
            return Err(StorageError::Config("storage.bucket must be set".to_string()));
        }

        let s3_config = aws_sdk_s3::config::Builder::new()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new("auto"))
            .endpoint_url(&endpoint)
            .force_path_style(true)
            .credentials_provider(Credentials::new(
                access_key_id,
                secret_access_key,
                None,
                None,
                "catalog-config",
            ))
            .build();

        Ok(Self {
            client: Client::from_conf(s3_config),
            http: reqwest::Client::new(),
            bucket: config.bucket.trim().to_string(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
            public_base_url: config
                .public_base_url
                .as_deref()
                .map(|url| url.trim().trim_end_matches('/').to_string())
                .filter(|url| !url.is_empty()),
            key_prefix: config.key_prefix.trim_matches('/').to_string(),
            expiry: Duration::from_secs(config.presign_expiry_secs.max(1)),
        })
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    fn presigning(&self) -> Result<PresigningConfig, StorageError> {
        PresigningConfig::expires_in(self.expiry).map_err(|e| StorageError::Presign(e.to_string()))
    }

    fn to_presigned_url(&self, request: PresignedRequest) -> PresignedUrl {
        PresignedUrl {
            url: request.uri().to_string(),
            headers: request
                .headers()
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .collect(),
            expires_in: self.expiry,
        }
    }
}

#[async_trait::async_trait]
impl ObjectStorage for R2StorageService {
    async fn presign_put(&self, key: &str, content_type: &str) -> Result<PresignedUrl, StorageError> {
        let request = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .presigned(self.presigning()?)
            .await
            .map_err(|e| StorageError::Presign(DisplayErrorContext(e).to_string()))?;
        Ok(self.to_presigned_url(request))
    }

    async fn presign_get(&self, key: &str) -> Result<PresignedUrl, StorageError> {
        let request = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .presigned(self.presigning()?)
            .await
            .map_err(|e| StorageError::Presign(DisplayErrorContext(e).to_string()))?;
        Ok(self.to_presigned_url(request))
    }

    async fn upload(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<StoredObject, StorageError> {
        let presigned = self.presign_put(key, content_type).await?;
        let size = bytes.len();

        let mut request = self.http.put(&presigned.url);
        for (name, value) in &presigned.headers {
            request = request.header(name.as_str(), value.as_str());
        }
        // the signature may already cover content-type
        if !presigned
            .headers
            .iter()
            .any(|(name, _)| name.eq_ignore_ascii_case("content-type"))
        {
            request = request.header(reqwest::header::CONTENT_TYPE, content_type);
        }
        let response = request.body(bytes).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StorageError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        log::info!("uploaded {} ({} bytes) to bucket {}", key, size, self.bucket);
        Ok(StoredObject {
            key: key.to_string(),
            url: self.public_url(key),
            size,
            content_type: content_type.to_string(),
        })
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| StorageError::Delete(DisplayErrorContext(e).to_string()))?;
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        let key = key.trim_start_matches('/');
        match &self.public_base_url {
            Some(base) => format!("{}/{}", base, key),
            None => format!("{}/{}/{}", self.endpoint, self.bucket, key),
        }
    }

    fn key_prefix(&self) -> &str {
        &self.key_prefix
    }
}
