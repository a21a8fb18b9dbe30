use std::time::Duration;

use crate::model::TursoCredentials;
use crate::turso::error::DatabaseError;
use crate::turso::protocol::{PipelineRequest, PipelineResponse};

/// Sends one pipeline to the gateway. Implementations must not retry; that is
/// [`DatabaseService`](crate::turso::DatabaseService)'s job.
#[async_trait::async_trait]
pub trait SqlTransport: Send + Sync {
    async fn send(&self, request: &PipelineRequest) -> Result<PipelineResponse, DatabaseError>;
}

#[async_trait::async_trait]
impl<T: SqlTransport + ?Sized> SqlTransport for std::sync::Arc<T> {
    async fn send(&self, request: &PipelineRequest) -> Result<PipelineResponse, DatabaseError> {
        (**self).send(request).await
    }
}

/// HTTP transport for one tenant database
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    url: String,
    credentials: TursoCredentials,
}

impl HttpTransport {
    pub fn new(
        credentials: TursoCredentials,
        host_suffix: &str,
        timeout: Duration,
    ) -> Result<Self, DatabaseError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DatabaseError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            url: pipeline_url(&credentials.db_name, host_suffix),
            credentials,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

/// `https://{db}.{suffix}/v2/pipeline`; a db name that already carries a scheme is used as the base
pub fn pipeline_url(db_name: &str, host_suffix: &str) -> String {
    let db_name = db_name.trim().trim_end_matches('/');
    if db_name.starts_with("http://") || db_name.starts_with("https://") {
        return format!("{}/v2/pipeline", db_name);
    }
    if let Some(host) = db_name.strip_prefix("libsql://") {
        return format!("https://{}/v2/pipeline", host);
    }
    format!(
        "https://{}.{}/v2/pipeline",
        db_name,
        host_suffix.trim_matches('.')
    )
}

#[async_trait::async_trait]
impl SqlTransport for HttpTransport {
    async fn send(&self, request: &PipelineRequest) -> Result<PipelineResponse, DatabaseError> {
        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.credentials.api_token)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DatabaseError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| DatabaseError::Decode(e.to_string()))
    }
}
