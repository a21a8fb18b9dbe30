use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::model::TursoCredentials;
use crate::turso::RetryPolicy;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub turso: TursoConfig,
    pub retry: RetryConfig,
    pub storage: StorageConfig,
    pub cache: CacheConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Gateway settings. Tenant credentials are either given directly
/// (`db_name` + `api_token`) or looked up for `user_id` in the control database.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TursoConfig {
    pub host_suffix: String,
    pub control_db_name: Option<String>,
    pub control_api_token: Option<String>,
    pub user_id: Option<String>,
    pub db_name: Option<String>,
    pub api_token: Option<String>,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub base_delay_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub endpoint: Option<String>,
    pub bucket: String,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    pub public_base_url: Option<String>,
    pub key_prefix: String,
    pub presign_expiry_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    pub dir: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3001,
        }
    }
}

impl Default for TursoConfig {
    fn default() -> Self {
        Self {
            host_suffix: "turso.io".to_string(),
            control_db_name: None,
            control_api_token: None,
            user_id: None,
            db_name: None,
            api_token: None,
            timeout_secs: 30,
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 1000,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            bucket: String::new(),
            access_key_id: None,
            secret_access_key: None,
            public_base_url: None,
            key_prefix: "products".to_string(),
            presign_expiry_secs: 3600,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dir: ".catalog-cache".to_string(),
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl AppConfig {
    /// Load configuration from defaults, an optional `config` file and `CATALOG_*` env vars
    pub fn load() -> anyhow::Result<Self> {
        let mut config = config::Config::builder();

        config = config.add_source(config::Config::try_from(&AppConfig::default())?);

        config = config.add_source(config::File::with_name("config").required(false));

        // CATALOG_TURSO__DB_NAME -> turso.db_name
        config = config.add_source(
            config::Environment::with_prefix("CATALOG")
                .prefix_separator("_")
                .separator("__"),
        );

        let config = config.build()?;
        let app_config: AppConfig = config.try_deserialize()?;

        Ok(app_config)
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.turso.timeout_secs.max(1))
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.retry.max_attempts,
            Duration::from_millis(self.retry.base_delay_ms),
        )
    }

    /// Tenant credentials given directly in config, if both parts are set
    pub fn tenant_credentials(&self) -> Option<TursoCredentials> {
        match (non_empty(&self.turso.db_name), non_empty(&self.turso.api_token)) {
            (Some(db), Some(token)) => Some(TursoCredentials::new(db, token)),
            _ => None,
        }
    }

    pub fn control_credentials(&self) -> Option<TursoCredentials> {
        match (
            non_empty(&self.turso.control_db_name),
            non_empty(&self.turso.control_api_token),
        ) {
            (Some(db), Some(token)) => Some(TursoCredentials::new(db, token)),
            _ => None,
        }
    }

    pub fn user_id(&self) -> Option<&str> {
        non_empty(&self.turso.user_id)
    }

    /// Object storage is enabled once a bucket and both keys are configured
    pub fn storage_enabled(&self) -> bool {
        !self.storage.bucket.trim().is_empty()
            && non_empty(&self.storage.access_key_id).is_some()
            && non_empty(&self.storage.secret_access_key).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.server_address(), "127.0.0.1:3001");
        assert_eq!(config.retry_policy(), RetryPolicy::default());
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert_eq!(config.storage.presign_expiry_secs, 3600);
        assert!(config.tenant_credentials().is_none());
        assert!(!config.storage_enabled());
    }

    #[test]
    fn test_tenant_credentials_need_both_parts() {
        let mut config = AppConfig::default();
        config.turso.db_name = Some("shop-db".into());
        assert!(config.tenant_credentials().is_none());

        config.turso.api_token = Some("  ".into());
        assert!(config.tenant_credentials().is_none());

        config.turso.api_token = Some("secret".into());
        let creds = config.tenant_credentials().unwrap();
        assert_eq!(creds.db_name, "shop-db");
        assert_eq!(creds.api_token, "secret");
    }

    #[test]
    fn test_storage_needs_bucket_and_keys() {
        let mut config = AppConfig::default();
        config.storage.bucket = "media".into();
        config.storage.access_key_id = Some("ak".into());
        assert!(!config.storage_enabled());
        config.storage.secret_access_key = Some("sk".into());
        assert!(config.storage_enabled());
    }
}
