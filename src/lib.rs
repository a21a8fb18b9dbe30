pub mod api;
pub mod config;
pub mod logic;
pub mod model;
pub mod seed;
pub mod storage;
pub mod store;
pub mod turso;

// Export API types
pub use api::handlers;
pub use api::routes;

pub use logic::{reconcile_variants, VariantPlan};

// Export all model types
pub use model::*;

pub use store::{CatalogStore, TursoStore};

use anyhow::Context;
use std::sync::Arc;

use crate::api::AppState;
use crate::config::AppConfig;
use crate::storage::{ObjectStorage, R2StorageService};
use crate::store::{CredentialCache, CredentialResolver, FileKeyValueStore};
use crate::turso::{DatabaseService, HttpTransport};

/// Tenant credentials from config, or looked up for the configured user
pub async fn resolve_tenant_credentials(config: &AppConfig) -> anyhow::Result<TursoCredentials> {
    if let Some(credentials) = config.tenant_credentials() {
        log::info!("using tenant database {} from config", credentials.db_name);
        return Ok(credentials);
    }

    let user_id = config
        .user_id()
        .context("Set turso.db_name and turso.api_token, or turso.user_id to look them up")?;
    let control = config
        .control_credentials()
        .context("turso.control_db_name and turso.control_api_token are required to look up credentials")?;

    let cache = CredentialCache::new(FileKeyValueStore::open(&config.cache.dir)?);
    let transport = HttpTransport::new(control, &config.turso.host_suffix, config.request_timeout())?;
    let resolver = CredentialResolver::new(
        cache,
        DatabaseService::new(transport).with_retry(config.retry_policy()),
    );
    resolver.resolve(user_id).await
}

/// Connect to the tenant database and make sure the tables exist
pub async fn connect_store(config: &AppConfig) -> anyhow::Result<TursoStore<HttpTransport>> {
    let credentials = resolve_tenant_credentials(config).await?;
    let store = TursoStore::connect(
        credentials,
        &config.turso.host_suffix,
        config.request_timeout(),
        config.retry_policy(),
    )?;
    store.migrate().await?;
    Ok(store)
}

pub fn build_state<S>(store: Arc<S>, config: &AppConfig) -> anyhow::Result<AppState<S>> {
    let mut state = AppState::new(store);
    if config.storage_enabled() {
        let storage = R2StorageService::from_config(&config.storage)
            .context("Failed to configure object storage")?;
        log::info!("object storage enabled for bucket {}", storage.bucket());
        state = state.with_storage(Arc::new(storage) as Arc<dyn ObjectStorage>);
    } else {
        log::info!("object storage not configured; uploads are disabled");
    }
    Ok(state)
}

pub async fn serve<S: CatalogStore + 'static>(
    state: AppState<S>,
    config: &AppConfig,
) -> anyhow::Result<()> {
    let app = crate::api::routes::create_router().with_state(state);

    let bind_address = config.server_address();
    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", bind_address))?;
    log::info!("catalog server running on http://{}", bind_address);

    axum::serve(listener, app).await?;

    Ok(())
}

// Function for integration testing
pub async fn run_server() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();

    let config = AppConfig::load()?;
    let store = Arc::new(connect_store(&config).await?);
    let state = build_state(store, &config)?;
    serve(state, &config).await
}
