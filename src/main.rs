use catalog_db_rust::config::AppConfig;
use catalog_db_rust::{build_state, connect_store, seed, serve};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if it exists
    dotenvy::dotenv().ok();

    use env_logger::Builder;
    use log::LevelFilter;

    Builder::new()
        .filter_level(LevelFilter::Info)
        .filter_module("reqwest", LevelFilter::Warn)
        .filter_module("hyper", LevelFilter::Warn)
        .filter_module("aws_config", LevelFilter::Warn)
        .filter_module("aws_sdk_s3", LevelFilter::Warn)
        .filter_module("aws_smithy_runtime", LevelFilter::Warn)
        .parse_default_env()
        .init();

    log::info!("Catalog DB: product catalog server");

    let config = AppConfig::load()?;
    log::info!(
        "configuration loaded: server={}:{}",
        config.server.host,
        config.server.port
    );

    log::info!("connecting to tenant database...");
    let store = Arc::new(connect_store(&config).await?);
    log::info!("database ready");

    if std::env::var("LOAD_SEED_DATA").unwrap_or_default() == "true" {
        log::info!("loading seed data...");
        seed::load_seed_data(&*store).await?;
    }

    let state = build_state(store, &config)?;
    serve(state, &config).await
}
