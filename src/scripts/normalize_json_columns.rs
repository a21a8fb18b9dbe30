use anyhow::{Context, Result};
use catalog_db_rust::config::AppConfig;
use catalog_db_rust::logic::{decode_json_text, encode_json_text, is_canonical_json_text};
use catalog_db_rust::model::{Media, ProductMetafield, ProductModifier, ProductOption, Seo};
use catalog_db_rust::resolve_tenant_credentials;
use catalog_db_rust::turso::{
    sql, DatabaseService, HttpTransport, QueryResult, Row, SqlValue, Statement,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;

const JSON_COLUMNS: [&str; 7] = [
    "tags",
    "options",
    "modifiers",
    "metafields",
    "medias",
    "seo",
    "stores",
];

/// Statements sent per round trip when writing repairs
const WRITE_CHUNK: usize = 50;

fn raw_text<'a>(row: &'a Row, column: &str) -> Option<&'a str> {
    match row.get(column) {
        Some(SqlValue::Text(text)) => Some(text.as_str()),
        _ => None,
    }
}

/// Canonical replacement text, or None when the stored text is already canonical
fn repair<T>(column: &str, raw: Option<&str>) -> Option<String>
where
    T: DeserializeOwned + Serialize + Default,
{
    if is_canonical_json_text::<T>(raw) {
        None
    } else {
        Some(encode_json_text(&decode_json_text::<T>(column, raw)))
    }
}

fn repair_column(column: &str, raw: Option<&str>) -> Option<String> {
    match column {
        "tags" | "stores" => repair::<Vec<String>>(column, raw),
        "options" => repair::<Vec<ProductOption>>(column, raw),
        "modifiers" => repair::<Vec<ProductModifier>>(column, raw),
        "metafields" => repair::<Vec<ProductMetafield>>(column, raw),
        "medias" => repair::<Vec<Media>>(column, raw),
        "seo" => repair::<Seo>(column, raw),
        _ => None,
    }
}

/// One UPDATE per product that has at least one non-canonical column, plus per-column counts
fn plan_repairs(products: &QueryResult) -> Result<(Vec<Statement>, BTreeMap<&'static str, usize>)> {
    let mut statements = Vec::new();
    let mut counts: BTreeMap<&'static str, usize> =
        JSON_COLUMNS.iter().map(|column| (*column, 0)).collect();

    for row in &products.rows {
        let id = row.text("id")?;
        let mut values: Vec<(&str, SqlValue)> = Vec::new();
        for column in JSON_COLUMNS {
            if let Some(fixed) = repair_column(column, raw_text(row, column)) {
                *counts.entry(column).or_default() += 1;
                values.push((column, SqlValue::from(fixed)));
            }
        }
        if !values.is_empty() {
            statements.push(sql::update("products", &id, values)?);
        }
    }

    Ok((statements, counts))
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();

    let dry_run = std::env::args().any(|arg| arg == "--dry-run");

    let config = AppConfig::load()?;
    let credentials = resolve_tenant_credentials(&config).await?;
    let transport = HttpTransport::new(
        credentials,
        &config.turso.host_suffix,
        config.request_timeout(),
    )?;
    let db = DatabaseService::new(transport).with_retry(config.retry_policy());

    println!("Connected to database. Scanning products for malformed JSON columns...");

    let query = format!("SELECT id, {} FROM products", JSON_COLUMNS.join(", "));
    let products = db
        .execute_query(Statement::new(query))
        .await
        .context("Failed to read products")?;
    println!("Found {} products", products.rows.len());

    let (statements, counts) = plan_repairs(&products)?;
    for (column, count) in &counts {
        println!("  {:<12} {} to repair", column, count);
    }

    if statements.is_empty() {
        println!("Nothing to repair.");
        return Ok(());
    }
    if dry_run {
        println!("Dry run: {} products would be rewritten.", statements.len());
        return Ok(());
    }

    let total = statements.len();
    let mut written = 0;
    let mut remaining = statements.into_iter().peekable();
    while remaining.peek().is_some() {
        let chunk: Vec<Statement> = remaining.by_ref().take(WRITE_CHUNK).collect();
        written += chunk.len();
        db.execute_batch(chunk)
            .await
            .context("Failed to write repaired columns")?;
        println!("Rewrote {}/{} products", written, total);
    }

    println!("\nNormalization completed successfully!");
    Ok(())
}
