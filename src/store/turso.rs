use std::time::Duration;

use anyhow::{Context, Result};

use crate::logic::{reconcile_variants, VariantPlan};
use crate::model::{
    now_timestamp, Id, InventoryItem, MetafieldDef, ModifierDef, NewMetafieldDef, NewModifierDef,
    NewOptionDef, NewProduct, NewStore, NewTaxonomyEntry, OptionDef, Product, ProductFilter, Store,
    TaxonomyEntry, TaxonomyKind, TursoCredentials,
};
use crate::store::rows::taxonomy_row;
use crate::store::schema::SCHEMA;
use crate::store::traits::{
    AttributeStore, InventoryStore, ProductStore, StoreLocationStore, TaxonomyStore,
};
use crate::turso::{
    sql, DatabaseService, FromRow, HttpTransport, RetryPolicy, SqlTransport, SqlValue, Statement,
    ToRow,
};

const PRODUCTS: &str = "products";
const INVENTORY: &str = "inventory";
const OPTIONS: &str = "options";
const METAFIELDS: &str = "metafields";
const MODIFIERS: &str = "modifiers";
const STORES: &str = "stores";

/// Catalog data access over one tenant database
#[derive(Debug, Clone)]
pub struct TursoStore<T> {
    db: DatabaseService<T>,
}

impl TursoStore<HttpTransport> {
    /// Connect to a tenant database over HTTP
    pub fn connect(
        credentials: TursoCredentials,
        host_suffix: &str,
        timeout: Duration,
        retry: RetryPolicy,
    ) -> Result<Self> {
        let transport = HttpTransport::new(credentials, host_suffix, timeout)
            .context("Failed to build HTTP client")?;
        log::info!("using SQL gateway at {}", transport.url());
        Ok(Self::new(DatabaseService::new(transport).with_retry(retry)))
    }
}

impl<T: SqlTransport> TursoStore<T> {
    pub fn new(db: DatabaseService<T>) -> Self {
        Self { db }
    }

    pub fn database(&self) -> &DatabaseService<T> {
        &self.db
    }

    /// Create any missing tables
    pub async fn migrate(&self) -> Result<()> {
        let statements = SCHEMA.iter().map(|ddl| Statement::new(*ddl)).collect();
        self.db
            .execute_batch(statements)
            .await
            .context("Failed to apply catalog schema")?;
        Ok(())
    }

    async fn fetch_all<R: FromRow>(&self, statement: Statement) -> Result<Vec<R>> {
        let result = self.db.execute_query(statement).await?;
        Ok(result.decode()?)
    }

    async fn fetch_by_id<R: FromRow>(&self, table: &str, id: &str) -> Result<Option<R>> {
        let result = self.db.execute_query(sql::select_by_id(table, id)?).await?;
        Ok(result.decode_first()?)
    }

    async fn insert_row(&self, table: &str, values: Vec<(&str, SqlValue)>) -> Result<()> {
        self.db
            .execute_query(sql::insert(table, values)?)
            .await
            .with_context(|| format!("Failed to insert into {}", table))?;
        Ok(())
    }

    /// Writes every column except `id` and `created_at`; false when no row matched
    async fn update_row(&self, table: &str, id: &str, values: Vec<(&str, SqlValue)>) -> Result<bool> {
        let assignments = values
            .into_iter()
            .filter(|(column, _)| *column != "id" && *column != "created_at")
            .collect();
        let result = self
            .db
            .execute_query(sql::update(table, id, assignments)?)
            .await
            .with_context(|| format!("Failed to update {}", table))?;
        Ok(result.affected_row_count > 0)
    }

    async fn delete_row(&self, table: &str, id: &str) -> Result<bool> {
        let result = self
            .db
            .execute_query(sql::delete(table, id)?)
            .await
            .with_context(|| format!("Failed to delete from {}", table))?;
        Ok(result.affected_row_count > 0)
    }

    /// Insert `record`, then hand it back
    async fn create_record<R: ToRow>(&self, table: &str, record: R) -> Result<R> {
        self.insert_row(table, record.to_row()).await?;
        Ok(record)
    }

    /// Bump `updated_at` and write; `None` when the row is gone
    async fn update_record<R: ToRow>(
        &self,
        table: &str,
        id: &str,
        record: R,
    ) -> Result<Option<R>> {
        if self.update_row(table, id, record.to_row()).await? {
            Ok(Some(record))
        } else {
            Ok(None)
        }
    }
}

/// `%value%` with LIKE wildcards in the input escaped
fn like_pattern(value: &str) -> String {
    let escaped = value
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

fn product_list_statement(filter: &ProductFilter) -> Statement {
    let mut clauses: Vec<&str> = Vec::new();
    let mut args: Vec<SqlValue> = Vec::new();

    if let Some(status) = filter.status {
        clauses.push("status = ?");
        args.push(status.to_string().into());
    }
    if let Some(category) = filter.category.as_deref().filter(|c| !c.is_empty()) {
        clauses.push("category = ?");
        args.push(category.into());
    }
    if let Some(vendor) = filter.vendor.as_deref().filter(|v| !v.is_empty()) {
        clauses.push("vendor = ?");
        args.push(vendor.into());
    }
    if let Some(search) = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        clauses.push("(title LIKE ? ESCAPE '\\' OR sku LIKE ? ESCAPE '\\')");
        let pattern = like_pattern(search);
        args.push(pattern.clone().into());
        args.push(pattern.into());
    }

    let mut query = format!("SELECT * FROM {}", PRODUCTS);
    if !clauses.is_empty() {
        query.push_str(" WHERE ");
        query.push_str(&clauses.join(" AND "));
    }
    query.push_str(" ORDER BY updated_at DESC");
    Statement::new(query).with_args(args)
}

#[async_trait::async_trait]
impl<T: SqlTransport> ProductStore for TursoStore<T> {
    async fn list_products(&self, filter: &ProductFilter) -> Result<Vec<Product>> {
        self.fetch_all(product_list_statement(filter))
            .await
            .context("Failed to list products")
    }

    async fn get_product(&self, id: &Id) -> Result<Option<Product>> {
        self.fetch_by_id(PRODUCTS, id)
            .await
            .context("Failed to fetch product")
    }

    async fn create_product(&self, product: NewProduct) -> Result<Product> {
        self.create_record(PRODUCTS, product.into_product()).await
    }

    async fn update_product(&self, mut product: Product) -> Result<Option<Product>> {
        product.updated_at = now_timestamp();
        let id = product.id.clone();
        self.update_record(PRODUCTS, &id, product).await
    }

    async fn delete_product(&self, id: &Id) -> Result<bool> {
        let results = self
            .db
            .execute_transaction(vec![
                sql::delete_where(INVENTORY, "product_id", id.as_str())?,
                sql::delete(PRODUCTS, id)?,
            ])
            .await
            .context("Failed to delete product")?;
        Ok(results
            .get(1)
            .map(|r| r.affected_row_count > 0)
            .unwrap_or(false))
    }
}

#[async_trait::async_trait]
impl<T: SqlTransport> InventoryStore for TursoStore<T> {
    async fn list_inventory(&self, product_id: &Id) -> Result<Vec<InventoryItem>> {
        let statement = sql::select_where(INVENTORY, "product_id", product_id.as_str(), "created_at")?;
        self.fetch_all(statement)
            .await
            .context("Failed to list inventory")
    }

    async fn get_inventory_item(&self, id: &Id) -> Result<Option<InventoryItem>> {
        self.fetch_by_id(INVENTORY, id)
            .await
            .context("Failed to fetch inventory item")
    }

    async fn upsert_inventory_item(&self, mut item: InventoryItem) -> Result<InventoryItem> {
        item.updated_at = now_timestamp();
        if item.created_at.is_empty() {
            item.created_at = item.updated_at.clone();
        }
        self.db
            .execute_query(sql::upsert(INVENTORY, item.to_row())?)
            .await
            .context("Failed to save inventory item")?;
        Ok(item)
    }

    async fn delete_inventory_item(&self, id: &Id) -> Result<bool> {
        self.delete_row(INVENTORY, id).await
    }

    async fn sync_product_variants(&self, product_id: &Id) -> Result<Option<VariantPlan>> {
        let Some(product) = self.get_product(product_id).await? else {
            return Ok(None);
        };
        let existing = self.list_inventory(product_id).await?;
        let plan = reconcile_variants(&product, &existing);

        if plan.is_noop() {
            log::debug!("variants for product {} already in sync", product_id);
            return Ok(Some(plan));
        }

        let mut statements = Vec::with_capacity(plan.create.len() + plan.remove.len());
        for item in &plan.remove {
            statements.push(sql::delete(INVENTORY, &item.id)?);
        }
        for item in &plan.create {
            statements.push(sql::insert(INVENTORY, item.to_row())?);
        }
        self.db
            .execute_transaction(statements)
            .await
            .context("Failed to apply variant changes")?;

        log::info!(
            "synced variants for product {}: {} created, {} kept, {} removed",
            product_id,
            plan.create.len(),
            plan.keep.len(),
            plan.remove.len()
        );
        Ok(Some(plan))
    }
}

#[async_trait::async_trait]
impl<T: SqlTransport> TaxonomyStore for TursoStore<T> {
    async fn list_entries(&self, kind: TaxonomyKind) -> Result<Vec<TaxonomyEntry>> {
        self.fetch_all(sql::select_all(kind.table(), "name")?)
            .await
            .with_context(|| format!("Failed to list {}", kind))
    }

    async fn get_entry(&self, kind: TaxonomyKind, id: &Id) -> Result<Option<TaxonomyEntry>> {
        self.fetch_by_id(kind.table(), id)
            .await
            .with_context(|| format!("Failed to fetch from {}", kind))
    }

    async fn create_entry(&self, kind: TaxonomyKind, entry: NewTaxonomyEntry) -> Result<TaxonomyEntry> {
        let entry = entry.into_entry(kind);
        self.insert_row(kind.table(), taxonomy_row(kind, &entry)).await?;
        Ok(entry)
    }

    async fn update_entry(
        &self,
        kind: TaxonomyKind,
        mut entry: TaxonomyEntry,
    ) -> Result<Option<TaxonomyEntry>> {
        entry.updated_at = now_timestamp();
        if !kind.has_parent() {
            entry.parent_id = None;
        }
        let updated = self
            .update_row(kind.table(), &entry.id, taxonomy_row(kind, &entry))
            .await?;
        Ok(updated.then_some(entry))
    }

    async fn delete_entry(&self, kind: TaxonomyKind, id: &Id) -> Result<bool> {
        self.delete_row(kind.table(), id).await
    }
}

#[async_trait::async_trait]
impl<T: SqlTransport> AttributeStore for TursoStore<T> {
    async fn list_options(&self) -> Result<Vec<OptionDef>> {
        self.fetch_all(sql::select_all(OPTIONS, "title")?).await
    }

    async fn get_option(&self, id: &Id) -> Result<Option<OptionDef>> {
        self.fetch_by_id(OPTIONS, id).await
    }

    async fn create_option(&self, option: NewOptionDef) -> Result<OptionDef> {
        self.create_record(OPTIONS, option.into_def()).await
    }

    async fn update_option(&self, mut option: OptionDef) -> Result<Option<OptionDef>> {
        option.updated_at = now_timestamp();
        let id = option.id.clone();
        self.update_record(OPTIONS, &id, option).await
    }

    async fn delete_option(&self, id: &Id) -> Result<bool> {
        self.delete_row(OPTIONS, id).await
    }

    async fn list_metafields(&self) -> Result<Vec<MetafieldDef>> {
        self.fetch_all(sql::select_all(METAFIELDS, "title")?).await
    }

    async fn get_metafield(&self, id: &Id) -> Result<Option<MetafieldDef>> {
        self.fetch_by_id(METAFIELDS, id).await
    }

    async fn create_metafield(&self, metafield: NewMetafieldDef) -> Result<MetafieldDef> {
        self.create_record(METAFIELDS, metafield.into_def()).await
    }

    async fn update_metafield(&self, mut metafield: MetafieldDef) -> Result<Option<MetafieldDef>> {
        metafield.updated_at = now_timestamp();
        let id = metafield.id.clone();
        self.update_record(METAFIELDS, &id, metafield).await
    }

    async fn delete_metafield(&self, id: &Id) -> Result<bool> {
        self.delete_row(METAFIELDS, id).await
    }

    async fn list_modifiers(&self) -> Result<Vec<ModifierDef>> {
        self.fetch_all(sql::select_all(MODIFIERS, "title")?).await
    }

    async fn get_modifier(&self, id: &Id) -> Result<Option<ModifierDef>> {
        self.fetch_by_id(MODIFIERS, id).await
    }

    async fn create_modifier(&self, modifier: NewModifierDef) -> Result<ModifierDef> {
        self.create_record(MODIFIERS, modifier.into_def()).await
    }

    async fn update_modifier(&self, mut modifier: ModifierDef) -> Result<Option<ModifierDef>> {
        modifier.updated_at = now_timestamp();
        let id = modifier.id.clone();
        self.update_record(MODIFIERS, &id, modifier).await
    }

    async fn delete_modifier(&self, id: &Id) -> Result<bool> {
        self.delete_row(MODIFIERS, id).await
    }
}

#[async_trait::async_trait]
impl<T: SqlTransport> StoreLocationStore for TursoStore<T> {
    async fn list_stores(&self) -> Result<Vec<Store>> {
        self.fetch_all(sql::select_all(STORES, "title")?)
            .await
            .context("Failed to list stores")
    }

    async fn get_store(&self, id: &Id) -> Result<Option<Store>> {
        self.fetch_by_id(STORES, id).await
    }

    async fn create_store(&self, store: NewStore) -> Result<Store> {
        self.create_record(STORES, store.into_store()).await
    }

    async fn update_store(&self, mut store: Store) -> Result<Option<Store>> {
        store.updated_at = now_timestamp();
        let id = store.id.clone();
        self.update_record(STORES, &id, store).await
    }

    async fn delete_store(&self, id: &Id) -> Result<bool> {
        self.delete_row(STORES, id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ProductOption, ProductStatus};
    use crate::turso::protocol::{
        BatchResult, Column, PipelineRequest, PipelineResponse, StmtResult, StreamRequest,
        StreamResponse, StreamResult,
    };
    use crate::turso::DatabaseError;
    use parking_lot::Mutex;
    use std::collections::VecDeque;
    use std::sync::Arc;

    #[derive(Default)]
    struct Recorder {
        responses: Mutex<VecDeque<PipelineResponse>>,
        sent: Mutex<Vec<PipelineRequest>>,
    }

    #[async_trait::async_trait]
    impl SqlTransport for Recorder {
        async fn send(&self, request: &PipelineRequest) -> Result<PipelineResponse, DatabaseError> {
            self.sent.lock().push(request.clone());
            Ok(self
                .responses
                .lock()
                .pop_front()
                .unwrap_or_else(|| PipelineResponse::from_results(vec![StmtResult::default()])))
        }
    }

    fn store(recorder: &Arc<Recorder>) -> TursoStore<Arc<Recorder>> {
        TursoStore::new(
            DatabaseService::new(Arc::clone(recorder)).with_retry(RetryPolicy::immediate(1)),
        )
    }

    fn rows_of(records: Vec<Vec<(&'static str, SqlValue)>>) -> StmtResult {
        let cols = records
            .first()
            .map(|r| {
                r.iter()
                    .map(|(name, _)| Column { name: Some(name.to_string()), decltype: None })
                    .collect()
            })
            .unwrap_or_default();
        StmtResult {
            cols,
            rows: records
                .into_iter()
                .map(|r| r.into_iter().map(|(_, v)| v).collect())
                .collect(),
            ..Default::default()
        }
    }

    fn affected(n: u64) -> PipelineResponse {
        PipelineResponse::from_results(vec![StmtResult { affected_row_count: n, ..Default::default() }])
    }

    fn transaction_ok(steps: usize) -> PipelineResponse {
        PipelineResponse {
            baton: None,
            base_url: None,
            results: vec![StreamResult::Ok {
                response: StreamResponse::Batch {
                    result: BatchResult {
                        step_results: (0..steps)
                            .map(|_| Some(StmtResult { affected_row_count: 1, ..Default::default() }))
                            .collect(),
                        step_errors: vec![None; steps],
                    },
                },
            }],
        }
    }

    fn first_stmt(request: &PipelineRequest) -> Statement {
        request.statements()[0].clone()
    }

    #[test]
    fn test_product_filter_builds_parameterized_where() {
        let stmt = product_list_statement(&ProductFilter {
            status: Some(ProductStatus::Draft),
            category: Some("Shoes".into()),
            vendor: None,
            search: Some("50%_off".into()),
        });
        assert_eq!(
            stmt.sql,
            "SELECT * FROM products WHERE status = ? AND category = ? AND \
             (title LIKE ? ESCAPE '\\' OR sku LIKE ? ESCAPE '\\') ORDER BY updated_at DESC"
        );
        assert_eq!(
            stmt.args,
            vec![
                SqlValue::from("draft"),
                SqlValue::from("Shoes"),
                SqlValue::from("%50\\%\\_off%"),
                SqlValue::from("%50\\%\\_off%"),
            ]
        );

        let all = product_list_statement(&ProductFilter::default());
        assert_eq!(all.sql, "SELECT * FROM products ORDER BY updated_at DESC");
        assert!(all.args.is_empty());
    }

    #[tokio::test]
    async fn test_create_product_inserts_every_column() {
        let recorder = Arc::new(Recorder::default());
        let store = store(&recorder);

        let product = store
            .create_product(NewProduct { title: "O'Brien Mug".into(), ..Default::default() })
            .await
            .unwrap();

        let sent = recorder.sent.lock();
        let stmt = first_stmt(&sent[0]);
        assert!(stmt.sql.starts_with("INSERT INTO products (id, title, description, type, status"));
        assert_eq!(stmt.args[0], SqlValue::from(&product.id));
        // quotes travel as arguments, not spliced text
        assert_eq!(stmt.args[1], SqlValue::from("O'Brien Mug"));
        assert!(!stmt.sql.contains("O'Brien"));
    }

    #[tokio::test]
    async fn test_get_product_decodes_row() {
        let recorder = Arc::new(Recorder::default());
        let product = NewProduct {
            title: "Tee".into(),
            options: vec![ProductOption { title: "Size".into(), values: vec!["S".into()] }],
            ..Default::default()
        }
        .into_product();
        recorder
            .responses
            .lock()
            .push_back(PipelineResponse::from_results(vec![rows_of(vec![product.to_row()])]));

        let fetched = store(&recorder).get_product(&product.id).await.unwrap();
        assert_eq!(fetched, Some(product));
    }

    #[tokio::test]
    async fn test_get_missing_product_is_none() {
        let recorder = Arc::new(Recorder::default());
        let fetched = store(&recorder).get_product(&"nope".to_string()).await.unwrap();
        assert_eq!(fetched, None);
    }

    #[tokio::test]
    async fn test_update_reports_missing_rows() {
        let recorder = Arc::new(Recorder::default());
        recorder.responses.lock().push_back(affected(0));
        let product = NewProduct { title: "Gone".into(), ..Default::default() }.into_product();

        let result = store(&recorder).update_product(product).await.unwrap();
        assert_eq!(result, None);

        let sent = recorder.sent.lock();
        let stmt = first_stmt(&sent[0]);
        assert!(stmt.sql.starts_with("UPDATE products SET title = ?"));
        assert!(!stmt.sql.contains("created_at"));
        assert!(stmt.sql.ends_with("WHERE id = ?"));
    }

    #[tokio::test]
    async fn test_delete_product_removes_inventory_in_same_transaction() {
        let recorder = Arc::new(Recorder::default());
        recorder.responses.lock().push_back(transaction_ok(5));

        let deleted = store(&recorder).delete_product(&"p1".to_string()).await.unwrap();
        assert!(deleted);

        let sent = recorder.sent.lock();
        assert_eq!(sent.len(), 1);
        assert!(matches!(sent[0].requests[0], StreamRequest::Batch { .. }));
        let sqls: Vec<String> = sent[0].statements().iter().map(|s| s.sql.clone()).collect();
        assert_eq!(
            sqls,
            vec![
                "BEGIN",
                "DELETE FROM inventory WHERE product_id = ?",
                "DELETE FROM products WHERE id = ?",
                "COMMIT",
                "ROLLBACK"
            ]
        );
    }

    #[tokio::test]
    async fn test_sync_variants_creates_missing_combinations() {
        let recorder = Arc::new(Recorder::default());
        let product = NewProduct {
            title: "Tee".into(),
            sku: "TEE".into(),
            options: vec![ProductOption { title: "Size".into(), values: vec!["S".into(), "M".into()] }],
            ..Default::default()
        }
        .into_product();
        let mut small = InventoryItem::for_product(product.id.clone());
        small.option1 = "S".into();
        let mut stale = InventoryItem::for_product(product.id.clone());
        stale.option1 = "XXL".into();

        {
            let mut responses = recorder.responses.lock();
            responses.push_back(PipelineResponse::from_results(vec![rows_of(vec![product.to_row()])]));
            responses.push_back(PipelineResponse::from_results(vec![rows_of(vec![
                small.to_row(),
                stale.to_row(),
            ])]));
            responses.push_back(transaction_ok(5));
        }

        let plan = store(&recorder)
            .sync_product_variants(&product.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(plan.keep.len(), 1);
        assert_eq!(plan.remove, vec![stale.clone()]);
        assert_eq!(plan.create.len(), 1);
        assert_eq!(plan.create[0].sku, "TEE-M");

        let sent = recorder.sent.lock();
        assert_eq!(sent.len(), 3);
        let tx: Vec<&Statement> = sent[2].statements();
        assert_eq!(tx[1].sql, "DELETE FROM inventory WHERE id = ?");
        assert_eq!(tx[1].args, vec![SqlValue::from(&stale.id)]);
        assert!(tx[2].sql.starts_with("INSERT INTO inventory"));
    }

    #[tokio::test]
    async fn test_sync_variants_for_unknown_product_is_none() {
        let recorder = Arc::new(Recorder::default());
        let plan = store(&recorder)
            .sync_product_variants(&"missing".to_string())
            .await
            .unwrap();
        assert!(plan.is_none());
        assert_eq!(recorder.sent.lock().len(), 1);
    }

    #[tokio::test]
    async fn test_taxonomy_uses_kind_table() {
        let recorder = Arc::new(Recorder::default());
        let store = store(&recorder);
        store.list_entries(TaxonomyKind::Brand).await.unwrap();
        store
            .create_entry(
                TaxonomyKind::Vendor,
                NewTaxonomyEntry { name: "Acme".into(), parent_id: Some("x".into()), ..Default::default() },
            )
            .await
            .unwrap();

        let sent = recorder.sent.lock();
        assert_eq!(first_stmt(&sent[0]).sql, "SELECT * FROM brands ORDER BY name");
        let insert = first_stmt(&sent[1]);
        assert_eq!(
            insert.sql,
            "INSERT INTO vendors (id, name, image, notes, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?)"
        );
    }

    #[tokio::test]
    async fn test_migrate_sends_schema_in_one_pipeline() {
        let recorder = Arc::new(Recorder::default());
        recorder.responses.lock().push_back(PipelineResponse::from_results(
            SCHEMA.iter().map(|_| StmtResult::default()).collect(),
        ));
        store(&recorder).migrate().await.unwrap();

        let sent = recorder.sent.lock();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].statements().len(), SCHEMA.len());
    }

    #[tokio::test]
    async fn test_upsert_inventory_fills_timestamps() {
        let recorder = Arc::new(Recorder::default());
        let mut item = InventoryItem::for_product("p1".into());
        item.created_at = String::new();

        let saved = store(&recorder).upsert_inventory_item(item).await.unwrap();
        assert!(!saved.created_at.is_empty());
        assert_eq!(saved.created_at, saved.updated_at);

        let sent = recorder.sent.lock();
        assert!(first_stmt(&sent[0]).sql.contains("ON CONFLICT(id) DO UPDATE SET"));
    }
}
