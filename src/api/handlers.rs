use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    Json as RequestJson,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::logic::{
    validate_inventory_item, validate_metafield, validate_modifier, validate_option,
    validate_product, validate_store, validate_taxonomy_entry, VariantPlan,
};
use crate::model::{
    FieldError, Id, InventoryItem, InventoryView, MetafieldDef, ModifierDef, NewMetafieldDef,
    NewModifierDef, NewOptionDef, NewProduct, NewStore, NewTaxonomyEntry, OptionDef, Product,
    ProductFilter, ProductStatus, Store, TaxonomyEntry, TaxonomyKind, ValidationErrors,
};
use crate::storage::ObjectStorage;
use crate::store::traits::CatalogStore;

/// Shared handler state: the catalog store and, when configured, object storage
pub struct AppState<S> {
    pub store: Arc<S>,
    pub storage: Option<Arc<dyn ObjectStorage>>,
}

impl<S> AppState<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            storage: None,
        }
    }

    pub fn with_storage(mut self, storage: Arc<dyn ObjectStorage>) -> Self {
        self.storage = Some(storage);
        self
    }
}

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            storage: self.storage.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

#[derive(Debug, Serialize)]
pub struct ListResponse<T> {
    pub items: Vec<T>,
    pub total: usize,
}

impl<T> From<Vec<T>> for ListResponse<T> {
    fn from(items: Vec<T>) -> Self {
        let total = items.len();
        Self { items, total }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<FieldError>>,
}

impl ErrorResponse {
    pub fn new(message: &str) -> Self {
        Self {
            error: message.to_string(),
            details: None,
        }
    }
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);
pub type ApiResult<T> = Result<Json<T>, ApiError>;

fn not_found(what: &str) -> ApiError {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse::new(&format!("{} not found", what))),
    )
}

fn bad_request(message: &str) -> ApiError {
    (StatusCode::BAD_REQUEST, Json(ErrorResponse::new(message)))
}

fn invalid(errors: ValidationErrors) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: "Validation failed".to_string(),
            details: Some(errors.0),
        }),
    )
}

fn internal(action: &str, e: anyhow::Error) -> ApiError {
    log::error!("{}: {:#}", action, e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse::new(&format!("{}: {}", action, e.root_cause()))),
    )
}

fn deleted(kind: &str, id: &str) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "message": format!("{} deleted successfully", kind),
        "deleted_id": id
    }))
}

// ============================================================================
// Products
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct ProductQuery {
    pub status: Option<String>,
    pub category: Option<String>,
    pub vendor: Option<String>,
    pub search: Option<String>,
}

impl ProductQuery {
    fn into_filter(self) -> Result<ProductFilter, ApiError> {
        let status = match self.status.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(raw.parse::<ProductStatus>().map_err(|e| bad_request(&e))?),
        };
        Ok(ProductFilter {
            status,
            category: self.category,
            vendor: self.vendor,
            search: self.search,
        })
    }
}

pub async fn list_products<S: CatalogStore>(
    State(state): State<AppState<S>>,
    Query(query): Query<ProductQuery>,
) -> ApiResult<ListResponse<Product>> {
    let filter = query.into_filter()?;
    match state.store.list_products(&filter).await {
        Ok(products) => Ok(Json(products.into())),
        Err(e) => Err(internal("Failed to list products", e)),
    }
}

pub async fn get_product<S: CatalogStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<Id>,
) -> ApiResult<Product> {
    match state.store.get_product(&id).await {
        Ok(Some(product)) => Ok(Json(product)),
        Ok(None) => Err(not_found("Product")),
        Err(e) => Err(internal("Failed to fetch product", e)),
    }
}

pub async fn create_product<S: CatalogStore>(
    State(state): State<AppState<S>>,
    RequestJson(new_product): RequestJson<NewProduct>,
) -> Result<(StatusCode, Json<Product>), ApiError> {
    validate_product(&new_product.clone().into_product()).map_err(invalid)?;
    match state.store.create_product(new_product).await {
        Ok(product) => {
            log::info!("created product {} ({})", product.id, product.title);
            Ok((StatusCode::CREATED, Json(product)))
        }
        Err(e) => Err(internal("Failed to create product", e)),
    }
}

/// Replaces every editable field; `id` and `created_at` are kept
pub async fn update_product<S: CatalogStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<Id>,
    RequestJson(update): RequestJson<NewProduct>,
) -> ApiResult<Product> {
    let existing = match state.store.get_product(&id).await {
        Ok(Some(product)) => product,
        Ok(None) => return Err(not_found("Product")),
        Err(e) => return Err(internal("Failed to fetch product", e)),
    };

    let mut product = update.into_product();
    product.id = existing.id;
    product.created_at = existing.created_at;
    validate_product(&product).map_err(invalid)?;

    match state.store.update_product(product).await {
        Ok(Some(product)) => Ok(Json(product)),
        Ok(None) => Err(not_found("Product")),
        Err(e) => Err(internal("Failed to update product", e)),
    }
}

pub async fn delete_product<S: CatalogStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<Id>,
) -> ApiResult<serde_json::Value> {
    match state.store.delete_product(&id).await {
        Ok(true) => Ok(deleted("Product", &id)),
        Ok(false) => Err(not_found("Product")),
        Err(e) => Err(internal("Failed to delete product", e)),
    }
}

// ============================================================================
// Inventory
// ============================================================================

pub async fn list_product_inventory<S: CatalogStore>(
    State(state): State<AppState<S>>,
    Path(product_id): Path<Id>,
) -> ApiResult<ListResponse<InventoryView>> {
    match state.store.get_product(&product_id).await {
        Ok(Some(_)) => {}
        Ok(None) => return Err(not_found("Product")),
        Err(e) => return Err(internal("Failed to fetch product", e)),
    }
    match state.store.list_inventory(&product_id).await {
        Ok(items) => {
            let views: Vec<InventoryView> = items.into_iter().map(InventoryView::from).collect();
            Ok(Json(views.into()))
        }
        Err(e) => Err(internal("Failed to list inventory", e)),
    }
}

pub async fn sync_product_variants<S: CatalogStore>(
    State(state): State<AppState<S>>,
    Path(product_id): Path<Id>,
) -> ApiResult<VariantPlan> {
    match state.store.sync_product_variants(&product_id).await {
        Ok(Some(plan)) => Ok(Json(plan)),
        Ok(None) => Err(not_found("Product")),
        Err(e) => Err(internal("Failed to sync variants", e)),
    }
}

/// Create or replace the inventory row with this id
pub async fn upsert_inventory_item<S: CatalogStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<Id>,
    RequestJson(mut item): RequestJson<InventoryItem>,
) -> ApiResult<InventoryView> {
    item.id = id;
    validate_inventory_item(&item).map_err(invalid)?;

    match state.store.get_product(&item.product_id).await {
        Ok(Some(_)) => {}
        Ok(None) => return Err(not_found("Product")),
        Err(e) => return Err(internal("Failed to fetch product", e)),
    }
    // keep the original creation time on replace
    match state.store.get_inventory_item(&item.id).await {
        Ok(Some(existing)) => item.created_at = existing.created_at,
        Ok(None) => {}
        Err(e) => return Err(internal("Failed to fetch inventory item", e)),
    }

    match state.store.upsert_inventory_item(item).await {
        Ok(item) => Ok(Json(item.into())),
        Err(e) => Err(internal("Failed to save inventory item", e)),
    }
}

pub async fn delete_inventory_item<S: CatalogStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<Id>,
) -> ApiResult<serde_json::Value> {
    match state.store.delete_inventory_item(&id).await {
        Ok(true) => Ok(deleted("Inventory item", &id)),
        Ok(false) => Err(not_found("Inventory item")),
        Err(e) => Err(internal("Failed to delete inventory item", e)),
    }
}

// ============================================================================
// Taxonomy (categories, collections, vendors, brands, tags)
// ============================================================================

fn parse_kind(raw: &str) -> Result<TaxonomyKind, ApiError> {
    raw.parse::<TaxonomyKind>()
        .map_err(|_| not_found(&format!("Taxonomy '{}'", raw)))
}

pub async fn list_taxonomy<S: CatalogStore>(
    State(state): State<AppState<S>>,
    Path(kind): Path<String>,
) -> ApiResult<ListResponse<TaxonomyEntry>> {
    let kind = parse_kind(&kind)?;
    match state.store.list_entries(kind).await {
        Ok(entries) => Ok(Json(entries.into())),
        Err(e) => Err(internal(&format!("Failed to list {}", kind), e)),
    }
}

pub async fn get_taxonomy_entry<S: CatalogStore>(
    State(state): State<AppState<S>>,
    Path((kind, id)): Path<(String, Id)>,
) -> ApiResult<TaxonomyEntry> {
    let kind = parse_kind(&kind)?;
    match state.store.get_entry(kind, &id).await {
        Ok(Some(entry)) => Ok(Json(entry)),
        Ok(None) => Err(not_found("Entry")),
        Err(e) => Err(internal(&format!("Failed to fetch from {}", kind), e)),
    }
}

pub async fn create_taxonomy_entry<S: CatalogStore>(
    State(state): State<AppState<S>>,
    Path(kind): Path<String>,
    RequestJson(new_entry): RequestJson<NewTaxonomyEntry>,
) -> Result<(StatusCode, Json<TaxonomyEntry>), ApiError> {
    let kind = parse_kind(&kind)?;
    validate_taxonomy_entry(&new_entry.clone().into_entry(kind)).map_err(invalid)?;
    match state.store.create_entry(kind, new_entry).await {
        Ok(entry) => Ok((StatusCode::CREATED, Json(entry))),
        Err(e) => Err(internal(&format!("Failed to create entry in {}", kind), e)),
    }
}

pub async fn update_taxonomy_entry<S: CatalogStore>(
    State(state): State<AppState<S>>,
    Path((kind, id)): Path<(String, Id)>,
    RequestJson(update): RequestJson<NewTaxonomyEntry>,
) -> ApiResult<TaxonomyEntry> {
    let kind = parse_kind(&kind)?;
    let existing = match state.store.get_entry(kind, &id).await {
        Ok(Some(entry)) => entry,
        Ok(None) => return Err(not_found("Entry")),
        Err(e) => return Err(internal(&format!("Failed to fetch from {}", kind), e)),
    };

    let mut entry = update.into_entry(kind);
    entry.id = existing.id;
    entry.created_at = existing.created_at;
    validate_taxonomy_entry(&entry).map_err(invalid)?;

    match state.store.update_entry(kind, entry).await {
        Ok(Some(entry)) => Ok(Json(entry)),
        Ok(None) => Err(not_found("Entry")),
        Err(e) => Err(internal(&format!("Failed to update entry in {}", kind), e)),
    }
}

pub async fn delete_taxonomy_entry<S: CatalogStore>(
    State(state): State<AppState<S>>,
    Path((kind, id)): Path<(String, Id)>,
) -> ApiResult<serde_json::Value> {
    let kind = parse_kind(&kind)?;
    match state.store.delete_entry(kind, &id).await {
        Ok(true) => Ok(deleted("Entry", &id)),
        Ok(false) => Err(not_found("Entry")),
        Err(e) => Err(internal(&format!("Failed to delete from {}", kind), e)),
    }
}

// ============================================================================
// Options, metafields and modifiers
// ============================================================================

pub async fn list_options<S: CatalogStore>(
    State(state): State<AppState<S>>,
) -> ApiResult<ListResponse<OptionDef>> {
    match state.store.list_options().await {
        Ok(options) => Ok(Json(options.into())),
        Err(e) => Err(internal("Failed to list options", e)),
    }
}

pub async fn get_option<S: CatalogStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<Id>,
) -> ApiResult<OptionDef> {
    match state.store.get_option(&id).await {
        Ok(Some(option)) => Ok(Json(option)),
        Ok(None) => Err(not_found("Option")),
        Err(e) => Err(internal("Failed to fetch option", e)),
    }
}

pub async fn create_option<S: CatalogStore>(
    State(state): State<AppState<S>>,
    RequestJson(new_option): RequestJson<NewOptionDef>,
) -> Result<(StatusCode, Json<OptionDef>), ApiError> {
    validate_option(&new_option.clone().into_def()).map_err(invalid)?;
    match state.store.create_option(new_option).await {
        Ok(option) => Ok((StatusCode::CREATED, Json(option))),
        Err(e) => Err(internal("Failed to create option", e)),
    }
}

pub async fn update_option<S: CatalogStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<Id>,
    RequestJson(update): RequestJson<NewOptionDef>,
) -> ApiResult<OptionDef> {
    let existing = match state.store.get_option(&id).await {
        Ok(Some(option)) => option,
        Ok(None) => return Err(not_found("Option")),
        Err(e) => return Err(internal("Failed to fetch option", e)),
    };
    let mut option = update.into_def();
    option.id = existing.id;
    option.created_at = existing.created_at;
    validate_option(&option).map_err(invalid)?;

    match state.store.update_option(option).await {
        Ok(Some(option)) => Ok(Json(option)),
        Ok(None) => Err(not_found("Option")),
        Err(e) => Err(internal("Failed to update option", e)),
    }
}

pub async fn delete_option<S: CatalogStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<Id>,
) -> ApiResult<serde_json::Value> {
    match state.store.delete_option(&id).await {
        Ok(true) => Ok(deleted("Option", &id)),
        Ok(false) => Err(not_found("Option")),
        Err(e) => Err(internal("Failed to delete option", e)),
    }
}

pub async fn list_metafields<S: CatalogStore>(
    State(state): State<AppState<S>>,
) -> ApiResult<ListResponse<MetafieldDef>> {
    match state.store.list_metafields().await {
        Ok(metafields) => Ok(Json(metafields.into())),
        Err(e) => Err(internal("Failed to list metafields", e)),
    }
}

pub async fn get_metafield<S: CatalogStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<Id>,
) -> ApiResult<MetafieldDef> {
    match state.store.get_metafield(&id).await {
        Ok(Some(metafield)) => Ok(Json(metafield)),
        Ok(None) => Err(not_found("Metafield")),
        Err(e) => Err(internal("Failed to fetch metafield", e)),
    }
}

pub async fn create_metafield<S: CatalogStore>(
    State(state): State<AppState<S>>,
    RequestJson(new_metafield): RequestJson<NewMetafieldDef>,
) -> Result<(StatusCode, Json<MetafieldDef>), ApiError> {
    validate_metafield(&new_metafield.clone().into_def()).map_err(invalid)?;
    match state.store.create_metafield(new_metafield).await {
        Ok(metafield) => Ok((StatusCode::CREATED, Json(metafield))),
        Err(e) => Err(internal("Failed to create metafield", e)),
    }
}

pub async fn update_metafield<S: CatalogStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<Id>,
    RequestJson(update): RequestJson<NewMetafieldDef>,
) -> ApiResult<MetafieldDef> {
    let existing = match state.store.get_metafield(&id).await {
        Ok(Some(metafield)) => metafield,
        Ok(None) => return Err(not_found("Metafield")),
        Err(e) => return Err(internal("Failed to fetch metafield", e)),
    };
    let mut metafield = update.into_def();
    metafield.id = existing.id;
    metafield.created_at = existing.created_at;
    validate_metafield(&metafield).map_err(invalid)?;

    match state.store.update_metafield(metafield).await {
        Ok(Some(metafield)) => Ok(Json(metafield)),
        Ok(None) => Err(not_found("Metafield")),
        Err(e) => Err(internal("Failed to update metafield", e)),
    }
}

pub async fn delete_metafield<S: CatalogStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<Id>,
) -> ApiResult<serde_json::Value> {
    match state.store.delete_metafield(&id).await {
        Ok(true) => Ok(deleted("Metafield", &id)),
        Ok(false) => Err(not_found("Metafield")),
        Err(e) => Err(internal("Failed to delete metafield", e)),
    }
}

pub async fn list_modifiers<S: CatalogStore>(
    State(state): State<AppState<S>>,
) -> ApiResult<ListResponse<ModifierDef>> {
    match state.store.list_modifiers().await {
        Ok(modifiers) => Ok(Json(modifiers.into())),
        Err(e) => Err(internal("Failed to list modifiers", e)),
    }
}

pub async fn get_modifier<S: CatalogStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<Id>,
) -> ApiResult<ModifierDef> {
    match state.store.get_modifier(&id).await {
        Ok(Some(modifier)) => Ok(Json(modifier)),
        Ok(None) => Err(not_found("Modifier")),
        Err(e) => Err(internal("Failed to fetch modifier", e)),
    }
}

pub async fn create_modifier<S: CatalogStore>(
    State(state): State<AppState<S>>,
    RequestJson(new_modifier): RequestJson<NewModifierDef>,
) -> Result<(StatusCode, Json<ModifierDef>), ApiError> {
    validate_modifier(&new_modifier.clone().into_def()).map_err(invalid)?;
    match state.store.create_modifier(new_modifier).await {
        Ok(modifier) => Ok((StatusCode::CREATED, Json(modifier))),
        Err(e) => Err(internal("Failed to create modifier", e)),
    }
}

pub async fn update_modifier<S: CatalogStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<Id>,
    RequestJson(update): RequestJson<NewModifierDef>,
) -> ApiResult<ModifierDef> {
    let existing = match state.store.get_modifier(&id).await {
        Ok(Some(modifier)) => modifier,
        Ok(None) => return Err(not_found("Modifier")),
        Err(e) => return Err(internal("Failed to fetch modifier", e)),
    };
    let mut modifier = update.into_def();
    modifier.id = existing.id;
    modifier.created_at = existing.created_at;
    validate_modifier(&modifier).map_err(invalid)?;

    match state.store.update_modifier(modifier).await {
        Ok(Some(modifier)) => Ok(Json(modifier)),
        Ok(None) => Err(not_found("Modifier")),
        Err(e) => Err(internal("Failed to update modifier", e)),
    }
}

pub async fn delete_modifier<S: CatalogStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<Id>,
) -> ApiResult<serde_json::Value> {
    match state.store.delete_modifier(&id).await {
        Ok(true) => Ok(deleted("Modifier", &id)),
        Ok(false) => Err(not_found("Modifier")),
        Err(e) => Err(internal("Failed to delete modifier", e)),
    }
}

// ============================================================================
// Stores
// ============================================================================

pub async fn list_stores<S: CatalogStore>(
    State(state): State<AppState<S>>,
) -> ApiResult<ListResponse<Store>> {
    match state.store.list_stores().await {
        Ok(stores) => Ok(Json(stores.into())),
        Err(e) => Err(internal("Failed to list stores", e)),
    }
}

pub async fn get_store<S: CatalogStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<Id>,
) -> ApiResult<Store> {
    match state.store.get_store(&id).await {
        Ok(Some(store)) => Ok(Json(store)),
        Ok(None) => Err(not_found("Store")),
        Err(e) => Err(internal("Failed to fetch store", e)),
    }
}

pub async fn create_store<S: CatalogStore>(
    State(state): State<AppState<S>>,
    RequestJson(new_store): RequestJson<NewStore>,
) -> Result<(StatusCode, Json<Store>), ApiError> {
    validate_store(&new_store.clone().into_store()).map_err(invalid)?;
    match state.store.create_store(new_store).await {
        Ok(store) => Ok((StatusCode::CREATED, Json(store))),
        Err(e) => Err(internal("Failed to create store", e)),
    }
}

pub async fn update_store<S: CatalogStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<Id>,
    RequestJson(update): RequestJson<NewStore>,
) -> ApiResult<Store> {
    let existing = match state.store.get_store(&id).await {
        Ok(Some(store)) => store,
        Ok(None) => return Err(not_found("Store")),
        Err(e) => return Err(internal("Failed to fetch store", e)),
    };
    let mut store = update.into_store();
    store.id = existing.id;
    store.created_at = existing.created_at;
    validate_store(&store).map_err(invalid)?;

    match state.store.update_store(store).await {
        Ok(Some(store)) => Ok(Json(store)),
        Ok(None) => Err(not_found("Store")),
        Err(e) => Err(internal("Failed to update store", e)),
    }
}

pub async fn delete_store<S: CatalogStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<Id>,
) -> ApiResult<serde_json::Value> {
    match state.store.delete_store(&id).await {
        Ok(true) => Ok(deleted("Store", &id)),
        Ok(false) => Err(not_found("Store")),
        Err(e) => Err(internal("Failed to delete store", e)),
    }
}

// ============================================================================
// Uploads
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct PresignUploadRequest {
    pub owner_id: String,
    pub content_type: String,
    #[serde(default)]
    pub file_name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PresignUploadResponse {
    pub key: String,
    pub upload_url: String,
    pub public_url: String,
    /// Headers the client must send with the PUT
    pub headers: BTreeMap<String, String>,
    pub expires_in_secs: u64,
}

pub async fn presign_upload<S: CatalogStore>(
    State(state): State<AppState<S>>,
    RequestJson(request): RequestJson<PresignUploadRequest>,
) -> ApiResult<PresignUploadResponse> {
    let Some(storage) = state.storage.as_ref() else {
        return Err((
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ErrorResponse::new("Object storage is not configured")),
        ));
    };

    let mut errors = Vec::new();
    if request.owner_id.trim().is_empty() {
        errors.push(FieldError::new("owner_id", "must not be empty"));
    }
    if request.content_type.trim().is_empty() {
        errors.push(FieldError::new("content_type", "must not be empty"));
    }
    ValidationErrors::into_result(errors).map_err(invalid)?;

    // the bytes are not known yet, so the key hashes a one-off seed instead
    let seed = format!(
        "{}:{}:{}",
        request.owner_id,
        request.file_name.as_deref().unwrap_or_default(),
        uuid::Uuid::new_v4()
    );
    let key = storage.object_key(&request.owner_id, seed.as_bytes(), &request.content_type);

    match storage.presign_put(&key, &request.content_type).await {
        Ok(presigned) => Ok(Json(PresignUploadResponse {
            public_url: storage.public_url(&key),
            key,
            upload_url: presigned.url,
            headers: presigned.headers.into_iter().collect(),
            expires_in_secs: presigned.expires_in.as_secs(),
        })),
        Err(e) => Err(internal("Failed to presign upload", e.into())),
    }
}
