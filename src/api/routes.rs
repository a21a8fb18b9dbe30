use axum::{
    routing::{get, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

use crate::api::handlers::{self, AppState};
use crate::store::traits::CatalogStore;

pub fn create_router<S: CatalogStore + 'static>() -> Router<AppState<S>> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Products
        .route(
            "/products",
            get(handlers::list_products::<S>).post(handlers::create_product::<S>),
        )
        .route(
            "/products/:id",
            get(handlers::get_product::<S>)
                .put(handlers::update_product::<S>)
                .delete(handlers::delete_product::<S>),
        )
        .route(
            "/products/:id/inventory",
            get(handlers::list_product_inventory::<S>),
        )
        .route(
            "/products/:id/variants/sync",
            post(handlers::sync_product_variants::<S>),
        )
        // Inventory rows
        .route(
            "/inventory/:id",
            put(handlers::upsert_inventory_item::<S>).delete(handlers::delete_inventory_item::<S>),
        )
        // Categories, collections, vendors, brands and tags
        .route(
            "/taxonomy/:kind",
            get(handlers::list_taxonomy::<S>).post(handlers::create_taxonomy_entry::<S>),
        )
        .route(
            "/taxonomy/:kind/:id",
            get(handlers::get_taxonomy_entry::<S>)
                .put(handlers::update_taxonomy_entry::<S>)
                .delete(handlers::delete_taxonomy_entry::<S>),
        )
        // Attribute definitions
        .route(
            "/options",
            get(handlers::list_options::<S>).post(handlers::create_option::<S>),
        )
        .route(
            "/options/:id",
            get(handlers::get_option::<S>)
                .put(handlers::update_option::<S>)
                .delete(handlers::delete_option::<S>),
        )
        .route(
            "/metafields",
            get(handlers::list_metafields::<S>).post(handlers::create_metafield::<S>),
        )
        .route(
            "/metafields/:id",
            get(handlers::get_metafield::<S>)
                .put(handlers::update_metafield::<S>)
                .delete(handlers::delete_metafield::<S>),
        )
        .route(
            "/modifiers",
            get(handlers::list_modifiers::<S>).post(handlers::create_modifier::<S>),
        )
        .route(
            "/modifiers/:id",
            get(handlers::get_modifier::<S>)
                .put(handlers::update_modifier::<S>)
                .delete(handlers::delete_modifier::<S>),
        )
        // Sales locations
        .route(
            "/stores",
            get(handlers::list_stores::<S>).post(handlers::create_store::<S>),
        )
        .route(
            "/stores/:id",
            get(handlers::get_store::<S>)
                .put(handlers::update_store::<S>)
                .delete(handlers::delete_store::<S>),
        )
        // Media uploads
        .route("/uploads/presign", post(handlers::presign_upload::<S>))
        .layer(ServiceBuilder::new().layer(CorsLayer::permissive()))
}
