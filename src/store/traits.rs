use crate::model::{
    Id, InventoryItem, MetafieldDef, ModifierDef, NewMetafieldDef, NewModifierDef, NewOptionDef,
    NewProduct, NewStore, NewTaxonomyEntry, OptionDef, Product, ProductFilter, Store,
    TaxonomyEntry, TaxonomyKind,
};
use crate::logic::VariantPlan;
use anyhow::Result;

#[async_trait::async_trait]
pub trait ProductStore: Send + Sync {
    async fn list_products(&self, filter: &ProductFilter) -> Result<Vec<Product>>;
    async fn get_product(&self, id: &Id) -> Result<Option<Product>>;
    async fn create_product(&self, product: NewProduct) -> Result<Product>;
    /// Overwrites every column and bumps `updated_at`; `None` when the product does not exist
    async fn update_product(&self, product: Product) -> Result<Option<Product>>;
    /// Removes the product together with its inventory rows
    async fn delete_product(&self, id: &Id) -> Result<bool>;
}

#[async_trait::async_trait]
pub trait InventoryStore: Send + Sync {
    async fn list_inventory(&self, product_id: &Id) -> Result<Vec<InventoryItem>>;
    async fn get_inventory_item(&self, id: &Id) -> Result<Option<InventoryItem>>;
    async fn upsert_inventory_item(&self, item: InventoryItem) -> Result<InventoryItem>;
    async fn delete_inventory_item(&self, id: &Id) -> Result<bool>;
    /// Bring the product's inventory rows in line with its option combinations.
    /// `None` when the product does not exist.
    async fn sync_product_variants(&self, product_id: &Id) -> Result<Option<VariantPlan>>;
}

/// Categories, collections, vendors, brands and tags
#[async_trait::async_trait]
pub trait TaxonomyStore: Send + Sync {
    async fn list_entries(&self, kind: TaxonomyKind) -> Result<Vec<TaxonomyEntry>>;
    async fn get_entry(&self, kind: TaxonomyKind, id: &Id) -> Result<Option<TaxonomyEntry>>;
    async fn create_entry(&self, kind: TaxonomyKind, entry: NewTaxonomyEntry) -> Result<TaxonomyEntry>;
    async fn update_entry(&self, kind: TaxonomyKind, entry: TaxonomyEntry) -> Result<Option<TaxonomyEntry>>;
    async fn delete_entry(&self, kind: TaxonomyKind, id: &Id) -> Result<bool>;
}

/// Reusable option, metafield and modifier definitions
#[async_trait::async_trait]
pub trait AttributeStore: Send + Sync {
    async fn list_options(&self) -> Result<Vec<OptionDef>>;
    async fn get_option(&self, id: &Id) -> Result<Option<OptionDef>>;
    async fn create_option(&self, option: NewOptionDef) -> Result<OptionDef>;
    async fn update_option(&self, option: OptionDef) -> Result<Option<OptionDef>>;
    async fn delete_option(&self, id: &Id) -> Result<bool>;

    async fn list_metafields(&self) -> Result<Vec<MetafieldDef>>;
    async fn get_metafield(&self, id: &Id) -> Result<Option<MetafieldDef>>;
    async fn create_metafield(&self, metafield: NewMetafieldDef) -> Result<MetafieldDef>;
    async fn update_metafield(&self, metafield: MetafieldDef) -> Result<Option<MetafieldDef>>;
    async fn delete_metafield(&self, id: &Id) -> Result<bool>;

    async fn list_modifiers(&self) -> Result<Vec<ModifierDef>>;
    async fn get_modifier(&self, id: &Id) -> Result<Option<ModifierDef>>;
    async fn create_modifier(&self, modifier: NewModifierDef) -> Result<ModifierDef>;
    async fn update_modifier(&self, modifier: ModifierDef) -> Result<Option<ModifierDef>>;
    async fn delete_modifier(&self, id: &Id) -> Result<bool>;
}

#[async_trait::async_trait]
pub trait StoreLocationStore: Send + Sync {
    async fn list_stores(&self) -> Result<Vec<Store>>;
    async fn get_store(&self, id: &Id) -> Result<Option<Store>>;
    async fn create_store(&self, store: NewStore) -> Result<Store>;
    async fn update_store(&self, store: Store) -> Result<Option<Store>>;
    async fn delete_store(&self, id: &Id) -> Result<bool>;
}

pub trait CatalogStore:
    ProductStore + InventoryStore + TaxonomyStore + AttributeStore + StoreLocationStore + Send + Sync
{
}

impl<T> CatalogStore for T where
    T: ProductStore + InventoryStore + TaxonomyStore + AttributeStore + StoreLocationStore + Send + Sync
{
}
