use crate::model::{
    NewModifierDef, NewOptionDef, NewProduct, NewStore, NewTaxonomyEntry, ProductFilter,
    ProductModifier, ProductOption, ProductStatus, Seo, TaxonomyKind,
};
use crate::store::traits::CatalogStore;
use anyhow::{Context, Result};

/// Small demo catalog: one store, a category tree, reusable options and a
/// couple of products with their variant rows. Skipped when products already exist.
pub async fn load_seed_data<S: CatalogStore>(store: &S) -> Result<()> {
    if !store.list_products(&ProductFilter::default()).await?.is_empty() {
        log::info!("catalog already has products, skipping seed data");
        return Ok(());
    }

    let shop = store
        .create_store(NewStore {
            title: "Downtown Flagship".to_string(),
            address: "12 Market Street".to_string(),
            city: "Lisbon".to_string(),
            email: "flagship@example.com".to_string(),
            currency: "EUR".to_string(),
            timezone: "Europe/Lisbon".to_string(),
            ..Default::default()
        })
        .await?;

    load_taxonomy(store).await?;
    load_attributes(store).await?;

    let tee = store
        .create_product(NewProduct {
            title: "Organic Cotton Tee".to_string(),
            description: "Heavyweight tee in organic cotton.".to_string(),
            product_type: "T-Shirt".to_string(),
            status: ProductStatus::Active,
            vendor: "Northwind Textiles".to_string(),
            brand: "Fieldwork".to_string(),
            category: "T-Shirts".to_string(),
            collection: "Summer".to_string(),
            tags: vec!["organic".to_string(), "bestseller".to_string()],
            price: 29.0,
            compare_price: 35.0,
            cost: 11.5,
            sku: "tee org".to_string(),
            track_inventory: true,
            options: vec![
                option("Size", &["S", "M", "L"]),
                option("Color", &["Black", "Sand"]),
            ],
            seo: Seo {
                title: "Organic Cotton Tee".to_string(),
                slug: "organic-cotton-tee".to_string(),
                ..Default::default()
            },
            stores: vec![shop.id.clone()],
            ..Default::default()
        })
        .await?;

    let mug = store
        .create_product(NewProduct {
            title: "Stoneware Mug".to_string(),
            product_type: "Mug".to_string(),
            status: ProductStatus::Draft,
            vendor: "Clayhouse".to_string(),
            category: "Home".to_string(),
            price: 18.0,
            cost: 6.0,
            sku: "MUG".to_string(),
            track_inventory: true,
            modifiers: vec![ProductModifier {
                title: "Gift wrap".to_string(),
                value: "3.00".to_string(),
                kind: "addon".to_string(),
                ..Default::default()
            }],
            stores: vec![shop.id.clone()],
            ..Default::default()
        })
        .await?;

    for product_id in [&tee.id, &mug.id] {
        store
            .sync_product_variants(product_id)
            .await?
            .context("Seeded product disappeared before variant sync")?;
    }

    // put some stock on the tee variants
    for (i, mut item) in store.list_inventory(&tee.id).await?.into_iter().enumerate() {
        item.quantity = 10 + 5 * i as i64;
        item.reorder_level = 5;
        item.reorder_qty = 20;
        item.warehouse = "Main".to_string();
        item.store_id = Some(shop.id.clone());
        store.upsert_inventory_item(item).await?;
    }

    log::info!("seeded demo catalog with 2 products");
    Ok(())
}

fn option(title: &str, values: &[&str]) -> ProductOption {
    ProductOption {
        title: title.to_string(),
        values: values.iter().map(|v| v.to_string()).collect(),
    }
}

async fn load_taxonomy<S: CatalogStore>(store: &S) -> Result<()> {
    let apparel = store
        .create_entry(TaxonomyKind::Category, entry("Apparel"))
        .await?;
    store
        .create_entry(
            TaxonomyKind::Category,
            NewTaxonomyEntry {
                parent_id: Some(apparel.id.clone()),
                ..entry("T-Shirts")
            },
        )
        .await?;
    store.create_entry(TaxonomyKind::Category, entry("Home")).await?;
    store.create_entry(TaxonomyKind::Collection, entry("Summer")).await?;
    store
        .create_entry(TaxonomyKind::Vendor, entry("Northwind Textiles"))
        .await?;
    store.create_entry(TaxonomyKind::Vendor, entry("Clayhouse")).await?;
    store.create_entry(TaxonomyKind::Brand, entry("Fieldwork")).await?;
    for tag in ["organic", "bestseller"] {
        store.create_entry(TaxonomyKind::Tag, entry(tag)).await?;
    }
    Ok(())
}

fn entry(name: &str) -> NewTaxonomyEntry {
    NewTaxonomyEntry {
        name: name.to_string(),
        ..Default::default()
    }
}

async fn load_attributes<S: CatalogStore>(store: &S) -> Result<()> {
    for (title, value) in [("Size", "S"), ("Size", "M"), ("Size", "L"), ("Color", "Black"), ("Color", "Sand")] {
        store
            .create_option(NewOptionDef {
                title: title.to_string(),
                value: value.to_string(),
                ..Default::default()
            })
            .await?;
    }
    store
        .create_modifier(NewModifierDef {
            title: "Gift wrap".to_string(),
            value: "3.00".to_string(),
            kind: "addon".to_string(),
            ..Default::default()
        })
        .await?;
    Ok(())
}
