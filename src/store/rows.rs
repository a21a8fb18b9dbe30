//! Column mappings between catalog entities and their table rows.

use crate::logic::json_text::encode_json_text;
use crate::model::{
    InventoryItem, MetafieldDef, ModifierDef, OptionDef, Product, ProductStatus, Store,
    TaxonomyEntry, TaxonomyKind,
};
use crate::turso::{DatabaseError, FromRow, Row, SqlValue, ToRow};

/// Empty text stored as NULL
fn nullable(value: &Option<String>) -> SqlValue {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => SqlValue::from(v),
        _ => SqlValue::Null,
    }
}

fn opt_nonempty(row: &Row, column: &str) -> Option<String> {
    row.opt_text(column)
        .ok()
        .flatten()
        .filter(|v| !v.trim().is_empty())
}

impl FromRow for Product {
    fn from_row(row: &Row) -> Result<Self, DatabaseError> {
        let status = row
            .text_or_empty("status")
            .parse::<ProductStatus>()
            .unwrap_or_default();
        Ok(Product {
            id: row.text("id")?,
            title: row.text_or_empty("title"),
            description: row.text_or_empty("description"),
            product_type: row.text_or_empty("type"),
            status,
            vendor: row.text_or_empty("vendor"),
            brand: row.text_or_empty("brand"),
            category: row.text_or_empty("category"),
            collection: row.text_or_empty("collection"),
            tags: row.json("tags"),
            price: row.float("price")?,
            compare_price: row.float("compare_price")?,
            cost: row.float("cost")?,
            sku: row.text_or_empty("sku"),
            barcode: row.text_or_empty("barcode"),
            track_inventory: row.bool("track_inventory")?,
            options: row.json("options"),
            modifiers: row.json("modifiers"),
            metafields: row.json("metafields"),
            medias: row.json("medias"),
            seo: row.json("seo"),
            stores: row.json("stores"),
            notes: row.text_or_empty("notes"),
            created_at: row.text_or_empty("created_at"),
            updated_at: row.text_or_empty("updated_at"),
        })
    }
}

impl ToRow for Product {
    fn to_row(&self) -> Vec<(&'static str, SqlValue)> {
        vec![
            ("id", SqlValue::from(&self.id)),
            ("title", SqlValue::from(&self.title)),
            ("description", SqlValue::from(&self.description)),
            ("type", SqlValue::from(&self.product_type)),
            ("status", SqlValue::from(self.status.to_string())),
            ("vendor", SqlValue::from(&self.vendor)),
            ("brand", SqlValue::from(&self.brand)),
            ("category", SqlValue::from(&self.category)),
            ("collection", SqlValue::from(&self.collection)),
            ("tags", SqlValue::from(encode_json_text(&self.tags))),
            ("price", SqlValue::from(self.price)),
            ("compare_price", SqlValue::from(self.compare_price)),
            ("cost", SqlValue::from(self.cost)),
            ("sku", SqlValue::from(&self.sku)),
            ("barcode", SqlValue::from(&self.barcode)),
            ("track_inventory", SqlValue::from(self.track_inventory)),
            ("options", SqlValue::from(encode_json_text(&self.options))),
            ("modifiers", SqlValue::from(encode_json_text(&self.modifiers))),
            ("metafields", SqlValue::from(encode_json_text(&self.metafields))),
            ("medias", SqlValue::from(encode_json_text(&self.medias))),
            ("seo", SqlValue::from(encode_json_text(&self.seo))),
            ("stores", SqlValue::from(encode_json_text(&self.stores))),
            ("notes", SqlValue::from(&self.notes)),
            ("created_at", SqlValue::from(&self.created_at)),
            ("updated_at", SqlValue::from(&self.updated_at)),
        ]
    }
}

impl FromRow for InventoryItem {
    fn from_row(row: &Row) -> Result<Self, DatabaseError> {
        Ok(InventoryItem {
            id: row.text("id")?,
            product_id: row.text("product_id")?,
            sku: row.text_or_empty("sku"),
            barcode: row.text_or_empty("barcode"),
            option1: row.text_or_empty("option1"),
            option2: row.text_or_empty("option2"),
            option3: row.text_or_empty("option3"),
            image: row.text_or_empty("image"),
            price: row.float("price")?,
            compare_price: row.float("compare_price")?,
            cost: row.float("cost")?,
            quantity: row.int("quantity")?,
            committed: row.int("committed")?,
            reorder_level: row.int("reorder_level")?,
            reorder_qty: row.int("reorder_qty")?,
            warehouse: row.text_or_empty("warehouse"),
            expiry: row.text_or_empty("expiry"),
            batch_no: row.text_or_empty("batch_no"),
            store_id: opt_nonempty(row, "store_id"),
            created_at: row.text_or_empty("created_at"),
            updated_at: row.text_or_empty("updated_at"),
        })
    }
}

impl ToRow for InventoryItem {
    fn to_row(&self) -> Vec<(&'static str, SqlValue)> {
        vec![
            ("id", SqlValue::from(&self.id)),
            ("product_id", SqlValue::from(&self.product_id)),
            ("sku", SqlValue::from(&self.sku)),
            ("barcode", SqlValue::from(&self.barcode)),
            ("option1", SqlValue::from(&self.option1)),
            ("option2", SqlValue::from(&self.option2)),
            ("option3", SqlValue::from(&self.option3)),
            ("image", SqlValue::from(&self.image)),
            ("price", SqlValue::from(self.price)),
            ("compare_price", SqlValue::from(self.compare_price)),
            ("cost", SqlValue::from(self.cost)),
            ("quantity", SqlValue::from(self.quantity)),
            ("committed", SqlValue::from(self.committed)),
            ("reorder_level", SqlValue::from(self.reorder_level)),
            ("reorder_qty", SqlValue::from(self.reorder_qty)),
            ("warehouse", SqlValue::from(&self.warehouse)),
            ("expiry", SqlValue::from(&self.expiry)),
            ("batch_no", SqlValue::from(&self.batch_no)),
            ("store_id", nullable(&self.store_id)),
            ("created_at", SqlValue::from(&self.created_at)),
            ("updated_at", SqlValue::from(&self.updated_at)),
        ]
    }
}

impl FromRow for TaxonomyEntry {
    fn from_row(row: &Row) -> Result<Self, DatabaseError> {
        Ok(TaxonomyEntry {
            id: row.text("id")?,
            name: row.text_or_empty("name"),
            image: row.text_or_empty("image"),
            notes: row.text_or_empty("notes"),
            parent_id: opt_nonempty(row, "parent_id"),
            created_at: row.text_or_empty("created_at"),
            updated_at: row.text_or_empty("updated_at"),
        })
    }
}

/// Only the categories table has a `parent_id` column
pub fn taxonomy_row(kind: TaxonomyKind, entry: &TaxonomyEntry) -> Vec<(&'static str, SqlValue)> {
    let mut values = vec![
        ("id", SqlValue::from(&entry.id)),
        ("name", SqlValue::from(&entry.name)),
        ("image", SqlValue::from(&entry.image)),
        ("notes", SqlValue::from(&entry.notes)),
    ];
    if kind.has_parent() {
        values.push(("parent_id", nullable(&entry.parent_id)));
    }
    values.push(("created_at", SqlValue::from(&entry.created_at)));
    values.push(("updated_at", SqlValue::from(&entry.updated_at)));
    values
}

impl FromRow for OptionDef {
    fn from_row(row: &Row) -> Result<Self, DatabaseError> {
        Ok(OptionDef {
            id: row.text("id")?,
            title: row.text_or_empty("title"),
            value: row.text_or_empty("value"),
            identifier: row.text_or_empty("identifier"),
            parent_id: opt_nonempty(row, "parent_id"),
            created_at: row.text_or_empty("created_at"),
            updated_at: row.text_or_empty("updated_at"),
        })
    }
}

impl ToRow for OptionDef {
    fn to_row(&self) -> Vec<(&'static str, SqlValue)> {
        vec![
            ("id", SqlValue::from(&self.id)),
            ("title", SqlValue::from(&self.title)),
            ("value", SqlValue::from(&self.value)),
            ("identifier", SqlValue::from(&self.identifier)),
            ("parent_id", nullable(&self.parent_id)),
            ("created_at", SqlValue::from(&self.created_at)),
            ("updated_at", SqlValue::from(&self.updated_at)),
        ]
    }
}

impl FromRow for MetafieldDef {
    fn from_row(row: &Row) -> Result<Self, DatabaseError> {
        Ok(MetafieldDef {
            id: row.text("id")?,
            title: row.text_or_empty("title"),
            value: row.text_or_empty("value"),
            group: opt_nonempty(row, "group_name"),
            kind: row.text_or_empty("kind"),
            created_at: row.text_or_empty("created_at"),
            updated_at: row.text_or_empty("updated_at"),
        })
    }
}

impl ToRow for MetafieldDef {
    fn to_row(&self) -> Vec<(&'static str, SqlValue)> {
        vec![
            ("id", SqlValue::from(&self.id)),
            ("title", SqlValue::from(&self.title)),
            ("value", SqlValue::from(&self.value)),
            ("group_name", nullable(&self.group)),
            ("kind", SqlValue::from(&self.kind)),
            ("created_at", SqlValue::from(&self.created_at)),
            ("updated_at", SqlValue::from(&self.updated_at)),
        ]
    }
}

impl FromRow for ModifierDef {
    fn from_row(row: &Row) -> Result<Self, DatabaseError> {
        Ok(ModifierDef {
            id: row.text("id")?,
            title: row.text_or_empty("title"),
            value: row.text_or_empty("value"),
            kind: row.text_or_empty("kind"),
            identifier: row.text_or_empty("identifier"),
            created_at: row.text_or_empty("created_at"),
            updated_at: row.text_or_empty("updated_at"),
        })
    }
}

impl ToRow for ModifierDef {
    fn to_row(&self) -> Vec<(&'static str, SqlValue)> {
        vec![
            ("id", SqlValue::from(&self.id)),
            ("title", SqlValue::from(&self.title)),
            ("value", SqlValue::from(&self.value)),
            ("kind", SqlValue::from(&self.kind)),
            ("identifier", SqlValue::from(&self.identifier)),
            ("created_at", SqlValue::from(&self.created_at)),
            ("updated_at", SqlValue::from(&self.updated_at)),
        ]
    }
}

impl FromRow for Store {
    fn from_row(row: &Row) -> Result<Self, DatabaseError> {
        Ok(Store {
            id: row.text("id")?,
            title: row.text_or_empty("title"),
            address: row.text_or_empty("address"),
            city: row.text_or_empty("city"),
            phone: row.text_or_empty("phone"),
            email: row.text_or_empty("email"),
            currency: row.text_or_empty("currency"),
            timezone: row.text_or_empty("timezone"),
            image: row.text_or_empty("image"),
            notes: row.text_or_empty("notes"),
            created_at: row.text_or_empty("created_at"),
            updated_at: row.text_or_empty("updated_at"),
        })
    }
}

impl ToRow for Store {
    fn to_row(&self) -> Vec<(&'static str, SqlValue)> {
        vec![
            ("id", SqlValue::from(&self.id)),
            ("title", SqlValue::from(&self.title)),
            ("address", SqlValue::from(&self.address)),
            ("city", SqlValue::from(&self.city)),
            ("phone", SqlValue::from(&self.phone)),
            ("email", SqlValue::from(&self.email)),
            ("currency", SqlValue::from(&self.currency)),
            ("timezone", SqlValue::from(&self.timezone)),
            ("image", SqlValue::from(&self.image)),
            ("notes", SqlValue::from(&self.notes)),
            ("created_at", SqlValue::from(&self.created_at)),
            ("updated_at", SqlValue::from(&self.updated_at)),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{NewProduct, NewTaxonomyEntry, ProductOption};

    /// Turn written pairs back into a row, the way the gateway would return them
    fn row_of(pairs: Vec<(&'static str, SqlValue)>) -> Row {
        Row::from_pairs(pairs)
    }

    #[test]
    fn test_product_json_columns_are_written_as_text() {
        let product = NewProduct {
            title: "Tee".into(),
            tags: vec!["summer".into()],
            options: vec![ProductOption { title: "Size".into(), values: vec!["S".into()] }],
            ..Default::default()
        }
        .into_product();
        let values = product.to_row();
        let options = values.iter().find(|(c, _)| *c == "options").unwrap();
        assert_eq!(options.1, SqlValue::from(r#"[{"title":"Size","values":["S"]}]"#));
        let tracked = values.iter().find(|(c, _)| *c == "track_inventory").unwrap();
        assert_eq!(tracked.1, SqlValue::Integer(0));

        let decoded = Product::from_row(&row_of(values)).unwrap();
        assert_eq!(decoded, product);
    }

    #[test]
    fn test_product_row_with_legacy_garbage_still_decodes() {
        let row = Row::from_pairs(vec![
            ("id", SqlValue::from("p1")),
            ("title", SqlValue::from("Mug")),
            ("status", SqlValue::from("unknown")),
            ("price", SqlValue::from("12.50")),
            ("options", SqlValue::from("{oops")),
            ("seo", SqlValue::Null),
            ("tags", SqlValue::from("")),
        ]);
        let product = Product::from_row(&row).unwrap();
        assert_eq!(product.price, 12.5);
        assert_eq!(product.status, ProductStatus::Active);
        assert!(product.options.is_empty());
        assert!(product.tags.is_empty());
        assert_eq!(product.description, "");
    }

    #[test]
    fn test_row_without_id_is_rejected() {
        let row = Row::from_pairs(vec![("title", SqlValue::from("Mug"))]);
        assert!(Product::from_row(&row).is_err());
    }

    #[test]
    fn test_taxonomy_row_only_has_parent_for_categories() {
        let entry = NewTaxonomyEntry {
            name: "Boots".into(),
            parent_id: Some("shoes".into()),
            ..Default::default()
        }
        .into_entry(TaxonomyKind::Category);

        let category = taxonomy_row(TaxonomyKind::Category, &entry);
        assert!(category.iter().any(|(c, v)| *c == "parent_id" && *v == SqlValue::from("shoes")));
        let vendor = taxonomy_row(TaxonomyKind::Vendor, &entry);
        assert!(vendor.iter().all(|(c, _)| *c != "parent_id"));
    }

    #[test]
    fn test_blank_store_id_reads_as_none() {
        let mut item = InventoryItem::for_product("p1".into());
        item.store_id = Some("  ".into());
        let decoded = InventoryItem::from_row(&row_of(item.to_row())).unwrap();
        assert_eq!(decoded.store_id, None);
    }
}
