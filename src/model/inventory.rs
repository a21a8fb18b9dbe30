use crate::model::{generate_id, now_timestamp, Id};
use serde::{Deserialize, Serialize};

/// One stock-keeping row. A product with options has one row per option combination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryItem {
    #[serde(default)]
    pub id: Id,
    pub product_id: Id,
    #[serde(default)]
    pub sku: String,
    #[serde(default)]
    pub barcode: String,
    #[serde(default)]
    pub option1: String,
    #[serde(default)]
    pub option2: String,
    #[serde(default)]
    pub option3: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub compare_price: f64,
    #[serde(default)]
    pub cost: f64,
    #[serde(default)]
    pub quantity: i64,
    #[serde(default)]
    pub committed: i64,
    #[serde(default)]
    pub reorder_level: i64,
    #[serde(default)]
    pub reorder_qty: i64,
    #[serde(default)]
    pub warehouse: String,
    #[serde(default)]
    pub expiry: String,
    #[serde(default)]
    pub batch_no: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_id: Option<Id>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

impl InventoryItem {
    /// Blank row for a product; used when a new option combination appears
    pub fn for_product(product_id: Id) -> Self {
        let now = now_timestamp();
        Self {
            id: generate_id(),
            product_id,
            sku: String::new(),
            barcode: String::new(),
            option1: String::new(),
            option2: String::new(),
            option3: String::new(),
            image: String::new(),
            price: 0.0,
            compare_price: 0.0,
            cost: 0.0,
            quantity: 0,
            committed: 0,
            reorder_level: 0,
            reorder_qty: 0,
            warehouse: String::new(),
            expiry: String::new(),
            batch_no: String::new(),
            store_id: None,
            created_at: now.clone(),
            updated_at: now,
        }
    }

    /// The (option1, option2, option3) triple identifying this variant
    pub fn option_key(&self) -> [&str; 3] {
        [&self.option1, &self.option2, &self.option3]
    }

    /// Stock not yet promised to an order. Can go negative when oversold.
    pub fn available(&self) -> i64 {
        self.quantity - self.committed
    }

    pub fn margin_percent(&self) -> Option<f64> {
        if self.price == 0.0 {
            return None;
        }
        Some((self.price - self.cost) / self.price * 100.0)
    }

    pub fn needs_reorder(&self) -> bool {
        self.reorder_level > 0 && self.available() <= self.reorder_level
    }

    /// Human-readable variant title, e.g. "M / Blue"
    pub fn variant_title(&self) -> String {
        let parts: Vec<&str> = self
            .option_key()
            .into_iter()
            .filter(|v| !v.is_empty())
            .collect();
        if parts.is_empty() {
            "Default".to_string()
        } else {
            parts.join(" / ")
        }
    }
}

/// Inventory row as returned by the API, with derived stock figures
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InventoryView {
    #[serde(flatten)]
    pub item: InventoryItem,
    pub title: String,
    /// Sellable stock, floored at zero
    pub available: i64,
    pub margin_percent: Option<f64>,
    pub needs_reorder: bool,
}

impl From<InventoryItem> for InventoryView {
    fn from(item: InventoryItem) -> Self {
        Self {
            title: item.variant_title(),
            available: item.available().max(0),
            margin_percent: item.margin_percent(),
            needs_reorder: item.needs_reorder(),
            item,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(quantity: i64, committed: i64, reorder_level: i64) -> InventoryItem {
        let mut item = InventoryItem::for_product("p1".to_string());
        item.quantity = quantity;
        item.committed = committed;
        item.reorder_level = reorder_level;
        item
    }

    #[test]
    fn test_available_subtracts_committed_stock() {
        assert_eq!(item(10, 3, 0).available(), 7);
        assert_eq!(item(2, 5, 0).available(), -3);
    }

    #[test]
    fn test_margin_is_none_for_free_items() {
        let mut free = item(1, 0, 0);
        free.cost = 4.0;
        assert_eq!(free.margin_percent(), None);

        let mut priced = item(1, 0, 0);
        priced.price = 20.0;
        priced.cost = 15.0;
        assert_eq!(priced.margin_percent(), Some(25.0));
    }

    #[test]
    fn test_reorder_triggers_at_or_below_level() {
        assert!(item(5, 0, 5).needs_reorder());
        assert!(item(8, 4, 5).needs_reorder());
        assert!(!item(6, 0, 5).needs_reorder());
        // a zero level disables reorder alerts
        assert!(!item(0, 0, 0).needs_reorder());
    }

    #[test]
    fn test_view_floors_oversold_stock_at_zero() {
        let oversold = item(2, 5, 1);
        let view = InventoryView::from(oversold);
        assert_eq!(view.available, 0);
        assert_eq!(view.item.available(), -3);
        assert!(view.needs_reorder);

        assert_eq!(InventoryView::from(item(10, 3, 0)).available, 7);
    }

    #[test]
    fn test_variant_title_skips_empty_slots() {
        let mut variant = item(0, 0, 0);
        assert_eq!(variant.variant_title(), "Default");
        variant.option1 = "M".to_string();
        variant.option3 = "Cotton".to_string();
        assert_eq!(variant.variant_title(), "M / Cotton");
    }
}
