use std::collections::HashSet;

use itertools::Itertools;
use serde::Serialize;

use crate::model::{InventoryItem, Product, ProductOption};

/// Inventory rows carry at most three option slots
pub const MAX_OPTIONS: usize = 3;

/// Changes needed to make a product's inventory rows match its options
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct VariantPlan {
    pub create: Vec<InventoryItem>,
    pub keep: Vec<InventoryItem>,
    pub remove: Vec<InventoryItem>,
}

impl VariantPlan {
    pub fn is_noop(&self) -> bool {
        self.create.is_empty() && self.remove.is_empty()
    }
}

/// Every combination of option values as `[option1, option2, option3]`, in declaration order.
/// Options without values are ignored; with none left there is a single all-empty combination.
pub fn option_combinations(options: &[ProductOption]) -> Vec<[String; 3]> {
    let value_lists: Vec<Vec<String>> = options
        .iter()
        .map(|option| {
            option
                .values
                .iter()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unique()
                .collect::<Vec<_>>()
        })
        .filter(|values| !values.is_empty())
        .take(MAX_OPTIONS)
        .collect();

    if value_lists.is_empty() {
        return vec![Default::default()];
    }

    value_lists
        .into_iter()
        .multi_cartesian_product()
        .map(|combo| {
            let mut slots: [String; 3] = Default::default();
            for (slot, value) in slots.iter_mut().zip(combo) {
                *slot = value;
            }
            slots
        })
        .collect()
}

fn variant_sku(product: &Product, combo: &[String; 3]) -> String {
    if product.sku.trim().is_empty() {
        return String::new();
    }
    std::iter::once(product.sku.trim())
        .chain(combo.iter().map(String::as_str).filter(|v| !v.is_empty()))
        .join("-")
        .to_uppercase()
        .split_whitespace()
        .join("-")
}

/// Match existing rows to the product's current option combinations.
///
/// A row is kept when its option triple is still a valid combination (the first
/// such row wins if several share a triple). Combinations without a row get a new
/// one priced like the product. Everything else is removed.
pub fn reconcile_variants(product: &Product, existing: &[InventoryItem]) -> VariantPlan {
    let combinations = option_combinations(&product.options);
    let wanted: HashSet<&[String; 3]> = combinations.iter().collect();

    let mut plan = VariantPlan::default();
    let mut covered: HashSet<[String; 3]> = HashSet::new();

    for item in existing {
        let key = [
            item.option1.clone(),
            item.option2.clone(),
            item.option3.clone(),
        ];
        if wanted.contains(&key) && covered.insert(key) {
            plan.keep.push(item.clone());
        } else {
            plan.remove.push(item.clone());
        }
    }

    for combo in combinations.iter().filter(|c| !covered.contains(*c)) {
        let mut item = InventoryItem::for_product(product.id.clone());
        item.option1 = combo[0].clone();
        item.option2 = combo[1].clone();
        item.option3 = combo[2].clone();
        item.price = product.price;
        item.compare_price = product.compare_price;
        item.cost = product.cost;
        item.sku = variant_sku(product, combo);
        item.barcode = String::new();
        plan.create.push(item);
    }

    plan
}
