use std::collections::HashSet;

use crate::logic::variants::MAX_OPTIONS;
use crate::model::{
    FieldError, InventoryItem, MetafieldDef, ModifierDef, OptionDef, Product, Store,
    TaxonomyEntry, ValidationErrors,
};

fn require_text(errors: &mut Vec<FieldError>, field: &str, value: &str) {
    if value.trim().is_empty() {
        errors.push(FieldError::new(field, "must not be empty"));
    }
}

fn require_non_negative_f64(errors: &mut Vec<FieldError>, field: &str, value: f64) {
    if !value.is_finite() || value < 0.0 {
        errors.push(FieldError::new(field, "must be a non-negative number"));
    }
}

fn require_non_negative_i64(errors: &mut Vec<FieldError>, field: &str, value: i64) {
    if value < 0 {
        errors.push(FieldError::new(field, "must not be negative"));
    }
}

pub fn validate_product(product: &Product) -> Result<(), ValidationErrors> {
    let mut errors = Vec::new();
    require_text(&mut errors, "title", &product.title);
    require_non_negative_f64(&mut errors, "price", product.price);
    require_non_negative_f64(&mut errors, "compare_price", product.compare_price);
    require_non_negative_f64(&mut errors, "cost", product.cost);

    if product.options.len() > MAX_OPTIONS {
        errors.push(FieldError::new(
            "options",
            format!("at most {} options are supported", MAX_OPTIONS),
        ));
    }

    let mut titles = HashSet::new();
    for (i, option) in product.options.iter().enumerate() {
        let field = format!("options[{}]", i);
        let title = option.title.trim().to_lowercase();
        if title.is_empty() {
            errors.push(FieldError::new(format!("{}.title", field), "must not be empty"));
        } else if !titles.insert(title) {
            errors.push(FieldError::new(
                format!("{}.title", field),
                format!("duplicate option {:?}", option.title),
            ));
        }

        let values: Vec<&str> = option.values.iter().map(|v| v.trim()).collect();
        if values.iter().all(|v| v.is_empty()) {
            errors.push(FieldError::new(
                format!("{}.values", field),
                "needs at least one value",
            ));
        }
        let mut seen = HashSet::new();
        for value in values.into_iter().filter(|v| !v.is_empty()) {
            if !seen.insert(value) {
                errors.push(FieldError::new(
                    format!("{}.values", field),
                    format!("duplicate value {:?}", value),
                ));
            }
        }
    }

    ValidationErrors::into_result(errors)
}

pub fn validate_inventory_item(item: &InventoryItem) -> Result<(), ValidationErrors> {
    let mut errors = Vec::new();
    require_text(&mut errors, "product_id", &item.product_id);
    require_non_negative_f64(&mut errors, "price", item.price);
    require_non_negative_f64(&mut errors, "compare_price", item.compare_price);
    require_non_negative_f64(&mut errors, "cost", item.cost);
    require_non_negative_i64(&mut errors, "quantity", item.quantity);
    require_non_negative_i64(&mut errors, "committed", item.committed);
    require_non_negative_i64(&mut errors, "reorder_level", item.reorder_level);
    require_non_negative_i64(&mut errors, "reorder_qty", item.reorder_qty);
    ValidationErrors::into_result(errors)
}

pub fn validate_taxonomy_entry(entry: &TaxonomyEntry) -> Result<(), ValidationErrors> {
    let mut errors = Vec::new();
    require_text(&mut errors, "name", &entry.name);
    if entry.parent_id.as_deref() == Some(entry.id.as_str()) {
        errors.push(FieldError::new("parent_id", "an entry cannot be its own parent"));
    }
    ValidationErrors::into_result(errors)
}

pub fn validate_option(option: &OptionDef) -> Result<(), ValidationErrors> {
    let mut errors = Vec::new();
    require_text(&mut errors, "title", &option.title);
    ValidationErrors::into_result(errors)
}

pub fn validate_metafield(metafield: &MetafieldDef) -> Result<(), ValidationErrors> {
    let mut errors = Vec::new();
    require_text(&mut errors, "title", &metafield.title);
    ValidationErrors::into_result(errors)
}

pub fn validate_modifier(modifier: &ModifierDef) -> Result<(), ValidationErrors> {
    let mut errors = Vec::new();
    require_text(&mut errors, "title", &modifier.title);
    ValidationErrors::into_result(errors)
}

pub fn validate_store(store: &Store) -> Result<(), ValidationErrors> {
    let mut errors = Vec::new();
    require_text(&mut errors, "title", &store.title);
    let email = store.email.trim();
    if !email.is_empty() && !email.contains('@') {
        errors.push(FieldError::new("email", "is not a valid email address"));
    }
    ValidationErrors::into_result(errors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{NewProduct, NewStore, NewTaxonomyEntry, ProductOption, TaxonomyKind};

    fn fields(result: Result<(), ValidationErrors>) -> Vec<String> {
        result
            .err()
            .map(|e| e.0.into_iter().map(|f| f.field).collect())
            .unwrap_or_default()
    }

    #[test]
    fn test_valid_product_passes() {
        let product = NewProduct {
            title: "Tee".into(),
            price: 10.0,
            options: vec![ProductOption {
                title: "Size".into(),
                values: vec!["S".into(), "M".into()],
            }],
            ..Default::default()
        }
        .into_product();
        assert!(validate_product(&product).is_ok());
    }

    #[test]
    fn test_product_collects_all_errors() {
        let product = NewProduct {
            title: "  ".into(),
            price: -1.0,
            cost: f64::NAN,
            ..Default::default()
        }
        .into_product();
        assert_eq!(fields(validate_product(&product)), vec!["title", "price", "cost"]);
    }

    #[test]
    fn test_product_option_rules() {
        let product = NewProduct {
            title: "Tee".into(),
            options: vec![
                ProductOption { title: "Size".into(), values: vec!["S".into(), "S".into()] },
                ProductOption { title: "size".into(), values: vec!["M".into()] },
                ProductOption { title: "".into(), values: vec![] },
                ProductOption { title: "Fit".into(), values: vec!["Slim".into()] },
            ],
            ..Default::default()
        }
        .into_product();
        assert_eq!(
            fields(validate_product(&product)),
            vec![
                "options",
                "options[0].values",
                "options[1].title",
                "options[2].title",
                "options[2].values"
            ]
        );
    }

    #[test]
    fn test_inventory_rejects_negative_stock() {
        let mut item = InventoryItem::for_product("p1".into());
        item.quantity = -2;
        item.reorder_qty = -1;
        assert_eq!(fields(validate_inventory_item(&item)), vec!["quantity", "reorder_qty"]);

        let orphan = InventoryItem::for_product("".into());
        assert_eq!(fields(validate_inventory_item(&orphan)), vec!["product_id"]);
    }

    #[test]
    fn test_category_cannot_parent_itself() {
        let mut entry = NewTaxonomyEntry { name: "Shoes".into(), ..Default::default() }
            .into_entry(TaxonomyKind::Category);
        assert!(validate_taxonomy_entry(&entry).is_ok());
        entry.parent_id = Some(entry.id.clone());
        assert_eq!(fields(validate_taxonomy_entry(&entry)), vec!["parent_id"]);
    }

    #[test]
    fn test_store_email_check() {
        let mut store = NewStore { title: "Downtown".into(), ..Default::default() }.into_store();
        assert!(validate_store(&store).is_ok());
        store.email = "not-an-email".into();
        assert_eq!(fields(validate_store(&store)), vec!["email"]);
        store.email = "shop@example.com".into();
        assert!(validate_store(&store).is_ok());
    }
}
