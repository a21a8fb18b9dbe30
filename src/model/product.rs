use crate::model::{generate_id, now_timestamp, Id};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductStatus {
    #[default]
    Active,
    Draft,
    Archived,
}

impl std::fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            ProductStatus::Active => write!(f, "active"),
            ProductStatus::Draft => write!(f, "draft"),
            ProductStatus::Archived => write!(f, "archived"),
        }
    }
}

impl std::str::FromStr for ProductStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "active" => Ok(ProductStatus::Active),
            "draft" => Ok(ProductStatus::Draft),
            "archived" => Ok(ProductStatus::Archived),
            _ => Err(format!("Unknown product status: {}", s)),
        }
    }
}

/// One selectable dimension of a product (e.g. Size with S/M/L)
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProductOption {
    pub title: String,
    #[serde(default)]
    pub values: Vec<String>,
}

/// Modifier attached to a product, stored inside the `modifiers` column
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProductModifier {
    #[serde(default)]
    pub id: Id,
    pub title: String,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub kind: String,
}

/// Metafield attached to a product, stored inside the `metafields` column
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProductMetafield {
    #[serde(default)]
    pub id: Id,
    pub title: String,
    #[serde(default)]
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Media {
    pub url: String,
    /// Object-store key, when the media was uploaded through us
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Seo {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: Id,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, rename = "type")]
    pub product_type: String,
    #[serde(default)]
    pub status: ProductStatus,
    #[serde(default)]
    pub vendor: String,
    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub collection: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub compare_price: f64,
    #[serde(default)]
    pub cost: f64,
    #[serde(default)]
    pub sku: String,
    #[serde(default)]
    pub barcode: String,
    #[serde(default)]
    pub track_inventory: bool,

    // JSON-in-text columns
    #[serde(default)]
    pub options: Vec<ProductOption>,
    #[serde(default)]
    pub modifiers: Vec<ProductModifier>,
    #[serde(default)]
    pub metafields: Vec<ProductMetafield>,
    #[serde(default)]
    pub medias: Vec<Media>,
    #[serde(default)]
    pub seo: Seo,
    /// Ids of the stores this product is sold in
    #[serde(default)]
    pub stores: Vec<Id>,

    #[serde(default)]
    pub notes: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Product input model for creation (without ID and timestamps)
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NewProduct {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, rename = "type")]
    pub product_type: String,
    #[serde(default)]
    pub status: ProductStatus,
    #[serde(default)]
    pub vendor: String,
    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub collection: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub compare_price: f64,
    #[serde(default)]
    pub cost: f64,
    #[serde(default)]
    pub sku: String,
    #[serde(default)]
    pub barcode: String,
    #[serde(default)]
    pub track_inventory: bool,
    #[serde(default)]
    pub options: Vec<ProductOption>,
    #[serde(default)]
    pub modifiers: Vec<ProductModifier>,
    #[serde(default)]
    pub metafields: Vec<ProductMetafield>,
    #[serde(default)]
    pub medias: Vec<Media>,
    #[serde(default)]
    pub seo: Seo,
    #[serde(default)]
    pub stores: Vec<Id>,
    #[serde(default)]
    pub notes: String,
}

impl NewProduct {
    pub fn into_product(self) -> Product {
        let now = now_timestamp();
        Product {
            id: generate_id(),
            title: self.title,
            description: self.description,
            product_type: self.product_type,
            status: self.status,
            vendor: self.vendor,
            brand: self.brand,
            category: self.category,
            collection: self.collection,
            tags: self.tags,
            price: self.price,
            compare_price: self.compare_price,
            cost: self.cost,
            sku: self.sku,
            barcode: self.barcode,
            track_inventory: self.track_inventory,
            options: self.options,
            modifiers: self.modifiers,
            metafields: self.metafields,
            medias: self.medias,
            seo: self.seo,
            stores: self.stores,
            notes: self.notes,
            created_at: now.clone(),
            updated_at: now,
        }
    }
}

/// Optional narrowing for product listings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductFilter {
    pub status: Option<ProductStatus>,
    pub category: Option<String>,
    pub vendor: Option<String>,
    /// Substring match against title or sku
    pub search: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_product_gets_id_and_matching_timestamps() {
        let product = NewProduct {
            title: "Linen Shirt".to_string(),
            price: 49.0,
            ..Default::default()
        }
        .into_product();

        assert!(!product.id.is_empty());
        assert_eq!(product.created_at, product.updated_at);
        assert_eq!(product.status, ProductStatus::Active);
        assert_eq!(product.title, "Linen Shirt");
    }

    #[test]
    fn test_status_parses_case_insensitively() {
        assert_eq!("Draft".parse::<ProductStatus>(), Ok(ProductStatus::Draft));
        assert_eq!("ARCHIVED".parse::<ProductStatus>(), Ok(ProductStatus::Archived));
        assert!("deleted".parse::<ProductStatus>().is_err());
        assert_eq!(ProductStatus::Active.to_string(), "active");
    }

    #[test]
    fn test_product_deserializes_with_missing_optional_fields() {
        let json = r#"{
            "id": "p1",
            "title": "Mug",
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z"
        }"#;
        let product: Product = serde_json::from_str(json).unwrap();
        assert!(product.options.is_empty());
        assert_eq!(product.seo, Seo::default());
        assert_eq!(product.status, ProductStatus::Active);
    }
}
