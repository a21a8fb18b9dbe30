use crate::model::{generate_id, now_timestamp, Id};
use serde::{Deserialize, Serialize};

/// The simple named groupings a product can be filed under. All share one row shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaxonomyKind {
    Category,
    Collection,
    Vendor,
    Brand,
    Tag,
}

impl TaxonomyKind {
    pub const ALL: [TaxonomyKind; 5] = [
        TaxonomyKind::Category,
        TaxonomyKind::Collection,
        TaxonomyKind::Vendor,
        TaxonomyKind::Brand,
        TaxonomyKind::Tag,
    ];

    pub fn table(&self) -> &'static str {
        match self {
            TaxonomyKind::Category => "categories",
            TaxonomyKind::Collection => "collections",
            TaxonomyKind::Vendor => "vendors",
            TaxonomyKind::Brand => "brands",
            TaxonomyKind::Tag => "tags",
        }
    }

    /// Only categories nest
    pub fn has_parent(&self) -> bool {
        matches!(self, TaxonomyKind::Category)
    }
}

impl std::fmt::Display for TaxonomyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.table())
    }
}

impl std::str::FromStr for TaxonomyKind {
    type Err = String;

    /// Accepts both the table name ("categories") and the singular ("category")
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "category" | "categories" => Ok(TaxonomyKind::Category),
            "collection" | "collections" => Ok(TaxonomyKind::Collection),
            "vendor" | "vendors" => Ok(TaxonomyKind::Vendor),
            "brand" | "brands" => Ok(TaxonomyKind::Brand),
            "tag" | "tags" => Ok(TaxonomyKind::Tag),
            _ => Err(format!("Unknown taxonomy kind: {}", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxonomyEntry {
    pub id: Id,
    pub name: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<Id>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NewTaxonomyEntry {
    pub name: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub parent_id: Option<Id>,
}

impl NewTaxonomyEntry {
    pub fn into_entry(self, kind: TaxonomyKind) -> TaxonomyEntry {
        let now = now_timestamp();
        TaxonomyEntry {
            id: generate_id(),
            name: self.name,
            image: self.image,
            notes: self.notes,
            parent_id: if kind.has_parent() { self.parent_id } else { None },
            created_at: now.clone(),
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_parses_plural_and_singular() {
        assert_eq!("categories".parse::<TaxonomyKind>(), Ok(TaxonomyKind::Category));
        assert_eq!("Brand".parse::<TaxonomyKind>(), Ok(TaxonomyKind::Brand));
        assert!("widgets".parse::<TaxonomyKind>().is_err());
    }

    #[test]
    fn test_parent_is_dropped_for_flat_kinds() {
        let input = NewTaxonomyEntry {
            name: "Summer".to_string(),
            parent_id: Some("root".to_string()),
            ..Default::default()
        };
        let collection = input.clone().into_entry(TaxonomyKind::Collection);
        assert_eq!(collection.parent_id, None);

        let category = input.into_entry(TaxonomyKind::Category);
        assert_eq!(category.parent_id, Some("root".to_string()));
    }
}
