use crate::model::{generate_id, now_timestamp, Id};
use serde::{Deserialize, Serialize};

/// Merchant-defined option value template (e.g. title "Size", value "XL")
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionDef {
    pub id: Id,
    pub title: String,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub identifier: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<Id>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NewOptionDef {
    pub title: String,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub identifier: String,
    #[serde(default)]
    pub parent_id: Option<Id>,
}

impl NewOptionDef {
    pub fn into_def(self) -> OptionDef {
        let now = now_timestamp();
        OptionDef {
            id: generate_id(),
            title: self.title,
            value: self.value,
            identifier: self.identifier,
            parent_id: self.parent_id,
            created_at: now.clone(),
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetafieldDef {
    pub id: Id,
    pub title: String,
    #[serde(default)]
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    /// Value type hint for the editor ("text", "number", "url", ...)
    #[serde(default)]
    pub kind: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NewMetafieldDef {
    pub title: String,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub group: Option<String>,
    #[serde(default)]
    pub kind: String,
}

impl NewMetafieldDef {
    pub fn into_def(self) -> MetafieldDef {
        let now = now_timestamp();
        MetafieldDef {
            id: generate_id(),
            title: self.title,
            value: self.value,
            group: self.group,
            kind: self.kind,
            created_at: now.clone(),
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModifierDef {
    pub id: Id,
    pub title: String,
    #[serde(default)]
    pub value: String,
    /// e.g. "addon", "discount"
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub identifier: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NewModifierDef {
    pub title: String,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub identifier: String,
}

impl NewModifierDef {
    pub fn into_def(self) -> ModifierDef {
        let now = now_timestamp();
        ModifierDef {
            id: generate_id(),
            title: self.title,
            value: self.value,
            kind: self.kind,
            identifier: self.identifier,
            created_at: now.clone(),
            updated_at: now,
        }
    }
}
