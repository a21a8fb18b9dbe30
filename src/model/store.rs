use crate::model::{generate_id, now_timestamp, Id};
use serde::{Deserialize, Serialize};

/// A physical or online sales location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Store {
    pub id: Id,
    pub title: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub currency: String,
    #[serde(default)]
    pub timezone: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub notes: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NewStore {
    pub title: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub currency: String,
    #[serde(default)]
    pub timezone: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub notes: String,
}

impl NewStore {
    pub fn into_store(self) -> Store {
        let now = now_timestamp();
        Store {
            id: generate_id(),
            title: self.title,
            address: self.address,
            city: self.city,
            phone: self.phone,
            email: self.email,
            currency: self.currency,
            timezone: self.timezone,
            image: self.image,
            notes: self.notes,
            created_at: now.clone(),
            updated_at: now,
        }
    }
}
