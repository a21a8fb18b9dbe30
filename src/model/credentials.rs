use serde::{Deserialize, Serialize};

/// Connection details for one tenant database
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct TursoCredentials {
    pub db_name: String,
    pub api_token: String,
}

impl TursoCredentials {
    pub fn new(db_name: impl Into<String>, api_token: impl Into<String>) -> Self {
        Self {
            db_name: db_name.into(),
            api_token: api_token.into(),
        }
    }
}

// Keep the token out of logs
impl std::fmt::Debug for TursoCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TursoCredentials")
            .field("db_name", &self.db_name)
            .field("api_token", &"<redacted>")
            .finish()
    }
}

/// The persisted cache blob. Field names match what the mobile client wrote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedCredentials {
    pub turso_db_name: String,
    pub turso_api_token: String,
    pub user_id: String,
    /// Milliseconds since the Unix epoch
    pub timestamp: i64,
}

impl CachedCredentials {
    pub fn new(user_id: &str, credentials: &TursoCredentials) -> Self {
        Self {
            turso_db_name: credentials.db_name.clone(),
            turso_api_token: credentials.api_token.clone(),
            user_id: user_id.to_string(),
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }

    pub fn credentials(&self) -> TursoCredentials {
        TursoCredentials::new(self.turso_db_name.clone(), self.turso_api_token.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_blob_uses_camel_case_keys() {
        let cached = CachedCredentials::new("user-1", &TursoCredentials::new("shop-db", "tok"));
        let json = serde_json::to_value(&cached).unwrap();
        assert_eq!(json["tursoDbName"], "shop-db");
        assert_eq!(json["tursoApiToken"], "tok");
        assert_eq!(json["userId"], "user-1");
        assert!(json["timestamp"].as_i64().unwrap() > 0);
    }

    #[test]
    fn test_debug_redacts_token() {
        let creds = TursoCredentials::new("shop-db", "secret-token");
        let debug = format!("{:?}", creds);
        assert!(debug.contains("shop-db"));
        assert!(!debug.contains("secret-token"));
    }
}
