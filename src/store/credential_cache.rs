use anyhow::{Context, Result};

use crate::model::{CachedCredentials, TursoCredentials};
use crate::store::kv::{CacheError, KeyValueStore};
use crate::turso::{DatabaseService, SqlTransport, Statement};

/// Storage key of the single cached credentials blob
pub const CREDENTIALS_CACHE_KEY: &str = "turso_credentials_cache";

/// Single-entry cache of tenant database credentials, tied to the user who fetched them.
/// No TTL; the entry lives until it is cleared or a different user asks.
#[derive(Debug)]
pub struct CredentialCache<K> {
    kv: K,
}

impl<K: KeyValueStore> CredentialCache<K> {
    pub fn new(kv: K) -> Self {
        Self { kv }
    }

    /// Cached credentials for `user_id`. An entry written for another user, or one
    /// that no longer parses, is dropped.
    pub fn get(&self, user_id: &str) -> Result<Option<TursoCredentials>, CacheError> {
        let Some(raw) = self.kv.get(CREDENTIALS_CACHE_KEY)? else {
            return Ok(None);
        };

        let cached: CachedCredentials = match serde_json::from_str(&raw) {
            Ok(cached) => cached,
            Err(e) => {
                log::warn!("discarding unreadable credentials cache: {}", e);
                self.kv.remove(CREDENTIALS_CACHE_KEY)?;
                return Ok(None);
            }
        };

        if cached.user_id != user_id {
            log::info!("credentials cache belongs to another user, invalidating");
            self.kv.remove(CREDENTIALS_CACHE_KEY)?;
            return Ok(None);
        }

        Ok(Some(cached.credentials()))
    }

    pub fn save(&self, user_id: &str, credentials: &TursoCredentials) -> Result<(), CacheError> {
        let blob = CachedCredentials::new(user_id, credentials);
        let json = serde_json::to_string(&blob)?;
        self.kv.set(CREDENTIALS_CACHE_KEY, &json)
    }

    pub fn clear(&self) -> Result<(), CacheError> {
        self.kv.remove(CREDENTIALS_CACHE_KEY).map(|_| ())
    }
}

/// Looks up a user's tenant database, preferring the cache over the control-plane database
pub struct CredentialResolver<K, T> {
    cache: CredentialCache<K>,
    control: DatabaseService<T>,
}

impl<K: KeyValueStore, T: SqlTransport> CredentialResolver<K, T> {
    pub fn new(cache: CredentialCache<K>, control: DatabaseService<T>) -> Self {
        Self { cache, control }
    }

    pub fn cache(&self) -> &CredentialCache<K> {
        &self.cache
    }

    pub async fn resolve(&self, user_id: &str) -> Result<TursoCredentials> {
        match self.cache.get(user_id) {
            Ok(Some(credentials)) => {
                log::debug!("using cached credentials for {}", credentials.db_name);
                return Ok(credentials);
            }
            Ok(None) => {}
            // a broken cache should not lock the user out
            Err(e) => log::warn!("credentials cache unavailable: {}", e),
        }

        let result = self
            .control
            .execute_query(
                Statement::new(
                    "SELECT turso_db_name, turso_api_token FROM users WHERE id = ? LIMIT 1",
                )
                .arg(user_id),
            )
            .await
            .context("Failed to fetch tenant credentials")?;

        let row = result
            .first()
            .with_context(|| format!("No tenant database registered for user {}", user_id))?;
        let credentials = TursoCredentials::new(
            row.text("turso_db_name")?,
            row.text("turso_api_token")?,
        );

        if let Err(e) = self.cache.save(user_id, &credentials) {
            log::warn!("failed to cache credentials: {}", e);
        }
        log::info!("resolved tenant database {} for user", credentials.db_name);
        Ok(credentials)
    }
}
