use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use parking_lot::{Mutex, RwLock};

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("cache io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid cache key: {0:?}")]
    InvalidKey(String),
    #[error("failed to encode cache entry: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Persistent string-valued key-value storage (the server-side stand-in for device storage)
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, CacheError>;
    fn set(&self, key: &str, value: &str) -> Result<(), CacheError>;
    /// Returns whether a value was present
    fn remove(&self, key: &str) -> Result<bool, CacheError>;
}

fn validate_key(key: &str) -> Result<&str, CacheError> {
    let valid = !key.is_empty()
        && !key.starts_with('.')
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
    if valid {
        Ok(key)
    } else {
        Err(CacheError::InvalidKey(key.to_string()))
    }
}

/// One `<key>.json` file per key under a directory
#[derive(Debug)]
pub struct FileKeyValueStore {
    dir: PathBuf,
    write_lock: Mutex<()>,
}

impl FileKeyValueStore {
    /// Creates the directory if needed
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, CacheError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            write_lock: Mutex::new(()),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, CacheError> {
        Ok(self.dir.join(format!("{}.json", validate_key(key)?)))
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        match fs::read_to_string(self.path_for(key)?) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), CacheError> {
        let path = self.path_for(key)?;
        let tmp = path.with_extension("json.tmp");
        let _guard = self.write_lock.lock();
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<bool, CacheError> {
        let path = self.path_for(key)?;
        let _guard = self.write_lock.lock();
        match fs::remove_file(path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

#[derive(Debug, Default)]
pub struct MemoryKeyValueStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        Ok(self.entries.read().get(validate_key(key)?).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), CacheError> {
        self.entries
            .write()
            .insert(validate_key(key)?.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<bool, CacheError> {
        Ok(self.entries.write().remove(validate_key(key)?).is_some())
    }
}

impl<K: KeyValueStore + ?Sized> KeyValueStore for std::sync::Arc<K> {
    fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), CacheError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<bool, CacheError> {
        (**self).remove(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_store_round_trip_and_remove() {
        let dir = tempfile::tempdir().unwrap();
        let kv = FileKeyValueStore::open(dir.path().join("cache")).unwrap();

        assert_eq!(kv.get("creds").unwrap(), None);
        kv.set("creds", "{\"a\":1}").unwrap();
        assert_eq!(kv.get("creds").unwrap().as_deref(), Some("{\"a\":1}"));
        kv.set("creds", "{\"a\":2}").unwrap();
        assert_eq!(kv.get("creds").unwrap().as_deref(), Some("{\"a\":2}"));

        assert!(kv.remove("creds").unwrap());
        assert!(!kv.remove("creds").unwrap());
        assert_eq!(kv.get("creds").unwrap(), None);
    }

    #[test]
    fn test_file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        FileKeyValueStore::open(dir.path())
            .unwrap()
            .set("k", "v")
            .unwrap();
        let reopened = FileKeyValueStore::open(dir.path()).unwrap();
        assert_eq!(reopened.get("k").unwrap().as_deref(), Some("v"));
    }

    #[test]
    fn test_encode_failures_convert_to_cache_error() {
        let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let cache_err = CacheError::from(err);
        assert!(matches!(cache_err, CacheError::Encode(_)));
        assert!(cache_err.to_string().starts_with("failed to encode cache entry"));
    }

    #[test]
    fn test_keys_cannot_escape_the_directory() {
        let kv = MemoryKeyValueStore::new();
        assert!(matches!(kv.set("../etc/passwd", "x"), Err(CacheError::InvalidKey(_))));
        assert!(matches!(kv.get(""), Err(CacheError::InvalidKey(_))));
        assert!(matches!(kv.get(".hidden"), Err(CacheError::InvalidKey(_))));
        assert!(kv.set("turso_credentials_cache", "x").is_ok());
    }
}
