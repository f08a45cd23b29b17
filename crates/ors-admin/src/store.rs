//! Persisted key/value storage for identity and UI state.
//!
//! The admin front-end keeps everything it knows about the logged-in user
//! as flat string keys. [`KeyValueStore`] is the seam; [`MemoryStore`] backs
//! tests and embedders, [`FileStore`] backs the CLI.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use dashmap::DashMap;

use crate::error::ClientError;

pub const TOKEN: &str = "token";
pub const REFRESH_TOKEN: &str = "refreshToken";
pub const LOGIN_ID: &str = "loginId";
pub const ROLE: &str = "role";
pub const FIRST_NAME: &str = "fname";
pub const LAST_NAME: &str = "lname";
pub const USER_ID: &str = "userid";
pub const FCM_TOKEN: &str = "fcm-token";

/// The identity keys. They are always cleared together.
pub const IDENTITY_KEYS: [&str; 7] = [
    TOKEN,
    REFRESH_TOKEN,
    LOGIN_ID,
    ROLE,
    FIRST_NAME,
    LAST_NAME,
    USER_ID,
];

pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&self, key: &str, value: &str) -> Result<(), ClientError>;

    fn remove(&self, key: &str) -> Result<(), ClientError>;

    /// Remove every key in `keys` as a single operation.
    ///
    /// Implementations must not leave a subset removed on failure.
    fn remove_all(&self, keys: &[&str]) -> Result<(), ClientError>;
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: DashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries<'a>(entries: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let store = Self::new();
        for (k, v) in entries {
            store.entries.insert(k.to_string(), v.to_string());
        }
        store
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).map(|v| v.value().clone())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), ClientError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), ClientError> {
        self.entries.remove(key);
        Ok(())
    }

    fn remove_all(&self, keys: &[&str]) -> Result<(), ClientError> {
        for key in keys {
            self.entries.remove(*key);
        }
        Ok(())
    }
}

/// JSON-file backed store. Every mutation rewrites the whole file; the
/// in-memory copy only changes after the write succeeded.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl FileStore {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, ClientError> {
        let path = path.into();
        let entries = if path.exists() {
            let content = fs::read_to_string(&path)?;
            if content.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&content)?
            }
        } else {
            BTreeMap::new()
        };
        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn update<F>(&self, mutate: F) -> Result<(), ClientError>
    where
        F: FnOnce(&mut BTreeMap<String, String>),
    {
        let mut guard = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        let mut next = guard.clone();
        mutate(&mut next);
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(&next)?)?;
        *guard = next;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        let guard = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        guard.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), ClientError> {
        self.update(|m| {
            m.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&self, key: &str) -> Result<(), ClientError> {
        self.update(|m| {
            m.remove(key);
        })
    }

    fn remove_all(&self, keys: &[&str]) -> Result<(), ClientError> {
        self.update(|m| {
            for key in keys {
                m.remove(*key);
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_remove_all() {
        let store = MemoryStore::with_entries([(TOKEN, "t"), (FIRST_NAME, "Ada"), (FCM_TOKEN, "f")]);
        store.remove_all(&IDENTITY_KEYS).unwrap();
        assert_eq!(store.get(TOKEN), None);
        assert_eq!(store.get(FIRST_NAME), None);
        assert_eq!(store.get(FCM_TOKEN).as_deref(), Some("f"));
    }

    #[test]
    fn test_file_store_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");

        let store = FileStore::open(&path).unwrap();
        store.set(FIRST_NAME, "Ada").unwrap();
        store.set(TOKEN, "abc").unwrap();
        drop(store);

        let reopened = FileStore::open(&path).unwrap();
        assert_eq!(reopened.get(FIRST_NAME).as_deref(), Some("Ada"));
        assert_eq!(reopened.get(TOKEN).as_deref(), Some("abc"));
    }

    #[test]
    fn test_file_store_remove_all_is_one_write() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        let store = FileStore::open(&path).unwrap();
        for key in IDENTITY_KEYS {
            store.set(key, "x").unwrap();
        }
        store.set(FCM_TOKEN, "keep").unwrap();

        store.remove_all(&IDENTITY_KEYS).unwrap();

        let on_disk: BTreeMap<String, String> =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(on_disk.len(), 1);
        assert_eq!(on_disk.get(FCM_TOKEN).map(String::as_str), Some("keep"));
    }

    #[test]
    fn test_file_store_failed_write_keeps_state() {
        let dir = tempfile::tempdir().unwrap();
        // A directory at the target path makes every write fail.
        let path = dir.path().join("blocked");
        fs::create_dir(&path).unwrap();
        let store = FileStore {
            path: path.clone(),
            entries: Mutex::new(BTreeMap::from([(TOKEN.to_string(), "t".to_string())])),
        };

        assert!(store.remove_all(&IDENTITY_KEYS).is_err());
        assert_eq!(store.get(TOKEN).as_deref(), Some("t"));
    }

    #[test]
    fn test_file_store_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path().join("nope.json")).unwrap();
        assert_eq!(store.get(TOKEN), None);
    }
}
