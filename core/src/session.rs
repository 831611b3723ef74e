//! Persisted client session: the admin token and the chosen locale.
//!
//! # Design
//! The browser front end keeps both values in `localStorage`. Here the
//! storage is a `KeyValueStore` owned by an explicit `Session`, which is
//! passed to whoever needs it. Nothing caches the token: every
//! `admin_token()` call reads the store, so a login or logout is visible
//! to the very next request.

use std::collections::{BTreeMap, HashMap};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::config::AppConfig;
use crate::error::StorageError;

/// Synchronous string key-value storage. Last write wins.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

/// Volatile store for tests and embedded hosts.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Store persisted as a flat JSON object of strings.
///
/// Holds no copy of the entries: every read goes to the file, and every
/// mutation is a read-modify-write of the whole object. Two handles on the
/// same path therefore see each other's writes, and a failed write leaves
/// nothing half-applied. A missing or empty file reads as an empty store.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Open a store at `path`, failing early if an existing file is not a
    /// JSON object of strings.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let store = Self {
            path: path.as_ref().to_path_buf(),
        };
        store.load()?;
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, String>, StorageError> {
        match std::fs::read_to_string(&self.path) {
            Ok(raw) if raw.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        let raw = serde_json::to_string_pretty(entries)?;
        std::fs::write(&self.path, raw)?;
        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.load()?.remove(key))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.load()?;
        entries.insert(key.to_string(), value.to_string());
        self.save(&entries)
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        let mut entries = self.load()?;
        if entries.remove(key).is_some() {
            self.save(&entries)?;
        }
        Ok(())
    }
}

/// Admin token and locale, read from and written to a `KeyValueStore`.
#[derive(Debug)]
pub struct Session<S> {
    store: S,
    token_key: String,
    locale_key: String,
}

impl<S: KeyValueStore> Session<S> {
    pub fn new(store: S) -> Self {
        Self::with_config(store, &AppConfig::default())
    }

    pub fn with_config(store: S, config: &AppConfig) -> Self {
        Self {
            store,
            token_key: config.admin_token_key.clone(),
            locale_key: config.locale_key.clone(),
        }
    }

    /// Current admin token. An empty stored value counts as logged out.
    pub fn admin_token(&self) -> Result<Option<String>, StorageError> {
        Ok(self.store.get(&self.token_key)?.filter(|t| !t.is_empty()))
    }

    pub fn set_admin_token(&mut self, token: &str) -> Result<(), StorageError> {
        self.store.set(&self.token_key, token)
    }

    pub fn clear_admin_token(&mut self) -> Result<(), StorageError> {
        self.store.remove(&self.token_key)
    }

    pub fn locale(&self) -> Result<Option<String>, StorageError> {
        self.store.get(&self.locale_key)
    }

    pub fn set_locale(&mut self, tag: &str) -> Result<(), StorageError> {
        self.store.set(&self.locale_key, tag)
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }
}
