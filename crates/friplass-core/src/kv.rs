//! Key-value port for client-local state (favorites, device id, draft).

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::CoreError;

/// String-keyed storage of string values.
///
/// Reads never fail; a backend that cannot read reports the key as absent.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    /// # Errors
    ///
    /// Returns [`CoreError::KeyValueWrite`] when the backend rejects the write.
    fn set(&self, key: &str, value: &str) -> Result<(), CoreError>;

    /// # Errors
    ///
    /// Returns [`CoreError::KeyValueWrite`] when the backend rejects the write.
    fn remove(&self, key: &str) -> Result<(), CoreError>;
}

/// Decode a JSON entry. Missing or malformed entries read as `None`.
pub fn get_json<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Option<T> {
    store
        .get(key)
        .and_then(|raw| serde_json::from_str(&raw).ok())
}

/// Encode and store a JSON entry.
///
/// # Errors
///
/// Returns [`CoreError::Encode`] if `value` cannot be serialized, or the
/// backend's write error.
pub fn set_json<T: Serialize + ?Sized>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), CoreError> {
    let raw = serde_json::to_string(value).map_err(|source| CoreError::Encode {
        key: key.to_string(),
        source,
    })?;
    store.set(key, &raw)
}

/// Process-local store, used in tests and as the session default.
#[derive(Debug, Default)]
pub struct MemoryKeyValueStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryKeyValueStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), CoreError> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), CoreError> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
        Ok(())
    }
}
