use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use friplass_core::{CoreError, KeyValueStore};

/// Key-value entries kept as one JSON object on disk.
///
/// Gives the CLI the same favorites, device id and draft storage a browser
/// client has. An unreadable file behaves like an empty one.
#[derive(Debug)]
pub struct JsonFileKeyValueStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileKeyValueStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> BTreeMap<String, String> {
        std::fs::read_to_string(&self.path)
            .ok()
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_default()
    }

    fn write_entries(&self, key: &str, entries: &BTreeMap<String, String>) -> Result<(), CoreError> {
        let fail = |reason: String| CoreError::KeyValueWrite {
            key: key.to_string(),
            reason,
        };
        let bytes = serde_json::to_vec_pretty(entries).map_err(|e| fail(e.to_string()))?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| fail(e.to_string()))?;
        }
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(format!(".tmp.{}", std::process::id()));
        let tmp = PathBuf::from(tmp);
        std::fs::write(&tmp, bytes).map_err(|e| fail(e.to_string()))?;
        std::fs::rename(&tmp, &self.path).map_err(|e| {
            let _ = std::fs::remove_file(&tmp);
            fail(e.to_string())
        })
    }

    fn update(
        &self,
        key: &str,
        change: impl FnOnce(&mut BTreeMap<String, String>),
    ) -> Result<(), CoreError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut entries = self.read_entries();
        change(&mut entries);
        self.write_entries(key, &entries)
    }
}

impl KeyValueStore for JsonFileKeyValueStore {
    fn get(&self, key: &str) -> Option<String> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.read_entries().remove(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), CoreError> {
        self.update(key, |entries| {
            entries.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&self, key: &str) -> Result<(), CoreError> {
        self.update(key, |entries| {
            entries.remove(key);
        })
    }
}

#[cfg(test)]
mod tests {
    use friplass_core::{DraftStore, Favorites};
    use serde_json::json;

    use super::*;

    #[test]
    fn entries_survive_reopening() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state").join("session.json");

        let kv = JsonFileKeyValueStore::new(&path);
        Favorites::new(&kv).add("a").unwrap();
        DraftStore::new(&kv)
            .save(friplass_core::Draft::from_value(json!({"title": "Kai"})))
            .unwrap();

        let reopened = JsonFileKeyValueStore::new(&path);
        assert_eq!(Favorites::new(&reopened).list(), vec!["a"]);
        assert_eq!(DraftStore::new(&reopened).load().title, Some(json!("Kai")));
    }

    #[test]
    fn corrupt_file_reads_as_empty_and_is_replaced_on_write() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "not json").unwrap();

        let kv = JsonFileKeyValueStore::new(&path);
        assert_eq!(kv.get("k"), None);
        kv.set("k", "v").unwrap();
        assert_eq!(kv.get("k").as_deref(), Some("v"));
    }
}
