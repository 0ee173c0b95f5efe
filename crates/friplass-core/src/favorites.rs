//! The device-local favorites set.

use crate::kv::{get_json, set_json, KeyValueStore};
use crate::CoreError;

pub const FAVORITES_KEY: &str = "friplass_favorites_v1";

/// Favorite listing ids, newest first, stored as a JSON array.
pub struct Favorites<'a> {
    kv: &'a dyn KeyValueStore,
}

impl<'a> Favorites<'a> {
    #[must_use]
    pub fn new(kv: &'a dyn KeyValueStore) -> Self {
        Self { kv }
    }

    /// Stored ids. Non-string entries are dropped and malformed data reads
    /// as an empty set.
    #[must_use]
    pub fn list(&self) -> Vec<String> {
        get_json::<Vec<serde_json::Value>>(self.kv, FAVORITES_KEY)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect()
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.list().iter().any(|x| x == id)
    }

    /// # Errors
    ///
    /// Returns the key-value backend's write error.
    pub fn add(&self, id: &str) -> Result<(), CoreError> {
        let mut ids = self.list();
        if ids.iter().any(|x| x == id) {
            return Ok(());
        }
        ids.insert(0, id.to_string());
        self.write(&ids)
    }

    /// # Errors
    ///
    /// Returns the key-value backend's write error.
    pub fn remove(&self, id: &str) -> Result<(), CoreError> {
        let mut ids = self.list();
        ids.retain(|x| x != id);
        self.write(&ids)
    }

    /// Flip membership and return the new state.
    ///
    /// # Errors
    ///
    /// Returns the key-value backend's write error.
    pub fn toggle(&self, id: &str) -> Result<bool, CoreError> {
        if self.contains(id) {
            self.remove(id)?;
            Ok(false)
        } else {
            self.add(id)?;
            Ok(true)
        }
    }

    pub(crate) fn write(&self, ids: &[String]) -> Result<(), CoreError> {
        set_json(self.kv, FAVORITES_KEY, ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::MemoryKeyValueStore;

    #[test]
    fn add_prepends_without_duplicates() {
        let kv = MemoryKeyValueStore::new();
        let favs = Favorites::new(&kv);
        favs.add("a").unwrap();
        favs.add("b").unwrap();
        favs.add("a").unwrap();
        assert_eq!(favs.list(), vec!["b", "a"]);
    }

    #[test]
    fn toggle_reports_new_membership() {
        let kv = MemoryKeyValueStore::new();
        let favs = Favorites::new(&kv);
        assert!(favs.toggle("x").unwrap());
        assert!(favs.contains("x"));
        assert!(!favs.toggle("x").unwrap());
        assert!(!favs.contains("x"));
    }

    #[test]
    fn malformed_entries_are_ignored() {
        let kv = MemoryKeyValueStore::new();
        kv.set(FAVORITES_KEY, r#"["a", 3, null, "b"]"#).unwrap();
        assert_eq!(Favorites::new(&kv).list(), vec!["a", "b"]);

        kv.set(FAVORITES_KEY, r#"{"ids": ["a"]}"#).unwrap();
        assert!(Favorites::new(&kv).list().is_empty());
    }
}
