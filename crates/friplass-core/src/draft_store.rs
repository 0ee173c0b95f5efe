//! One working draft per session, merged step by step.

use crate::draft::Draft;
use crate::kv::{get_json, set_json, KeyValueStore};
use crate::normalize::normalize_draft;
use crate::CoreError;

pub const DRAFT_KEY: &str = "friplass:mvpDraft";

/// Draft persistence over an injected [`KeyValueStore`].
///
/// Every load and save passes through [`normalize_draft`], so a draft written
/// by an older client reads back in canonical shape.
pub struct DraftStore<'a> {
    kv: &'a dyn KeyValueStore,
}

impl<'a> DraftStore<'a> {
    #[must_use]
    pub fn new(kv: &'a dyn KeyValueStore) -> Self {
        Self { kv }
    }

    /// The stored draft, or an empty one when nothing (or garbage) is stored.
    #[must_use]
    pub fn load(&self) -> Draft {
        let stored = get_json::<serde_json::Value>(self.kv, DRAFT_KEY)
            .map(Draft::from_value)
            .unwrap_or_default();
        normalize_draft(stored)
    }

    /// Whether anything is stored under the draft key.
    #[must_use]
    pub fn has_draft(&self) -> bool {
        self.kv.get(DRAFT_KEY).is_some()
    }

    /// Merge `patch` onto the stored draft and write the result back.
    ///
    /// Fields absent from `patch` keep their stored values.
    ///
    /// # Errors
    ///
    /// Returns the key-value backend's write error.
    pub fn save(&self, patch: Draft) -> Result<Draft, CoreError> {
        let merged = normalize_draft(self.load().merged(patch));
        set_json(self.kv, DRAFT_KEY, &merged)?;
        Ok(merged)
    }

    /// # Errors
    ///
    /// Returns the key-value backend's write error.
    pub fn clear(&self) -> Result<(), CoreError> {
        self.kv.remove(DRAFT_KEY)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::kv::MemoryKeyValueStore;

    fn patch(value: serde_json::Value) -> Draft {
        Draft::from_value(value)
    }

    #[test]
    fn load_of_empty_store_is_canonical_empty_draft() {
        let kv = MemoryKeyValueStore::new();
        let draft = DraftStore::new(&kv).load();
        assert_eq!(draft.images, Some(json!([])));
        assert!(draft.title.is_none());
    }

    #[test]
    fn saving_a_new_nightly_price_keeps_the_currency() {
        let kv = MemoryKeyValueStore::new();
        let store = DraftStore::new(&kv);
        store
            .save(patch(json!({"price": {"perNight": 300, "currency": "EUR"}})))
            .unwrap();
        let saved = store.save(patch(json!({"pricePerNight": 400}))).unwrap();
        assert_eq!(saved.price, Some(json!({"perNight": 400, "currency": "EUR"})));
        assert_eq!(store.load().price, saved.price);
    }

    #[test]
    fn partial_saves_never_erase_other_steps() {
        let kv = MemoryKeyValueStore::new();
        let store = DraftStore::new(&kv);
        store.save(patch(json!({"title": "y", "a": 1}))).unwrap();
        store.save(patch(json!({"description": "x", "b": 2}))).unwrap();

        let draft = store.load();
        assert_eq!(draft.title, Some(json!("y")));
        assert_eq!(draft.description, Some(json!("x")));
        assert_eq!(draft.extra.get("a"), Some(&json!(1)));
        assert_eq!(draft.extra.get("b"), Some(&json!(2)));
    }

    #[test]
    fn image_step_keeps_location_from_first_step() {
        let kv = MemoryKeyValueStore::new();
        let store = DraftStore::new(&kv);
        store.save(patch(json!({"locationText": "Bryne"}))).unwrap();
        store.save(patch(json!({"images": ["/u/1.jpg"]}))).unwrap();

        let draft = store.load();
        assert_eq!(draft.address, Some(json!("Bryne")));
        assert_eq!(draft.main_image_url, Some(json!("/u/1.jpg")));
    }

    #[test]
    fn garbage_in_storage_reads_as_empty() {
        let kv = MemoryKeyValueStore::new();
        kv.set(DRAFT_KEY, "{oops").unwrap();
        assert!(DraftStore::new(&kv).load().title.is_none());
    }

    #[test]
    fn clear_discards_the_draft() {
        let kv = MemoryKeyValueStore::new();
        let store = DraftStore::new(&kv);
        store.save(patch(json!({"title": "y"}))).unwrap();
        store.clear().unwrap();
        assert!(store.load().title.is_none());
    }
}
