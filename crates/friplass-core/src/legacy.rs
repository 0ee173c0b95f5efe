//! One-time move of client state stored under retired key names.
//!
//! Older clients wrote favorites, the device id and the draft under several
//! different keys. [`migrate_legacy_keys`] folds them into the canonical keys
//! once at startup so nothing else has to know the old names.

use serde_json::Value;

use crate::device::DEVICE_ID_KEY;
use crate::draft_store::DRAFT_KEY;
use crate::favorites::Favorites;
use crate::kv::KeyValueStore;
use crate::CoreError;

pub const LEGACY_FAVORITES_KEYS: [&str; 3] = ["favoritter", "favorites", "favourites"];

pub const LEGACY_DEVICE_ID_KEYS: [&str; 8] = [
    "ownerDeviceId",
    "mvp_ownerDeviceId",
    "deviceId",
    "mvp_deviceId",
    "friplass_ownerDeviceId",
    "friplass_deviceId",
    "mvp_owner_id",
    "mvp_device_id",
];

pub const LEGACY_DRAFT_KEY: &str = "friplass:mvp:draft";

/// What the migration moved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LegacyReport {
    pub favorites_added: usize,
    pub device_id_adopted: bool,
    pub draft_moved: bool,
}

impl LegacyReport {
    #[must_use]
    pub fn is_noop(&self) -> bool {
        *self == Self::default()
    }
}

/// Ids from a legacy favorites entry: a bare array or `{"ids": [...]}`.
fn legacy_favorite_ids(raw: &str) -> Vec<String> {
    let parsed: Value = serde_json::from_str(raw).unwrap_or(Value::Null);
    let items = match parsed {
        Value::Array(items) => items,
        Value::Object(mut obj) => match obj.remove("ids") {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    };
    items
        .into_iter()
        .filter_map(|v| match v {
            Value::String(s) if !s.trim().is_empty() => Some(s),
            _ => None,
        })
        .collect()
}

/// Fold legacy entries into the canonical keys and delete the legacy ones.
///
/// Running it again is a no-op.
///
/// # Errors
///
/// Returns the key-value backend's write error. Keys written before the
/// failure stay written.
pub fn migrate_legacy_keys(kv: &dyn KeyValueStore) -> Result<LegacyReport, CoreError> {
    let mut report = LegacyReport::default();

    let favorites = Favorites::new(kv);
    let mut ids = favorites.list();
    let mut found_legacy_favorites = false;
    for key in LEGACY_FAVORITES_KEYS {
        let Some(raw) = kv.get(key) else { continue };
        found_legacy_favorites = true;
        for id in legacy_favorite_ids(&raw) {
            if !ids.contains(&id) {
                ids.push(id);
                report.favorites_added += 1;
            }
        }
        kv.remove(key)?;
    }
    if found_legacy_favorites {
        favorites.write(&ids)?;
    }

    let current = kv.get(DEVICE_ID_KEY).filter(|s| !s.trim().is_empty());
    if current.is_none() {
        let legacy = LEGACY_DEVICE_ID_KEYS
            .iter()
            .find_map(|key| kv.get(key).map(|s| s.trim().to_string()).filter(|s| !s.is_empty()));
        if let Some(id) = legacy {
            kv.set(DEVICE_ID_KEY, &id)?;
            report.device_id_adopted = true;
        }
    }

    if let Some(raw) = kv.get(LEGACY_DRAFT_KEY) {
        if kv.get(DRAFT_KEY).is_none() {
            kv.set(DRAFT_KEY, &raw)?;
            report.draft_moved = true;
        }
        kv.remove(LEGACY_DRAFT_KEY)?;
    }

    Ok(report)
}
