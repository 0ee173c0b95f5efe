use uuid::Uuid;

use crate::kv::KeyValueStore;
use crate::CoreError;

pub const DEVICE_ID_KEY: &str = "friplass_device_id_v1";

/// The stored device id, or a fresh UUID v4 that is stored first.
///
/// # Errors
///
/// Returns the key-value backend's write error when a new id has to be saved.
pub fn get_or_create_device_id(kv: &dyn KeyValueStore) -> Result<String, CoreError> {
    if let Some(existing) = kv.get(DEVICE_ID_KEY).filter(|s| !s.trim().is_empty()) {
        return Ok(existing);
    }
    let id = Uuid::new_v4().to_string();
    kv.set(DEVICE_ID_KEY, &id)?;
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::MemoryKeyValueStore;

    #[test]
    fn creates_once_then_reuses() {
        let kv = MemoryKeyValueStore::new();
        let first = get_or_create_device_id(&kv).unwrap();
        assert!(Uuid::parse_str(&first).is_ok());
        assert_eq!(get_or_create_device_id(&kv).unwrap(), first);
    }

    #[test]
    fn blank_stored_id_is_replaced() {
        let kv = MemoryKeyValueStore::new();
        kv.set(DEVICE_ID_KEY, "  ").unwrap();
        let id = get_or_create_device_id(&kv).unwrap();
        assert!(!id.trim().is_empty());
    }
}
