use std::path::{Path, PathBuf};

use async_trait::async_trait;
use friplass_core::Draft;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::StoreError;

/// Whole-collection record store.
///
/// Records are raw drafts so that fields (and whole records) the builder
/// does not understand survive a read-modify-write cycle unchanged.
#[async_trait]
pub trait ListingStore: Send + Sync {
    /// All records in stored order. A store that does not exist yet is empty.
    async fn read_all(&self) -> Result<Vec<Draft>, StoreError>;

    /// Replace the whole collection. Readers see either the old or the new
    /// collection, never a mix.
    async fn write_all(&self, records: &[Draft]) -> Result<(), StoreError>;
}

/// Listings kept as a pretty-printed JSON array in one file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Parse the collection file. Blank text is an empty collection; anything
/// that is not a JSON array is an error rather than silently empty.
pub(crate) fn parse_collection(path: &Path, raw: &str) -> Result<Vec<Draft>, StoreError> {
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    let json_err = |reason: String| StoreError::Json {
        path: path.to_path_buf(),
        reason,
    };
    match serde_json::from_str::<Value>(raw).map_err(|e| json_err(e.to_string()))? {
        Value::Array(items) => Ok(items.into_iter().map(Draft::from_value).collect()),
        other => Err(json_err(format!("expected an array, found {}", kind(&other)))),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Write `bytes` to a sibling temp file and rename it over `path`.
pub(crate) async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    tokio::fs::create_dir_all(&parent)
        .await
        .map_err(|e| StoreError::io(&parent, e))?;

    let file_name = path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("listings.json");
    let tmp = parent.join(format!(
        ".{file_name}.tmp.{}.{:08x}",
        std::process::id(),
        rand::random::<u32>()
    ));

    if let Err(e) = tokio::fs::write(&tmp, bytes).await {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(StoreError::io(&tmp, e));
    }
    if let Err(e) = tokio::fs::rename(&tmp, path).await {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(StoreError::io(path, e));
    }
    Ok(())
}

#[async_trait]
impl ListingStore for JsonFileStore {
    async fn read_all(&self) -> Result<Vec<Draft>, StoreError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => parse_collection(&self.path, &raw),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(StoreError::io(&self.path, e)),
        }
    }

    async fn write_all(&self, records: &[Draft]) -> Result<(), StoreError> {
        let mut bytes = serde_json::to_vec_pretty(records).map_err(|e| StoreError::Json {
            path: self.path.clone(),
            reason: e.to_string(),
        })?;
        bytes.push(b'\n');
        write_atomic(&self.path, &bytes).await
    }
}

/// In-process store for tests and throwaway servers.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<Vec<Draft>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_records(records: Vec<Draft>) -> Self {
        Self {
            records: RwLock::new(records),
        }
    }
}

#[async_trait]
impl ListingStore for MemoryStore {
    async fn read_all(&self) -> Result<Vec<Draft>, StoreError> {
        Ok(self.records.read().await.clone())
    }

    async fn write_all(&self, records: &[Draft]) -> Result<(), StoreError> {
        *self.records.write().await = records.to_vec();
        Ok(())
    }
}
