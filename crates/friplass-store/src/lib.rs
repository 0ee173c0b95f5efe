//! Persistence for the friplass listing collection.
//!
//! The record store is a single JSON array on disk. [`ListingRepository`]
//! layers the listing builder over it; [`migrate`] and [`uploads`] hold the
//! maintenance runner and the local upload collaborator.

pub mod migrate;
pub mod repository;
pub mod session;
pub mod store;
pub mod uploads;

use std::path::PathBuf;

use friplass_core::Problems;
use thiserror::Error;

pub use migrate::{migrate_categories, run_category_migration, CategoryCounts, MigrationReport};
pub use repository::ListingRepository;
pub use session::JsonFileKeyValueStore;
pub use store::{JsonFileStore, ListingStore, MemoryStore};
pub use uploads::{LocalUploads, StoredUpload, UploadError};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("listing not found: {0}")]
    NotFound(String),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} does not hold a listing array: {reason}", path.display())]
    Json { path: PathBuf, reason: String },

    #[error("listing failed validation: {0}")]
    Validation(#[from] Problems),
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
