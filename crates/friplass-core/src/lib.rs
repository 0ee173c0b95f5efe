//! Domain core for the friplass listing marketplace.
//!
//! Everything in this crate is synchronous and free of network or disk I/O.
//! Raw, legacy-shaped input enters as a [`Draft`]; the normalizer, classifier
//! and builder turn it into a canonical [`Listing`].

pub mod app_config;
pub mod autosave;
pub mod badges;
pub mod builder;
pub mod classify;
pub mod config;
pub mod device;
pub mod draft;
pub mod draft_store;
pub mod favorites;
pub mod filter;
pub mod kv;
pub mod legacy;
pub mod listing;
pub mod mvp;
pub mod normalize;
pub mod steps;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use autosave::Autosave;
pub use builder::{apply_update, build_listing, rehydrate, validate_draft, Problems};
pub use classify::{infer_category, normalize_explicit_category, resolve_category};
pub use config::{load_app_config, load_app_config_from_env};
pub use device::get_or_create_device_id;
pub use draft::Draft;
pub use draft_store::DraftStore;
pub use favorites::Favorites;
pub use filter::{filter_and_sort, owned_by, CategoryFilter, FilterSpec, SortMode};
pub use kv::{KeyValueStore, MemoryKeyValueStore};
pub use legacy::{migrate_legacy_keys, LegacyReport};
pub use listing::{Category, Image, Listing, Location, Price};
pub use mvp::{draft_to_mvp, mvp_to_draft, MvpDraft};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("key-value store write failed for '{key}': {reason}")]
    KeyValueWrite { key: String, reason: String },

    #[error("failed to encode value for '{key}': {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}
