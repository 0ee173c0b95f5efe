use std::sync::Arc;

use chrono::Utc;
use friplass_core::normalize::non_blank;
use friplass_core::{apply_update, build_listing, rehydrate, Draft, Listing};

use crate::store::ListingStore;
use crate::StoreError;

/// CRUD over the listing collection.
///
/// Every mutation reads the whole collection, changes it in memory and
/// writes it back. There is no lock around that cycle, so two concurrent
/// writers race and the last write wins.
#[derive(Clone)]
pub struct ListingRepository {
    store: Arc<dyn ListingStore>,
}

fn record_id(record: &Draft) -> Option<String> {
    non_blank(record.id.as_ref())
}

impl ListingRepository {
    pub fn new(store: Arc<dyn ListingStore>) -> Self {
        Self { store }
    }

    #[must_use]
    pub fn store(&self) -> &Arc<dyn ListingStore> {
        &self.store
    }

    /// Every addressable listing in stored order.
    ///
    /// Records without an id are skipped here but kept on disk.
    ///
    /// # Errors
    ///
    /// Returns the store's read error.
    pub async fn list(&self) -> Result<Vec<Listing>, StoreError> {
        let records = self.store.read_all().await?;
        let total = records.len();
        let listings: Vec<Listing> = records.iter().filter_map(rehydrate).collect();
        if listings.len() < total {
            tracing::warn!(
                skipped = total - listings.len(),
                "skipping stored records without an id"
            );
        }
        Ok(listings)
    }

    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] for an unknown id, or the store's
    /// read error.
    pub async fn find(&self, id: &str) -> Result<Listing, StoreError> {
        self.store
            .read_all()
            .await?
            .iter()
            .find(|r| record_id(r).as_deref() == Some(id))
            .and_then(rehydrate)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    /// Build a listing from `draft` and put it first in the collection.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Validation`] when the draft is rejected, or the
    /// store's I/O error.
    pub async fn create(&self, draft: Draft) -> Result<Listing, StoreError> {
        let listing = build_listing(draft, Utc::now())?;
        let mut records = self.store.read_all().await?;
        records.insert(0, Draft::from(listing.clone()));
        self.store.write_all(&records).await?;
        tracing::info!(id = %listing.id, category = %listing.category, "listing created");
        Ok(listing)
    }

    /// Merge `patch` into the listing with `id`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] for an unknown id, or the store's
    /// I/O error.
    pub async fn update(&self, id: &str, patch: Draft) -> Result<Listing, StoreError> {
        let mut records = self.store.read_all().await?;
        let (slot, existing) = records
            .iter()
            .enumerate()
            .filter(|(_, r)| record_id(r).as_deref() == Some(id))
            .find_map(|(i, r)| rehydrate(r).map(|l| (i, l)))
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        let updated = apply_update(&existing, patch, Utc::now());
        records[slot] = Draft::from(updated.clone());
        self.store.write_all(&records).await?;
        tracing::info!(id = %updated.id, "listing updated");
        Ok(updated)
    }

    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] for an unknown id, or the store's
    /// I/O error.
    pub async fn delete(&self, id: &str) -> Result<(), StoreError> {
        let mut records = self.store.read_all().await?;
        let before = records.len();
        records.retain(|r| record_id(r).as_deref() != Some(id));
        if records.len() == before {
            return Err(StoreError::NotFound(id.to_string()));
        }
        self.store.write_all(&records).await?;
        tracing::info!(id, "listing deleted");
        Ok(())
    }
}

#[cfg(test)]
#[path = "repository_test.rs"]
mod tests;
