//! Backfill of canonical categories on stored records.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use friplass_core::normalize::as_string;
use friplass_core::{normalize_explicit_category, resolve_category, Category, Draft};
use serde::Serialize;
use serde_json::Value;

use crate::store::ListingStore;
use crate::StoreError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CategoryCounts {
    pub batplass: usize,
    pub bobilplass: usize,
    pub campingplass: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub missing: Option<usize>,
}

impl CategoryCounts {
    fn bump(&mut self, category: Category) {
        match category {
            Category::Batplass => self.batplass += 1,
            Category::Bobilplass => self.bobilplass += 1,
            Category::Campingplass => self.campingplass += 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationReport {
    pub ok: bool,
    pub total: usize,
    pub changed: usize,
    pub already_had: usize,
    pub before_counts: CategoryCounts,
    pub after_counts: CategoryCounts,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup: Option<PathBuf>,
}

/// Give every record a canonical `category`, in place.
///
/// Records with an unknown or missing category get an inferred one; records
/// with a recognized synonym are rewritten to the canonical spelling. Only
/// the `category` field is touched, and a second pass changes nothing.
pub fn migrate_categories(records: &mut [Draft]) -> MigrationReport {
    let mut before = CategoryCounts {
        missing: Some(0),
        ..CategoryCounts::default()
    };
    let mut after = CategoryCounts::default();
    let mut changed = 0;
    let mut already_had = 0;

    for record in records.iter_mut() {
        let raw = as_string(record.category.as_ref());
        match normalize_explicit_category(&raw) {
            Some(existing) => before.bump(existing),
            None => *before.missing.get_or_insert(0) += 1,
        }

        let resolved = resolve_category(record);
        if raw == resolved.as_str() {
            already_had += 1;
        } else {
            record.category = Some(Value::String(resolved.as_str().to_string()));
            changed += 1;
        }
        after.bump(resolved);
    }

    MigrationReport {
        ok: true,
        total: records.len(),
        changed,
        already_had,
        before_counts: before,
        after_counts: after,
        backup: None,
    }
}

/// `listings.json` becomes `listings.bak-20250601-120000.json`.
#[must_use]
pub fn backup_path(path: &Path, now: DateTime<Utc>) -> PathBuf {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("listings");
    path.with_file_name(format!("{stem}.bak-{}.json", now.format("%Y%m%d-%H%M%S")))
}

/// Run the migration against `store`.
///
/// With `backup_of` set, the file at that path is copied next to itself
/// before anything is written. A dry run reports without writing.
///
/// # Errors
///
/// Returns the store's read or write error, or an I/O error from the backup.
pub async fn run_category_migration(
    store: &dyn ListingStore,
    backup_of: Option<&Path>,
    dry_run: bool,
) -> Result<MigrationReport, StoreError> {
    let mut records = store.read_all().await?;
    let mut report = migrate_categories(&mut records);

    if dry_run {
        tracing::info!(total = report.total, changed = report.changed, "category migration dry run");
        return Ok(report);
    }

    if let Some(source) = backup_of {
        if tokio::fs::try_exists(source)
            .await
            .map_err(|e| StoreError::io(source, e))?
        {
            let target = backup_path(source, Utc::now());
            tokio::fs::copy(source, &target)
                .await
                .map_err(|e| StoreError::io(&target, e))?;
            tracing::info!(backup = %target.display(), "wrote listing backup");
            report.backup = Some(target);
        }
    }

    store.write_all(&records).await?;
    tracing::info!(
        total = report.total,
        changed = report.changed,
        already_had = report.already_had,
        "category migration finished"
    );
    Ok(report)
}
