//! Turning drafts into persist-ready listings.

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Value};
use thiserror::Error;
use uuid::Uuid;

use crate::classify::resolve_category;
use crate::draft::Draft;
use crate::listing::{Category, Listing, Location};
use crate::normalize::{
    as_string, collect_images, non_blank, normalize_draft, repair_main_image, resolve_address,
    resolve_badges, resolve_images, resolve_price,
};

pub const MIN_TITLE_CHARS: usize = 5;
pub const MIN_DESCRIPTION_CHARS: usize = 20;

/// Human-readable validation problems, reported all at once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
#[error("{}", .0.join(" "))]
pub struct Problems(pub Vec<String>);

impl Problems {
    pub fn push(&mut self, problem: impl Into<String>) {
        self.0.push(problem.into());
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<String> {
        self.0
    }

    /// `Ok(())` when nothing was reported.
    ///
    /// # Errors
    ///
    /// Returns `self` when at least one problem was pushed.
    pub fn into_result(self) -> Result<(), Problems> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

/// ISO-8601 with millisecond precision and a `Z` suffix.
#[must_use]
pub fn timestamp(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn trimmed_text(value: Option<&Value>) -> String {
    as_string(value).trim().to_string()
}

/// Minimum-content rules that gate publishing.
///
/// # Errors
///
/// Returns every rule the draft breaks.
pub fn validate_draft(draft: &Draft) -> Result<(), Problems> {
    let mut problems = Problems::default();
    if trimmed_text(draft.title.as_ref()).chars().count() < MIN_TITLE_CHARS {
        problems.push("Tittel må være minst 5 tegn.");
    }
    if trimmed_text(draft.description.as_ref()).chars().count() < MIN_DESCRIPTION_CHARS {
        problems.push("Beskrivelse må være minst 20 tegn.");
    }
    if resolve_images(draft).is_empty() {
        problems.push("Minst ett bilde må lastes opp.");
    }
    problems.into_result()
}

/// Build a new listing from a raw draft.
///
/// Missing `id` and `ownerDeviceId` get fresh UUIDs and a missing
/// `createdAt` becomes `now`. Nothing is returned unless validation passes.
///
/// # Errors
///
/// Returns [`Problems`] when the draft fails [`validate_draft`].
pub fn build_listing(draft: Draft, now: DateTime<Utc>) -> Result<Listing, Problems> {
    validate_draft(&draft)?;

    let mut draft = normalize_draft(draft);
    let id = non_blank(draft.id.as_ref()).unwrap_or_else(|| Uuid::new_v4().to_string());
    let owner = non_blank(draft.owner_device_id.as_ref())
        .unwrap_or_else(|| Uuid::new_v4().to_string());
    let created_at = non_blank(draft.created_at.as_ref()).unwrap_or_else(|| timestamp(now));

    draft.id = Some(Value::String(id));
    draft.owner_device_id = Some(Value::String(owner));
    draft.created_at = Some(Value::String(created_at));

    let category = resolve_category(&draft);
    Ok(assemble(draft, category))
}

/// Apply a patch to a stored listing.
///
/// Patch fields win, except `id` and `createdAt`, which always keep the
/// stored values. `updatedAt` becomes `now`. A main image that does not name
/// one of the resulting images falls back to the first image.
#[must_use]
pub fn apply_update(existing: &Listing, patch: Draft, now: DateTime<Utc>) -> Listing {
    let mut draft = Draft::from(existing.clone()).merged(patch);
    draft.id = Some(Value::String(existing.id.clone()));
    draft.created_at = Some(Value::String(existing.created_at.clone()));
    draft.updated_at = Some(Value::String(timestamp(now)));

    let images = collect_images(&draft);
    let main = repair_main_image(&images, non_blank(draft.main_image_url.as_ref()).as_deref());
    draft.main_image_url = main.map(Value::String);

    let draft = normalize_draft(draft);
    let category = resolve_category(&draft);
    assemble(draft, category)
}

/// Read a stored record as a canonical listing.
///
/// Returns `None` for records without an id; those cannot be addressed.
#[must_use]
pub fn rehydrate(raw: &Draft) -> Option<Listing> {
    non_blank(raw.id.as_ref())?;
    let draft = normalize_draft(raw.clone());
    let category = resolve_category(&draft);
    Some(assemble(draft, category))
}

/// Project a normalized draft onto the typed listing.
fn assemble(draft: Draft, category: Category) -> Listing {
    let address = resolve_address(&draft);
    let price = resolve_price(&draft);
    let images = collect_images(&draft);
    let main_image_url = repair_main_image(&images, non_blank(draft.main_image_url.as_ref()).as_deref());
    let badges = resolve_badges(&draft);
    let suitability = if draft.suitability.is_some() {
        badges.clone()
    } else {
        Vec::new()
    };

    let mut location_extra = match draft.location {
        Some(Value::Object(map)) => map,
        _ => Map::new(),
    };
    location_extra.remove("address");

    let raw_category = trimmed_text(draft.category.as_ref());

    let mut extra = draft.extra;
    // A flat currency without a price has nowhere else to live.
    if let Some(currency) = draft.currency {
        extra.insert("currency".to_string(), currency);
    }
    // Same for a price object with no usable nightly amount.
    if price.is_none() {
        if let Some(raw_price) = draft.price {
            extra.insert("price".to_string(), raw_price);
        }
    }

    Listing {
        id: trimmed_text(draft.id.as_ref()),
        owner_device_id: trimmed_text(draft.owner_device_id.as_ref()),
        title: trimmed_text(draft.title.as_ref()),
        description: trimmed_text(draft.description.as_ref()),
        category,
        raw_category,
        location: Location {
            address: address.clone(),
            extra: location_extra,
        },
        location_text: address.clone(),
        address,
        price_per_night: price.as_ref().map(|p| p.per_night),
        price,
        images,
        main_image_url,
        badges,
        suitability,
        created_at: trimmed_text(draft.created_at.as_ref()),
        updated_at: non_blank(draft.updated_at.as_ref()),
        extra,
    }
}

#[cfg(test)]
#[path = "builder_test.rs"]
mod tests;
