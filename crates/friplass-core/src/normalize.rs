//! Field resolution from raw [`Draft`] shapes to canonical values.
//!
//! Every resolver here is total: fields that are missing or have an
//! unexpected JSON shape read as "not present" and never produce an error.

use serde_json::{Map, Value};
use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

use crate::draft::Draft;
use crate::listing::{Image, Price};

pub const DEFAULT_CURRENCY: &str = "NOK";

/// Coerce a scalar JSON value to text. Objects, arrays and null read as "".
#[must_use]
pub fn as_string(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

/// Trimmed text of a scalar JSON value, `None` when blank.
#[must_use]
pub fn non_blank(value: Option<&Value>) -> Option<String> {
    let s = as_string(value);
    let trimmed = s.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Lowercase, strip diacritics, collapse whitespace and trim.
///
/// `"  Båt  PLASS "` becomes `"bat plass"`. All text comparison in search
/// and category inference goes through this function.
#[must_use]
pub fn normalize_search_text(s: &str) -> String {
    let folded: String = s
        .to_lowercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect();
    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn location_address(draft: &Draft) -> Option<&Value> {
    draft
        .location
        .as_ref()
        .and_then(Value::as_object)
        .and_then(|loc| loc.get("address"))
}

/// First non-blank of `location.address`, `locationText`, `address`.
#[must_use]
pub fn resolve_address(draft: &Draft) -> String {
    non_blank(location_address(draft))
        .or_else(|| non_blank(draft.location_text.as_ref()))
        .or_else(|| non_blank(draft.address.as_ref()))
        .unwrap_or_default()
}

/// JSON number for `n`, written as an integer when it has no fractional part.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn number_value(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() < 9_007_199_254_740_992.0 {
        Value::from(n as i64)
    } else {
        Value::from(n)
    }
}

fn finite_number(value: Option<&Value>) -> Option<f64> {
    value.and_then(Value::as_f64).filter(|n| n.is_finite())
}

/// Nightly price from `price.perNight`, falling back to `pricePerNight`.
///
/// Returns `None` when neither is a finite number. Currency comes from
/// `price.currency`, then the flat `currency`, then [`DEFAULT_CURRENCY`].
#[must_use]
pub fn resolve_price(draft: &Draft) -> Option<Price> {
    let price_obj = draft.price.as_ref().and_then(Value::as_object);
    let per_night = finite_number(price_obj.and_then(|p| p.get("perNight")))
        .or_else(|| finite_number(draft.price_per_night.as_ref()))?;

    let currency = non_blank(price_obj.and_then(|p| p.get("currency")))
        .or_else(|| non_blank(draft.currency.as_ref()))
        .unwrap_or_else(|| DEFAULT_CURRENCY.to_string());

    Some(Price {
        per_night,
        currency,
    })
}

fn image_entries(value: Option<&Value>) -> Vec<Image> {
    let Some(Value::Array(items)) = value else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| match item {
            Value::String(url) => Some(url.as_str()),
            Value::Object(obj) => obj.get("url").and_then(Value::as_str),
            _ => None,
        })
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .map(Image::new)
        .collect()
}

/// The image list as stored, without the main-image promotion.
///
/// Reads `images` (URL strings or `{url}` objects); when that yields nothing
/// the legacy `imageUrls` list is used instead.
#[must_use]
pub fn collect_images(draft: &Draft) -> Vec<Image> {
    let images = image_entries(draft.images.as_ref());
    if images.is_empty() {
        image_entries(draft.image_urls.as_ref())
    } else {
        images
    }
}

fn explicit_main_image(draft: &Draft) -> Option<String> {
    non_blank(draft.main_image_url.as_ref())
}

/// Canonical image list. An explicit `mainImageUrl` missing from the list
/// is put in front of it.
#[must_use]
pub fn resolve_images(draft: &Draft) -> Vec<Image> {
    let mut images = collect_images(draft);
    if let Some(main) = explicit_main_image(draft) {
        if !images.iter().any(|img| img.url == main) {
            images.insert(0, Image::new(main));
        }
    }
    images
}

/// `mainImageUrl` if it is among the resolved images, else the first image.
#[must_use]
pub fn resolve_main_image(draft: &Draft) -> Option<String> {
    repair_main_image(&resolve_images(draft), explicit_main_image(draft).as_deref())
}

/// Keep `main` only if it names one of `images`; otherwise fall back to the
/// first image, or `None` for an empty list.
#[must_use]
pub fn repair_main_image(images: &[Image], main: Option<&str>) -> Option<String> {
    match main {
        Some(url) if images.iter().any(|img| img.url == url) => Some(url.to_string()),
        _ => images.first().map(|img| img.url.clone()),
    }
}

fn tag_entries(value: Option<&Value>) -> impl Iterator<Item = String> + '_ {
    value
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(|v| non_blank(Some(v)))
}

/// Union of `badges` and `suitability`, trimmed, deduplicated, first-seen order.
#[must_use]
pub fn resolve_badges(draft: &Draft) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for tag in tag_entries(draft.badges.as_ref()).chain(tag_entries(draft.suitability.as_ref())) {
        if !out.contains(&tag) {
            out.push(tag);
        }
    }
    out
}

fn with_address(location: Option<Value>, address: &str) -> Value {
    let mut loc = match location {
        Some(Value::Object(map)) => map,
        _ => Map::new(),
    };
    loc.insert("address".to_string(), Value::String(address.to_string()));
    Value::Object(loc)
}

fn string_array(items: &[String]) -> Value {
    Value::Array(items.iter().cloned().map(Value::String).collect())
}

/// Resolve address, price, images and badges and write each canonical value
/// back under every alias the draft uses for it. Fields the normalizer does
/// not own are left untouched, and the result is a fixed point.
#[must_use]
pub fn normalize_draft(mut draft: Draft) -> Draft {
    let address = resolve_address(&draft);
    let has_address_alias =
        draft.location_text.is_some() || draft.address.is_some() || location_address(&draft).is_some();
    if !address.is_empty() || has_address_alias {
        draft.location = Some(with_address(draft.location.take(), &address));
        draft.location_text = Some(Value::String(address.clone()));
        draft.address = Some(Value::String(address));
    }

    if let Some(price) = resolve_price(&draft) {
        let mut obj = match draft.price.take() {
            Some(Value::Object(map)) => map,
            _ => Map::new(),
        };
        obj.insert("perNight".to_string(), number_value(price.per_night));
        obj.insert("currency".to_string(), Value::String(price.currency));
        draft.price = Some(Value::Object(obj));
        draft.price_per_night = Some(number_value(price.per_night));
        draft.currency = None;
    }

    let images = resolve_images(&draft);
    let main = repair_main_image(&images, explicit_main_image(&draft).as_deref());
    draft.images = Some(Value::Array(
        images
            .into_iter()
            .map(|img| {
                let mut obj = Map::new();
                obj.insert("url".to_string(), Value::String(img.url));
                Value::Object(obj)
            })
            .collect(),
    ));
    draft.image_urls = None;
    draft.main_image_url = main.map(Value::String);

    if draft.badges.is_some() || draft.suitability.is_some() {
        let badges = string_array(&resolve_badges(&draft));
        draft.badges = Some(badges.clone());
        draft.suitability = Some(badges);
    }

    draft
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
