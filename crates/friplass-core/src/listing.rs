use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The closed set of listing categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Boat mooring.
    Batplass,
    /// Motorhome / camper spot.
    Bobilplass,
    /// Camping, tent or caravan spot.
    Campingplass,
}

impl Category {
    pub const ALL: [Category; 3] = [
        Category::Batplass,
        Category::Bobilplass,
        Category::Campingplass,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Batplass => "batplass",
            Category::Bobilplass => "bobilplass",
            Category::Campingplass => "campingplass",
        }
    }

    /// Display label used by the storefront.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Category::Batplass => "Båtplass",
            Category::Bobilplass => "Bobilplass",
            Category::Campingplass => "Campingplass",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    pub url: String,
}

impl Image {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Price {
    pub per_night: f64,
    /// ISO 4217 code; `NOK` unless the host said otherwise.
    pub currency: String,
}

/// Nested location object. Keys other than `address` (coordinates, place
/// ids written by older clients) are carried through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Location {
    #[serde(default)]
    pub address: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A persisted listing in canonical shape.
///
/// `location.address`, `location_text` and `address` always hold the same
/// string, and `price_per_night` mirrors `price.per_night`. Fields the
/// builder does not know about (availability, minimum nights, cleaning fee)
/// live in `extra` and are written back verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    pub id: String,
    #[serde(default)]
    pub owner_device_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub category: Category,
    /// The category text exactly as stored, before synonym mapping or
    /// inference. Blank when the record had none. Free-text search matches
    /// against this rather than the resolved category.
    #[serde(skip)]
    pub raw_category: String,
    #[serde(default)]
    pub location: Location,
    #[serde(default)]
    pub location_text: String,
    #[serde(default)]
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Price>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_per_night: Option<f64>,
    #[serde(default)]
    pub images: Vec<Image>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main_image_url: Option<String>,
    #[serde(default)]
    pub badges: Vec<String>,
    #[serde(default)]
    pub suitability: Vec<String>,
    /// ISO-8601 creation timestamp; kept as text so legacy values survive.
    #[serde(default)]
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Listing {
    /// The resolved nightly price, if any.
    #[must_use]
    pub fn price_per_night(&self) -> Option<f64> {
        self.price
            .as_ref()
            .map(|p| p.per_night)
            .or(self.price_per_night)
            .filter(|p| p.is_finite())
    }

    /// Creation time in epoch milliseconds; unparseable or missing values
    /// count as the epoch.
    #[must_use]
    pub fn created_at_millis(&self) -> i64 {
        parse_timestamp_millis(&self.created_at).unwrap_or(0)
    }
}

/// Parse an ISO-8601 timestamp (or a bare `YYYY-MM-DD` date) to epoch millis.
#[must_use]
pub fn parse_timestamp_millis(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(raw) {
        return Some(dt.timestamp_millis());
    }
    chrono::NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc().timestamp_millis())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_serializes_lowercase() {
        let json = serde_json::to_string(&Category::Batplass).unwrap();
        assert_eq!(json, "\"batplass\"");
    }

    #[test]
    fn location_keeps_unknown_keys() {
        let loc: Location =
            serde_json::from_value(serde_json::json!({"address": "Egersund", "lat": 58.45}))
                .unwrap();
        assert_eq!(loc.address, "Egersund");
        assert_eq!(loc.extra.get("lat").and_then(Value::as_f64), Some(58.45));
    }

    #[test]
    fn parse_timestamp_accepts_rfc3339_and_plain_dates() {
        assert_eq!(
            parse_timestamp_millis("1970-01-01T00:00:01Z"),
            Some(1_000)
        );
        assert_eq!(parse_timestamp_millis("1970-01-02"), Some(86_400_000));
        assert_eq!(parse_timestamp_millis("yesterday"), None);
        assert_eq!(parse_timestamp_millis(""), None);
    }
}
