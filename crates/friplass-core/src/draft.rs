//! The raw, partially filled listing shape.
//!
//! Every field is optional and kept as a JSON value, because clients have
//! written the same concept under different names and shapes over time.
//! Only [`crate::normalize`] looks inside these values.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::listing::Listing;
use crate::normalize::{non_blank, number_value};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Draft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_device_id: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_text: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_per_night: Option<Value>,
    /// Flat currency written by the MVP wizard next to `pricePerNight`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_urls: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main_image_url: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub badges: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suitability: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Draft {
    /// Interpret any JSON value as a draft. Non-objects become an empty draft.
    #[must_use]
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(_) => serde_json::from_value(value).unwrap_or_default(),
            _ => Self::default(),
        }
    }

    /// Parse a JSON document as a draft. Malformed text becomes an empty draft.
    #[must_use]
    pub fn from_json_str(raw: &str) -> Self {
        serde_json::from_str::<Value>(raw)
            .map(Self::from_value)
            .unwrap_or_default()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    fn touches_address(&self) -> bool {
        self.location_text.is_some()
            || self.address.is_some()
            || self
                .location
                .as_ref()
                .and_then(Value::as_object)
                .is_some_and(|loc| loc.contains_key("address"))
    }

    /// Currency named by the price object, else the flat field.
    fn stored_currency(&self) -> Option<String> {
        let nested = match self.price.as_ref() {
            Some(Value::Object(price)) => non_blank(price.get("currency")),
            _ => None,
        };
        nested.or_else(|| non_blank(self.currency.as_ref()))
    }

    /// Shallow merge: fields present in `patch` overwrite, absent ones are kept.
    ///
    /// Concepts stored under several names are merged as a unit: when the
    /// patch sets any alias of the address, price, image list or badge list,
    /// the stored aliases of that concept are dropped first so the patched
    /// value is the one that resolves.
    pub fn merge(&mut self, mut patch: Draft) {
        if patch.touches_address() {
            self.location_text = None;
            self.address = None;
            if let Some(Value::Object(loc)) = self.location.as_mut() {
                loc.remove("address");
            }
        }

        if patch.price.is_some() || patch.price_per_night.is_some() {
            let kept_currency = self.stored_currency();
            self.price = None;
            self.price_per_night = None;
            self.currency = None;
            if patch.stored_currency().is_none() {
                if let Some(currency) = kept_currency {
                    match patch.price.as_mut() {
                        Some(Value::Object(price)) => {
                            price.insert("currency".to_string(), Value::String(currency));
                        }
                        _ => patch.currency = Some(Value::String(currency)),
                    }
                }
            }
        } else if let Some(currency) = patch.currency.as_ref() {
            if let Some(Value::Object(price)) = self.price.as_mut() {
                price.insert("currency".to_string(), currency.clone());
            }
        }

        if patch.images.is_some() || patch.image_urls.is_some() {
            self.images = None;
            self.image_urls = None;
        }

        if patch.badges.is_some() || patch.suitability.is_some() {
            self.badges = None;
            self.suitability = None;
        }

        let Draft {
            id,
            owner_device_id,
            title,
            description,
            category,
            location,
            location_text,
            address,
            price,
            price_per_night,
            currency,
            images,
            image_urls,
            main_image_url,
            badges,
            suitability,
            created_at,
            updated_at,
            extra,
        } = patch;

        overwrite(&mut self.id, id);
        overwrite(&mut self.owner_device_id, owner_device_id);
        overwrite(&mut self.title, title);
        overwrite(&mut self.description, description);
        overwrite(&mut self.category, category);
        overwrite(&mut self.location, location);
        overwrite(&mut self.location_text, location_text);
        overwrite(&mut self.address, address);
        overwrite(&mut self.price, price);
        overwrite(&mut self.price_per_night, price_per_night);
        overwrite(&mut self.currency, currency);
        overwrite(&mut self.images, images);
        overwrite(&mut self.image_urls, image_urls);
        overwrite(&mut self.main_image_url, main_image_url);
        overwrite(&mut self.badges, badges);
        overwrite(&mut self.suitability, suitability);
        overwrite(&mut self.created_at, created_at);
        overwrite(&mut self.updated_at, updated_at);
        self.extra.extend(extra);
    }

    /// Consuming form of [`Draft::merge`].
    #[must_use]
    pub fn merged(mut self, patch: Draft) -> Self {
        self.merge(patch);
        self
    }
}

fn overwrite(slot: &mut Option<Value>, incoming: Option<Value>) {
    if incoming.is_some() {
        *slot = incoming;
    }
}

fn string_array(items: &[String]) -> Value {
    Value::Array(items.iter().cloned().map(Value::String).collect())
}

impl From<Listing> for Draft {
    fn from(listing: Listing) -> Self {
        let mut location = listing.location.extra;
        location.insert(
            "address".to_string(),
            Value::String(listing.location.address),
        );

        let mut extra = listing.extra;
        let price = match listing.price {
            Some(p) => {
                let mut obj = Map::new();
                obj.insert("perNight".to_string(), number_value(p.per_night));
                obj.insert("currency".to_string(), Value::String(p.currency));
                Some(Value::Object(obj))
            }
            None => extra.remove("price"),
        };

        let images = listing
            .images
            .into_iter()
            .map(|img| {
                let mut obj = Map::new();
                obj.insert("url".to_string(), Value::String(img.url));
                Value::Object(obj)
            })
            .collect();

        Self {
            id: Some(Value::String(listing.id)),
            owner_device_id: Some(Value::String(listing.owner_device_id)),
            title: Some(Value::String(listing.title)),
            description: Some(Value::String(listing.description)),
            category: Some(Value::String(listing.category.as_str().to_string())),
            location: Some(Value::Object(location)),
            location_text: Some(Value::String(listing.location_text)),
            address: Some(Value::String(listing.address)),
            price,
            price_per_night: listing.price_per_night.map(number_value),
            currency: extra.remove("currency"),
            images: Some(Value::Array(images)),
            image_urls: None,
            main_image_url: listing.main_image_url.map(Value::String),
            badges: Some(string_array(&listing.badges)),
            suitability: Some(string_array(&listing.suitability)),
            created_at: Some(Value::String(listing.created_at)),
            updated_at: listing.updated_at.map(Value::String),
            extra,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn draft(value: Value) -> Draft {
        Draft::from_value(value)
    }

    #[test]
    fn from_value_keeps_unknown_fields_in_extra() {
        let d = draft(json!({"title": "Kai", "minNights": 2}));
        assert_eq!(d.title, Some(json!("Kai")));
        assert_eq!(d.extra.get("minNights"), Some(&json!(2)));
    }

    #[test]
    fn from_value_non_object_is_empty() {
        assert!(Draft::from_value(json!([1, 2, 3])).is_empty());
        assert!(Draft::from_json_str("{not json").is_empty());
    }

    #[test]
    fn merge_keeps_fields_absent_from_patch() {
        let mut stored = draft(json!({"title": "y"}));
        stored.merge(draft(json!({"description": "x"})));
        assert_eq!(stored.title, Some(json!("y")));
        assert_eq!(stored.description, Some(json!("x")));
    }

    #[test]
    fn merge_keeps_extra_fields_from_both_sides() {
        let mut stored = draft(json!({"a": 1}));
        stored.merge(draft(json!({"b": 2})));
        assert_eq!(stored.extra.get("a"), Some(&json!(1)));
        assert_eq!(stored.extra.get("b"), Some(&json!(2)));
    }

    #[test]
    fn merge_replaces_every_address_alias_when_one_is_patched() {
        let mut stored = draft(json!({
            "location": {"address": "Gammel", "lat": 1.0},
            "locationText": "Gammel",
            "address": "Gammel"
        }));
        stored.merge(draft(json!({"locationText": "Ny"})));
        assert_eq!(stored.location_text, Some(json!("Ny")));
        assert!(stored.address.is_none());
        assert_eq!(stored.location, Some(json!({"lat": 1.0})));
    }

    #[test]
    fn merge_currency_only_updates_price_object() {
        let mut stored = draft(json!({"price": {"perNight": 300, "currency": "NOK"}}));
        stored.merge(draft(json!({"currency": "EUR"})));
        assert_eq!(stored.price, Some(json!({"perNight": 300, "currency": "EUR"})));
    }

    #[test]
    fn merge_price_without_currency_keeps_stored_currency() {
        let mut stored = draft(json!({"price": {"perNight": 300, "currency": "EUR"}}));
        stored.merge(draft(json!({"pricePerNight": 400})));
        assert_eq!(stored.price_per_night, Some(json!(400)));
        assert_eq!(stored.currency, Some(json!("EUR")));

        let mut stored = draft(json!({"pricePerNight": 300, "currency": "SEK"}));
        stored.merge(draft(json!({"price": {"perNight": 350}})));
        assert_eq!(stored.price, Some(json!({"perNight": 350, "currency": "SEK"})));
    }

    #[test]
    fn merge_price_with_its_own_currency_wins() {
        let mut stored = draft(json!({"price": {"perNight": 300, "currency": "EUR"}}));
        stored.merge(draft(json!({"pricePerNight": 400, "currency": "DKK"})));
        assert_eq!(stored.currency, Some(json!("DKK")));
    }

    #[test]
    fn merge_badges_replaces_both_lists() {
        let mut stored = draft(json!({"badges": ["strom"], "suitability": ["strom"]}));
        stored.merge(draft(json!({"badges": ["vann"]})));
        assert_eq!(stored.badges, Some(json!(["vann"])));
        assert!(stored.suitability.is_none());
    }
}
