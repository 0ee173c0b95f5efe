//! Conversion between the flat MVP wizard draft and the nested draft shape.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::draft::Draft;
use crate::normalize::{
    collect_images, non_blank, number_value, resolve_address, resolve_price, DEFAULT_CURRENCY,
};

/// Draft as written by the MVP wizard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MvpDraft {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub price_per_night: f64,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default)]
    pub image_urls: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main_image_url: Option<String>,
}

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

impl Default for MvpDraft {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            address: String::new(),
            price_per_night: 0.0,
            currency: default_currency(),
            image_urls: Vec::new(),
            main_image_url: None,
        }
    }
}

/// Nest the flat MVP fields: `location.address`, `price{perNight,currency}`
/// and `images[{url}]`.
#[must_use]
pub fn mvp_to_draft(mvp: MvpDraft) -> Draft {
    let mut location = Map::new();
    location.insert("address".to_string(), Value::String(mvp.address));

    let mut price = Map::new();
    price.insert("perNight".to_string(), number_value(mvp.price_per_night));
    price.insert("currency".to_string(), Value::String(mvp.currency));

    let images = mvp
        .image_urls
        .into_iter()
        .map(|url| {
            let mut obj = Map::new();
            obj.insert("url".to_string(), Value::String(url));
            Value::Object(obj)
        })
        .collect();

    Draft {
        title: Some(Value::String(mvp.title)),
        description: Some(Value::String(mvp.description)),
        location: Some(Value::Object(location)),
        price: Some(Value::Object(price)),
        images: Some(Value::Array(images)),
        main_image_url: mvp.main_image_url.map(Value::String),
        ..Draft::default()
    }
}

/// Flatten a draft back to the MVP shape. Missing values become empty
/// strings, a zero price and the default currency.
#[must_use]
pub fn draft_to_mvp(draft: &Draft) -> MvpDraft {
    let price = resolve_price(draft);
    MvpDraft {
        title: non_blank(draft.title.as_ref()).unwrap_or_default(),
        description: non_blank(draft.description.as_ref()).unwrap_or_default(),
        address: resolve_address(draft),
        price_per_night: price.as_ref().map_or(0.0, |p| p.per_night),
        currency: price.map_or_else(default_currency, |p| p.currency),
        image_urls: collect_images(draft).into_iter().map(|img| img.url).collect(),
        main_image_url: non_blank(draft.main_image_url.as_ref()),
    }
}
