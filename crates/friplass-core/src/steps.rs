//! Field rules for the individual wizard steps.
//!
//! These are stricter than the publish gate in [`crate::builder`] and are
//! applied per step, before the step's values are saved into the draft.

use serde_json::Value;

use crate::builder::Problems;
use crate::classify::normalize_explicit_category;
use crate::draft::Draft;
use crate::listing::Category;
use crate::normalize::as_string;

pub const SUITABILITY_VALUES: [&str; 5] = ["familie", "hund", "stille", "naer_sentrum", "strom"];
pub const AVAILABILITY_VALUES: [&str; 3] = ["hverdag", "helg", "begge"];

const MAX_PRICE: i64 = 20_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step1Values {
    pub title: String,
    pub category: Category,
    pub location_text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step2Values {
    pub description: String,
    pub suitability: Vec<String>,
    pub availability: String,
    pub available_from: Option<String>,
    pub available_to: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step3Values {
    pub price_per_night: i64,
    pub cleaning_fee: i64,
    pub min_nights: i64,
}

fn field<'a>(draft: &'a Draft, name: &str) -> Option<&'a Value> {
    draft.extra.get(name)
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Title, category and place.
///
/// # Errors
///
/// Returns every broken rule.
pub fn validate_step1(draft: &Draft) -> Result<Step1Values, Problems> {
    let mut problems = Problems::default();

    let title = as_string(draft.title.as_ref());
    if char_len(&title) < 6 {
        problems.push("Tittel må være minst 6 tegn");
    } else if char_len(&title) > 80 {
        problems.push("Maks 80 tegn");
    }

    let category = normalize_explicit_category(&as_string(draft.category.as_ref()));
    if category.is_none() {
        problems.push("Velg en kategori");
    }

    let location_text = as_string(draft.location_text.as_ref());
    if char_len(&location_text) < 2 {
        problems.push("Skriv sted (f.eks. Egersund)");
    } else if char_len(&location_text) > 80 {
        problems.push("Maks 80 tegn");
    }

    match category {
        Some(category) if problems.is_empty() => Ok(Step1Values {
            title,
            category,
            location_text,
        }),
        _ => Err(problems),
    }
}

/// Description, suitability tags and availability window.
///
/// Dates are `YYYY-MM-DD` and compared as text.
///
/// # Errors
///
/// Returns every broken rule.
pub fn validate_step2(draft: &Draft) -> Result<Step2Values, Problems> {
    let mut problems = Problems::default();

    let description = as_string(draft.description.as_ref());
    if char_len(&description) < 20 {
        problems.push("Beskrivelse må være minst 20 tegn");
    } else if char_len(&description) > 1200 {
        problems.push("Maks 1200 tegn");
    }

    let mut suitability = Vec::new();
    if let Some(Value::Array(items)) = draft.suitability.as_ref() {
        for item in items {
            match item.as_str() {
                Some(tag) if SUITABILITY_VALUES.contains(&tag) => suitability.push(tag.to_string()),
                _ => problems.push("Ugyldig valg"),
            }
        }
    }

    let availability = as_string(field(draft, "availability"));
    if !AVAILABILITY_VALUES.contains(&availability.as_str()) {
        problems.push("Velg tilgjengelighet");
    }

    let date = |name: &str| {
        let s = as_string(field(draft, name));
        let s = s.trim();
        (!s.is_empty()).then(|| s.to_string())
    };
    let available_from = date("availableFrom");
    let available_to = date("availableTo");
    if let (Some(from), Some(to)) = (&available_from, &available_to) {
        if from > to {
            problems.push("Til-dato kan ikke være før fra-dato");
        }
    }

    problems.into_result()?;
    Ok(Step2Values {
        description,
        suitability,
        availability,
        available_from,
        available_to,
    })
}

/// Integer from a JSON number or numeric string.
fn coerce_int(value: Option<&Value>) -> Result<Option<i64>, &'static str> {
    let n = match value {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) if s.trim().is_empty() => return Ok(None),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        Some(_) => None,
    };
    match n {
        Some(n) if n.is_finite() && n.fract() == 0.0 => {
            #[allow(clippy::cast_possible_truncation)]
            let n = n as i64;
            Ok(Some(n))
        }
        Some(n) if n.is_finite() => Err("Må være heltall"),
        _ => Err("Må være et tall"),
    }
}

fn ranged(
    problems: &mut Problems,
    value: Option<&Value>,
    default: Option<i64>,
    (min, min_msg): (i64, &str),
    (max, max_msg): (i64, &str),
) -> i64 {
    match coerce_int(value) {
        Ok(n) => {
            let Some(n) = n.or(default) else {
                problems.push("Må være et tall");
                return 0;
            };
            if n < min {
                problems.push(min_msg);
            } else if n > max {
                problems.push(max_msg);
            }
            n
        }
        Err(msg) => {
            problems.push(msg);
            0
        }
    }
}

/// Nightly price, cleaning fee and minimum stay.
///
/// # Errors
///
/// Returns every broken rule.
pub fn validate_step3(draft: &Draft) -> Result<Step3Values, Problems> {
    let mut problems = Problems::default();
    let price_per_night = ranged(
        &mut problems,
        draft.price_per_night.as_ref(),
        None,
        (0, "Kan ikke være negativ"),
        (MAX_PRICE, "Virker veldig høyt"),
    );
    let cleaning_fee = ranged(
        &mut problems,
        field(draft, "cleaningFee"),
        Some(0),
        (0, "Kan ikke være negativ"),
        (MAX_PRICE, "Virker veldig høyt"),
    );
    let min_nights = ranged(
        &mut problems,
        field(draft, "minNights"),
        None,
        (1, "Minimum 1 natt"),
        (30, "Maks 30 netter"),
    );
    problems.into_result()?;
    Ok(Step3Values {
        price_per_night,
        cleaning_fee,
        min_nights,
    })
}

/// The chosen main image must exist when there are images at all.
///
/// # Errors
///
/// Returns a problem when `main_index` is outside a non-empty list.
pub fn validate_main_image_index(image_count: usize, main_index: usize) -> Result<(), Problems> {
    let mut problems = Problems::default();
    if image_count > 0 && main_index >= image_count {
        problems.push("Velg et hovedbilde");
    }
    problems.into_result()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn draft(value: Value) -> Draft {
        Draft::from_value(value)
    }

    #[test]
    fn step1_accepts_synonym_category() {
        let values = validate_step1(&draft(json!({
            "title": "Bobilplass i Sirdal",
            "category": "bobil",
            "locationText": "Sirdal"
        })))
        .unwrap();
        assert_eq!(values.category, Category::Bobilplass);
    }

    #[test]
    fn step1_collects_all_problems() {
        let problems = validate_step1(&draft(json!({
            "title": "Kort",
            "category": "parkering",
            "locationText": "X"
        })))
        .unwrap_err();
        assert_eq!(problems.len(), 3);
    }

    #[test]
    fn step2_rejects_unknown_tags_and_reversed_dates() {
        let problems = validate_step2(&draft(json!({
            "description": "En lang nok beskrivelse av plassen.",
            "suitability": ["familie", "disco"],
            "availability": "helg",
            "availableFrom": "2025-07-10",
            "availableTo": "2025-07-01"
        })))
        .unwrap_err();
        assert_eq!(
            problems.into_vec(),
            vec!["Ugyldig valg", "Til-dato kan ikke være før fra-dato"]
        );
    }

    #[test]
    fn step2_accepts_open_ended_window() {
        let values = validate_step2(&draft(json!({
            "description": "En lang nok beskrivelse av plassen.",
            "availability": "begge",
            "availableFrom": "2025-07-10"
        })))
        .unwrap();
        assert!(values.suitability.is_empty());
        assert_eq!(values.available_to, None);
    }

    #[test]
    fn step3_coerces_strings_and_defaults_cleaning_fee() {
        let values = validate_step3(&draft(json!({
            "pricePerNight": "250",
            "minNights": 2
        })))
        .unwrap();
        assert_eq!(
            values,
            Step3Values {
                price_per_night: 250,
                cleaning_fee: 0,
                min_nights: 2
            }
        );
    }

    #[test]
    fn step3_rejects_fractions_and_ranges() {
        let problems = validate_step3(&draft(json!({
            "pricePerNight": 99.5,
            "cleaningFee": -1,
            "minNights": 31
        })))
        .unwrap_err();
        assert_eq!(
            problems.into_vec(),
            vec!["Må være heltall", "Kan ikke være negativ", "Maks 30 netter"]
        );
    }

    #[test]
    fn main_image_index_must_be_in_range() {
        assert!(validate_main_image_index(0, 5).is_ok());
        assert!(validate_main_image_index(3, 2).is_ok());
        assert!(validate_main_image_index(3, 3).is_err());
    }
}
