//! Category resolution: explicit synonyms first, keyword inference second.

use crate::draft::Draft;
use crate::listing::Category;
use crate::normalize::{as_string, normalize_search_text, resolve_address};

/// Keyword families in the order they are tested. The first family with a
/// hit decides the category, so boat words beat camping words.
const KEYWORD_FAMILIES: [(Category, &[&str]); 3] = [
    (
        Category::Batplass,
        &[
            "bat",
            "batplass",
            "brygge",
            "brygga",
            "kai",
            "marina",
            "naust",
            "bathavn",
            "flytebrygge",
        ],
    ),
    (Category::Bobilplass, &["bobil", "camper", "motorhome"]),
    (
        Category::Campingplass,
        &[
            "camping",
            "campingvogn",
            "telt",
            "teltplass",
            "hengekoye",
            "hammock",
        ],
    ),
];

/// Unclassifiable text lands here.
pub const FALLBACK_CATEGORY: Category = Category::Campingplass;

/// Map a stored or user-supplied category string to a canonical category.
///
/// Matching is exact on the normalized text, so `"Båtplass "` is recognized
/// but `"båtplass i nord"` is not. Returns `None` for blank or unknown input.
#[must_use]
pub fn normalize_explicit_category(raw: &str) -> Option<Category> {
    match normalize_search_text(raw).as_str() {
        "batplass" | "bat" => Some(Category::Batplass),
        "bobil" | "bobilplass" => Some(Category::Bobilplass),
        "campingplass" | "campingvogn" | "teltplass" | "telt" => Some(Category::Campingplass),
        _ => None,
    }
}

/// Guess a category from free text.
///
/// Keywords are matched as substrings of the normalized haystack, so
/// "flytebrygga" and "bobilparkering" both hit.
#[must_use]
pub fn infer_category(title: &str, description: &str, address: &str) -> Category {
    let haystack = normalize_search_text(&format!("{title} {description} {address}"));
    KEYWORD_FAMILIES
        .iter()
        .find(|(_, words)| words.iter().any(|w| haystack.contains(w)))
        .map_or(FALLBACK_CATEGORY, |(category, _)| *category)
}

/// Final category for a draft: the explicit value when it is recognized,
/// otherwise inferred from title, description and address.
#[must_use]
pub fn resolve_category(draft: &Draft) -> Category {
    normalize_explicit_category(&as_string(draft.category.as_ref())).unwrap_or_else(|| {
        infer_category(
            &as_string(draft.title.as_ref()),
            &as_string(draft.description.as_ref()),
            &resolve_address(draft),
        )
    })
}
