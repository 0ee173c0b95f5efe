//! Browse-time filtering and ordering of the listing collection.

use std::cmp::Ordering;
use std::collections::HashSet;

use crate::listing::{Category, Listing};
use crate::normalize::normalize_search_text;

/// Query words that surface boat listings even when the listing text does
/// not contain them.
const BOAT_SEARCH_TERMS: [&str; 6] = ["brygge", "brygga", "kai", "marina", "flytebrygge", "bathavn"];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CategoryFilter {
    #[default]
    Alle,
    Only(Category),
}

impl CategoryFilter {
    /// `batplass`, `båtplass`, `bobilplass` or `campingplass` in any case;
    /// everything else means all categories.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "batplass" | "båtplass" => Self::Only(Category::Batplass),
            "bobilplass" => Self::Only(Category::Bobilplass),
            "campingplass" => Self::Only(Category::Campingplass),
            _ => Self::Alle,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Alle => "alle",
            Self::Only(category) => category.as_str(),
        }
    }

    fn admits(self, category: Category) -> bool {
        match self {
            Self::Alle => true,
            Self::Only(wanted) => wanted == category,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortMode {
    #[default]
    Newest,
    PriceAsc,
    PriceDesc,
}

impl SortMode {
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "price_asc" => Self::PriceAsc,
            "price_desc" => Self::PriceDesc,
            _ => Self::Newest,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Newest => "newest",
            Self::PriceAsc => "price_asc",
            Self::PriceDesc => "price_desc",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSpec {
    pub category: CategoryFilter,
    pub query: String,
    pub sort: SortMode,
    pub favorites_only: bool,
}

impl FilterSpec {
    /// Build a filter from URL query values. Unknown values fall back to the
    /// defaults rather than failing.
    #[must_use]
    pub fn from_query(
        category: Option<&str>,
        q: Option<&str>,
        sort: Option<&str>,
        favorites: Option<&str>,
    ) -> Self {
        Self {
            category: category.map(CategoryFilter::parse).unwrap_or_default(),
            query: q.unwrap_or_default().to_string(),
            sort: sort.map(SortMode::parse).unwrap_or_default(),
            favorites_only: favorites.is_some_and(|f| {
                matches!(f.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on")
            }),
        }
    }

    /// Query parameters for this filter, leaving out default values.
    #[must_use]
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if self.category != CategoryFilter::Alle {
            pairs.push(("category", self.category.as_str().to_string()));
        }
        let q = self.query.trim();
        if !q.is_empty() {
            pairs.push(("q", q.to_string()));
        }
        if self.sort != SortMode::Newest {
            pairs.push(("sort", self.sort.as_str().to_string()));
        }
        if self.favorites_only {
            pairs.push(("favorites", "1".to_string()));
        }
        pairs
    }

    #[must_use]
    pub fn is_default(&self) -> bool {
        self.to_query_pairs().is_empty()
    }
}

fn haystack(listing: &Listing) -> String {
    let badges = listing.badges.join(" ");
    [
        listing.title.as_str(),
        listing.description.as_str(),
        listing.address.as_str(),
        badges.as_str(),
        listing.raw_category.as_str(),
    ]
    .iter()
    .map(|s| normalize_search_text(s))
    .collect::<Vec<_>>()
    .join(" ")
}

/// Newest first; equal timestamps order by id, descending.
pub fn newest_first(a: &Listing, b: &Listing) -> Ordering {
    b.created_at_millis()
        .cmp(&a.created_at_millis())
        .then_with(|| b.id.cmp(&a.id))
}

fn by_price(a: &Listing, b: &Listing, descending: bool) -> Ordering {
    match (a.price_per_night(), b.price_per_night()) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(pa), Some(pb)) if descending => pb.total_cmp(&pa),
        (Some(pa), Some(pb)) => pa.total_cmp(&pb),
    }
}

/// The listings to display for `spec`, in display order.
///
/// Pure and deterministic: the same inputs always give the same output.
#[must_use]
pub fn filter_and_sort<'a>(
    listings: &'a [Listing],
    spec: &FilterSpec,
    favorites: &HashSet<String>,
) -> Vec<&'a Listing> {
    let query = normalize_search_text(&spec.query);
    let boat_query = !query.is_empty() && BOAT_SEARCH_TERMS.iter().any(|w| query.contains(w));

    let mut out: Vec<&Listing> = listings
        .iter()
        .filter(|l| spec.category.admits(l.category))
        .filter(|l| !spec.favorites_only || favorites.contains(&l.id))
        .filter(|l| {
            query.is_empty()
                || haystack(l).contains(&query)
                || (boat_query && l.category == Category::Batplass)
        })
        .collect();

    match spec.sort {
        SortMode::Newest => out.sort_by(|a, b| newest_first(a, b)),
        SortMode::PriceAsc => out.sort_by(|a, b| by_price(a, b, false)),
        SortMode::PriceDesc => out.sort_by(|a, b| by_price(a, b, true)),
    }
    out
}

/// Listings owned by `device_id`, plus legacy listings with no owner, newest
/// first. A blank device id owns nothing but the ownerless listings.
#[must_use]
pub fn owned_by<'a>(listings: &'a [Listing], device_id: &str) -> Vec<&'a Listing> {
    let device_id = device_id.trim();
    let mut out: Vec<&Listing> = listings
        .iter()
        .filter(|l| {
            let owner = l.owner_device_id.trim();
            owner.is_empty() || (!device_id.is_empty() && owner == device_id)
        })
        .collect();
    out.sort_by(|a, b| newest_first(a, b));
    out
}

#[cfg(test)]
#[path = "filter_test.rs"]
mod tests;
