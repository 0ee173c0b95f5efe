use serde_json::json;

use super::*;
use crate::builder::rehydrate;
use crate::draft::Draft;

fn listing(value: serde_json::Value) -> Listing {
    rehydrate(&Draft::from_value(value)).expect("fixture has an id")
}

fn ids<'a>(listings: &[&'a Listing]) -> Vec<&'a str> {
    listings.iter().map(|l| l.id.as_str()).collect()
}

fn fixtures() -> Vec<Listing> {
    vec![
        listing(json!({
            "id": "brygge-camping",
            "title": "Fin brygge",
            "description": "Teltplass rett ved vannet",
            "category": "campingplass",
            "pricePerNight": 150,
            "createdAt": "2025-01-03T00:00:00Z"
        })),
        listing(json!({
            "id": "naust",
            "title": "Båtplass i naust",
            "category": "batplass",
            "price": {"perNight": 400, "currency": "NOK"},
            "createdAt": "2025-01-05T00:00:00Z"
        })),
        listing(json!({
            "id": "bobil",
            "title": "Bobil ved fjorden",
            "badges": ["strom"],
            "createdAt": "2025-01-04T00:00:00Z"
        })),
        listing(json!({
            "id": "gammel",
            "title": "Hageflekk",
            "createdAt": "ikke en dato",
            "pricePerNight": 90
        })),
    ]
}

#[test]
fn default_spec_keeps_all_newest_first() {
    let all = fixtures();
    let out = filter_and_sort(&all, &FilterSpec::default(), &HashSet::new());
    assert_eq!(ids(&out), vec!["naust", "bobil", "brygge-camping", "gammel"]);
}

#[test]
fn text_match_ignores_explicit_category_but_filter_respects_it() {
    let all = fixtures();
    let spec = FilterSpec {
        query: "brygge".to_string(),
        ..FilterSpec::default()
    };
    let out = filter_and_sort(&all, &spec, &HashSet::new());
    assert!(ids(&out).contains(&"brygge-camping"));

    let spec = FilterSpec {
        category: CategoryFilter::Only(Category::Batplass),
        query: "brygge".to_string(),
        ..FilterSpec::default()
    };
    let out = filter_and_sort(&all, &spec, &HashSet::new());
    assert_eq!(ids(&out), vec!["naust"]);
}

#[test]
fn boat_query_surfaces_boat_listings_without_the_word() {
    let all = fixtures();
    let spec = FilterSpec {
        query: "Marina".to_string(),
        ..FilterSpec::default()
    };
    let out = filter_and_sort(&all, &spec, &HashSet::new());
    assert_eq!(ids(&out), vec!["naust"]);
}

#[test]
fn query_is_diacritic_insensitive() {
    let all = fixtures();
    let spec = FilterSpec {
        query: "BAT".to_string(),
        ..FilterSpec::default()
    };
    let out = filter_and_sort(&all, &spec, &HashSet::new());
    assert_eq!(ids(&out), vec!["naust"]);
}

#[test]
fn badges_are_searchable() {
    let all = fixtures();
    let spec = FilterSpec {
        query: "strom".to_string(),
        ..FilterSpec::default()
    };
    assert_eq!(ids(&filter_and_sort(&all, &spec, &HashSet::new())), vec!["bobil"]);
}

#[test]
fn favorites_only_keeps_favorites() {
    let all = fixtures();
    let favorites: HashSet<String> = ["gammel".to_string(), "bobil".to_string()].into();
    let spec = FilterSpec {
        favorites_only: true,
        ..FilterSpec::default()
    };
    assert_eq!(ids(&filter_and_sort(&all, &spec, &favorites)), vec!["bobil", "gammel"]);
}

#[test]
fn unpriced_listings_sort_last_in_both_directions() {
    let all = fixtures();
    let asc = FilterSpec {
        sort: SortMode::PriceAsc,
        ..FilterSpec::default()
    };
    let desc = FilterSpec {
        sort: SortMode::PriceDesc,
        ..FilterSpec::default()
    };
    assert_eq!(
        ids(&filter_and_sort(&all, &asc, &HashSet::new())),
        vec!["gammel", "brygge-camping", "naust", "bobil"]
    );
    assert_eq!(
        ids(&filter_and_sort(&all, &desc, &HashSet::new())),
        vec!["naust", "brygge-camping", "gammel", "bobil"]
    );
}

#[test]
fn equal_timestamps_break_ties_by_id_descending() {
    let all = vec![
        listing(json!({"id": "a", "createdAt": "2025-01-01T00:00:00Z"})),
        listing(json!({"id": "c", "createdAt": "2025-01-01T00:00:00Z"})),
        listing(json!({"id": "b", "createdAt": "2025-01-01T00:00:00Z"})),
    ];
    let out = filter_and_sort(&all, &FilterSpec::default(), &HashSet::new());
    assert_eq!(ids(&out), vec!["c", "b", "a"]);
}

#[test]
fn filtering_is_deterministic() {
    let all = fixtures();
    let spec = FilterSpec {
        query: "plass".to_string(),
        sort: SortMode::PriceDesc,
        ..FilterSpec::default()
    };
    let favorites = HashSet::new();
    assert_eq!(
        filter_and_sort(&all, &spec, &favorites),
        filter_and_sort(&all, &spec, &favorites)
    );
}

#[test]
fn from_query_parses_and_defaults() {
    let spec = FilterSpec::from_query(Some("BÅTPLASS"), Some("kai"), Some("price_desc"), Some("yes"));
    assert_eq!(spec.category, CategoryFilter::Only(Category::Batplass));
    assert_eq!(spec.query, "kai");
    assert_eq!(spec.sort, SortMode::PriceDesc);
    assert!(spec.favorites_only);

    let spec = FilterSpec::from_query(Some("hytte"), None, Some("cheapest"), Some("0"));
    assert_eq!(spec, FilterSpec::default());
}

#[test]
fn query_pairs_omit_defaults() {
    assert!(FilterSpec::default().to_query_pairs().is_empty());
    let spec = FilterSpec {
        category: CategoryFilter::Only(Category::Bobilplass),
        query: "  fjord ".to_string(),
        sort: SortMode::Newest,
        favorites_only: true,
    };
    assert_eq!(
        spec.to_query_pairs(),
        vec![
            ("category", "bobilplass".to_string()),
            ("q", "fjord".to_string()),
            ("favorites", "1".to_string()),
        ]
    );
}

#[test]
fn owned_by_includes_ownerless_listings() {
    let all = vec![
        listing(json!({"id": "mine", "ownerDeviceId": "dev-1", "createdAt": "2025-01-02"})),
        listing(json!({"id": "theirs", "ownerDeviceId": "dev-2"})),
        listing(json!({"id": "legacy", "createdAt": "2025-01-03"})),
    ];
    assert_eq!(ids(&owned_by(&all, "dev-1")), vec!["legacy", "mine"]);
    assert_eq!(ids(&owned_by(&all, "  ")), vec!["legacy"]);
}

#[test]
fn search_matches_the_stored_category_text_not_the_inferred_one() {
    let all = vec![
        listing(json!({
            "id": "hytte",
            "title": "Hytte i Sirdal",
            "description": "Stille og rolig i skogen."
        })),
        listing(json!({
            "id": "telt",
            "title": "Flat gressplen",
            "category": "teltplass"
        })),
    ];
    assert_eq!(all[0].category, Category::Campingplass);

    let search = |q: &str| {
        let spec = FilterSpec {
            query: q.to_string(),
            ..FilterSpec::default()
        };
        ids(&filter_and_sort(&all, &spec, &HashSet::new()))
            .into_iter()
            .map(str::to_string)
            .collect::<Vec<_>>()
    };
    assert!(search("camping").is_empty());
    assert_eq!(search("teltplass"), vec!["telt".to_string()]);
}
