//! Read-only listing views for the CLI.

use std::collections::HashSet;

use friplass_core::badges::badge_label;
use friplass_core::{
    filter_and_sort, get_or_create_device_id, owned_by, Favorites, FilterSpec, KeyValueStore,
    Listing,
};
use friplass_store::ListingRepository;

const TITLE_WIDTH: usize = 50;

fn header() -> String {
    format!("{:<38}{:<14}{:>10}  TITLE", "ID", "CATEGORY", "PRICE")
}

/// One table row. Titles longer than the column are cut with `...`.
pub(crate) fn format_row(listing: &Listing) -> String {
    let price = listing
        .price_per_night()
        .map_or_else(|| "\u{2014}".to_string(), |p| format!("{p:.0}"));
    let title = if listing.title.chars().count() > TITLE_WIDTH {
        format!(
            "{}...",
            listing.title.chars().take(TITLE_WIDTH).collect::<String>()
        )
    } else {
        listing.title.clone()
    };
    format!(
        "{:<38}{:<14}{:>10}  {}",
        listing.id,
        listing.category.as_str(),
        price,
        title
    )
}

/// Multi-line detail view with badge labels.
pub(crate) fn format_detail(listing: &Listing) -> String {
    let mut lines = vec![
        listing.title.clone(),
        format!("{} \u{b7} {}", listing.category.label(), listing.address),
    ];
    if let Some(price) = &listing.price {
        lines.push(format!("{:.0} {} per natt", price.per_night, price.currency));
    }
    if !listing.badges.is_empty() {
        let labels: Vec<&str> = listing.badges.iter().map(|b| badge_label(b)).collect();
        lines.push(labels.join(", "));
    }
    lines.push(String::new());
    lines.push(listing.description.clone());
    lines.extend(listing.images.iter().map(|image| {
        let marker = if listing.main_image_url.as_deref() == Some(image.url.as_str()) {
            "*"
        } else {
            "-"
        };
        format!("{marker} {}", image.url)
    }));

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

fn print_table(listings: &[&Listing]) {
    println!("{}", header());
    for listing in listings {
        println!("{}", format_row(listing));
    }
}

/// Show listings through the explore filter engine.
///
/// # Errors
///
/// Returns an error if the listing store cannot be read.
pub(crate) async fn run_listings(
    repo: &ListingRepository,
    kv: &dyn KeyValueStore,
    spec: &FilterSpec,
) -> anyhow::Result<()> {
    let all = repo.list().await?;
    let favorites: HashSet<String> = Favorites::new(kv).list().into_iter().collect();
    let shown = filter_and_sort(&all, spec, &favorites);

    if shown.is_empty() {
        let hint = if spec.is_default() {
            "; publish one with `draft publish`"
        } else {
            " matching these filters"
        };
        println!("no listings{hint}");
        return Ok(());
    }

    print_table(&shown);
    tracing::debug!(total = all.len(), shown = shown.len(), "listed listings");
    Ok(())
}

/// Print one listing.
///
/// # Errors
///
/// Returns an error if the id is unknown or the store cannot be read.
pub(crate) async fn run_show(repo: &ListingRepository, id: &str) -> anyhow::Result<()> {
    let listing = repo.find(id).await?;
    print!("{}", format_detail(&listing));
    Ok(())
}

/// Show the listings owned by this device.
///
/// # Errors
///
/// Returns an error if the store cannot be read or a device id cannot be
/// persisted.
pub(crate) async fn run_mine(
    repo: &ListingRepository,
    kv: &dyn KeyValueStore,
) -> anyhow::Result<()> {
    let device_id = get_or_create_device_id(kv)?;
    let all = repo.list().await?;
    let mine = owned_by(&all, &device_id);

    if mine.is_empty() {
        println!("no listings for device {device_id}");
        return Ok(());
    }
    print_table(&mine);
    Ok(())
}
