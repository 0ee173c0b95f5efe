//! Favorites and draft commands backed by the local session file.

use std::path::Path;
use std::time::Instant;

use anyhow::Context;
use friplass_core::normalize::{collect_images, non_blank};
use friplass_core::steps::{
    validate_main_image_index, validate_step1, validate_step2, validate_step3,
};
use friplass_core::{
    draft_to_mvp, get_or_create_device_id, mvp_to_draft, Autosave, Draft, DraftStore, Favorites,
    KeyValueStore, Listing, MvpDraft, Problems,
};
use friplass_store::{ListingRepository, StoreError};
use serde_json::Value;

use crate::{DraftCommands, FavoritesCommands, WizardStep};

pub(crate) fn run_favorites(
    kv: &dyn KeyValueStore,
    command: &FavoritesCommands,
) -> anyhow::Result<()> {
    let favorites = Favorites::new(kv);
    match command {
        FavoritesCommands::List => {
            let ids = favorites.list();
            if ids.is_empty() {
                println!("no favorites saved");
            }
            for id in ids {
                println!("{id}");
            }
        }
        FavoritesCommands::Add { id } => {
            favorites.add(id)?;
            println!("added {id}");
        }
        FavoritesCommands::Remove { id } => {
            favorites.remove(id)?;
            println!("removed {id}");
        }
        FavoritesCommands::Toggle { id } => {
            let now = if favorites.toggle(id)? { "added" } else { "removed" };
            println!("{now} {id}");
        }
    }
    Ok(())
}

/// Parse a JSON object given on the command line into a draft patch.
pub(crate) fn parse_patch(raw: &str) -> anyhow::Result<Draft> {
    let value: Value = serde_json::from_str(raw).context("draft patch is not valid JSON")?;
    if !value.is_object() {
        anyhow::bail!("draft patch must be a JSON object");
    }
    Ok(Draft::from_value(value))
}

/// Parse a flat MVP wizard draft and nest it. Fields it leaves out take
/// their MVP defaults.
pub(crate) fn parse_mvp_patch(raw: &str) -> anyhow::Result<Draft> {
    let mvp: MvpDraft = serde_json::from_str(raw).context("MVP draft is not a valid object")?;
    Ok(mvp_to_draft(mvp))
}

/// Position of the main image, or one past the end when it names no image.
fn main_image_index(draft: &Draft) -> usize {
    let images = collect_images(draft);
    match non_blank(draft.main_image_url.as_ref()) {
        Some(main) => images
            .iter()
            .position(|image| image.url == main)
            .unwrap_or(images.len()),
        None => 0,
    }
}

/// Run one wizard step's rules over the values the patches submit.
pub(crate) fn check_step(step: WizardStep, submitted: &Draft) -> Result<(), Problems> {
    match step {
        WizardStep::Basics => validate_step1(submitted).map(|_| ()),
        WizardStep::Details => validate_step2(submitted).map(|_| ()),
        WizardStep::Price => validate_step3(submitted).map(|_| ()),
        WizardStep::Images => validate_main_image_index(
            collect_images(submitted).len(),
            main_image_index(submitted),
        ),
    }
}

/// Merge patches into the stored draft with a single write.
///
/// With `step`, the patches together must pass that step's rules; nothing is
/// saved otherwise.
///
/// # Errors
///
/// Returns a parse error, the step's problems, or a session write failure.
pub(crate) fn set_draft(
    kv: &dyn KeyValueStore,
    patches: &[String],
    step: Option<WizardStep>,
    mvp: bool,
) -> anyhow::Result<Draft> {
    let parsed = patches
        .iter()
        .map(|raw| {
            if mvp {
                parse_mvp_patch(raw)
            } else {
                parse_patch(raw)
            }
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    if let Some(step) = step {
        let submitted = parsed
            .iter()
            .cloned()
            .fold(Draft::default(), Draft::merged);
        if let Err(problems) = check_step(step, &submitted) {
            anyhow::bail!("{step:?} step is not complete: {problems}");
        }
    }

    let drafts = DraftStore::new(kv);
    let mut autosave = Autosave::default();
    let now = Instant::now();
    for patch in parsed {
        autosave.push(patch, now);
    }
    autosave.flush(&drafts)?;
    tracing::debug!(patches = patches.len(), ?step, "saved draft");
    Ok(drafts.load())
}

fn has_owner(draft: &Draft) -> bool {
    matches!(&draft.owner_device_id, Some(Value::String(s)) if !s.trim().is_empty())
}

/// Publish a draft as a new listing owned by this device.
///
/// With `file` the draft is read from that JSON file and the stored draft is
/// left alone; otherwise the stored draft is published and cleared.
///
/// # Errors
///
/// Returns the validation problems, or any store or session failure.
pub(crate) async fn publish(
    repo: &ListingRepository,
    kv: &dyn KeyValueStore,
    file: Option<&Path>,
) -> anyhow::Result<Listing> {
    let drafts = DraftStore::new(kv);
    let mut draft = match file {
        Some(path) => {
            let raw = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("failed to read draft file {}", path.display()))?;
            Draft::from_json_str(&raw)
        }
        None if drafts.has_draft() => drafts.load(),
        None => anyhow::bail!("no draft to publish; start one with `draft set`"),
    };

    if draft.is_empty() {
        anyhow::bail!("draft file holds no listing fields");
    }
    if !has_owner(&draft) {
        draft.owner_device_id = Some(Value::String(get_or_create_device_id(kv)?));
    }

    let listing = match repo.create(draft).await {
        Ok(listing) => listing,
        Err(StoreError::Validation(problems)) => {
            anyhow::bail!("draft is not ready to publish: {problems}")
        }
        Err(e) => return Err(e.into()),
    };

    if file.is_none() {
        Autosave::default().clear(&drafts)?;
    }
    tracing::info!(id = %listing.id, category = %listing.category, "published draft");
    Ok(listing)
}

pub(crate) async fn run_draft(
    repo: &ListingRepository,
    kv: &dyn KeyValueStore,
    command: DraftCommands,
) -> anyhow::Result<()> {
    let drafts = DraftStore::new(kv);
    match command {
        DraftCommands::Show { mvp: false } => {
            println!("{}", serde_json::to_string_pretty(&drafts.load())?);
        }
        DraftCommands::Show { mvp: true } => {
            let flat = draft_to_mvp(&drafts.load());
            println!("{}", serde_json::to_string_pretty(&flat)?);
        }
        DraftCommands::Set { patches, step, mvp } => {
            let saved = set_draft(kv, &patches, step, mvp)?;
            println!("{}", serde_json::to_string_pretty(&saved)?);
        }
        DraftCommands::Clear => {
            Autosave::default().clear(&drafts)?;
            println!("draft cleared");
        }
        DraftCommands::Publish { file } => {
            let listing = publish(repo, kv, file.as_deref()).await?;
            println!("{}", serde_json::to_string_pretty(&listing)?);
        }
    }
    Ok(())
}
