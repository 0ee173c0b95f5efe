use friplass_store::{run_category_migration, JsonFileStore};

/// Run the category migration against the data file and print the report.
///
/// A real run copies the data file to a timestamped backup first.
///
/// # Errors
///
/// Returns an error if the store cannot be read, backed up or written.
pub(crate) async fn run_migrate_category(
    store: &JsonFileStore,
    dry_run: bool,
) -> anyhow::Result<()> {
    let report = run_category_migration(store, Some(store.path()), dry_run).await?;

    if dry_run {
        println!("dry run: nothing written");
    }
    if let Some(backup) = &report.backup {
        println!("backup: {}", backup.display());
    }
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
