use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use friplass_core::{migrate_legacy_keys, FilterSpec};
use friplass_store::{JsonFileKeyValueStore, JsonFileStore, ListingRepository, ListingStore};
use tracing_subscriber::EnvFilter;

mod browse;
mod migrate;
mod session;

#[derive(Debug, Parser)]
#[command(name = "friplass-cli")]
#[command(about = "friplass listing maintenance and local session tools")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Rewrite stored categories to their canonical values
    MigrateCategory {
        /// Report what would change without writing anything
        #[arg(long)]
        dry_run: bool,
    },
    /// Browse listings with the explore filters
    Listings {
        /// batplass, bobilplass, campingplass or alle
        #[arg(long, default_value = "alle")]
        category: String,
        /// Free-text search
        #[arg(long)]
        q: Option<String>,
        /// newest, price_asc or price_desc
        #[arg(long, default_value = "newest")]
        sort: String,
        /// Only show listings saved as favorites on this device
        #[arg(long)]
        favorites: bool,
    },
    /// Show one listing in full
    Show { id: String },
    /// Listings created from this device
    Mine,
    /// Print this device's id, creating one if needed
    DeviceId,
    /// Manage favorite listings
    Favorites {
        #[command(subcommand)]
        command: FavoritesCommands,
    },
    /// Work with the in-progress listing draft
    Draft {
        #[command(subcommand)]
        command: DraftCommands,
    },
}

#[derive(Debug, Subcommand)]
enum FavoritesCommands {
    List,
    Add { id: String },
    Remove { id: String },
    Toggle { id: String },
}

/// Wizard step whose rules a `draft set` must pass before it is saved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum WizardStep {
    /// Title, category and place
    Basics,
    /// Description, suitability and availability
    Details,
    /// Nightly price, cleaning fee and minimum nights
    Price,
    /// Image list and main image
    Images,
}

#[derive(Debug, Subcommand)]
enum DraftCommands {
    /// Print the stored draft
    Show {
        /// Print the flat MVP wizard shape instead
        #[arg(long)]
        mvp: bool,
    },
    /// Merge JSON objects into the stored draft, in order
    Set {
        #[arg(required = true)]
        patches: Vec<String>,
        /// Check the patches against one wizard step first
        #[arg(long, value_enum)]
        step: Option<WizardStep>,
        /// Patches use the flat MVP wizard shape
        #[arg(long)]
        mvp: bool,
    },
    /// Drop the stored draft
    Clear,
    /// Publish the stored draft, or a draft read from a JSON file
    Publish {
        #[arg(long)]
        file: Option<PathBuf>,
    },
}

impl Commands {
    fn filter_spec(category: &str, q: Option<&str>, sort: &str, favorites: bool) -> FilterSpec {
        FilterSpec::from_query(
            Some(category),
            q,
            Some(sort),
            favorites.then_some("1"),
        )
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = friplass_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("friplass-cli ready; run with --help to list commands");
        return Ok(());
    };

    let kv = JsonFileKeyValueStore::new(&config.session_path);
    let legacy = migrate_legacy_keys(&kv)?;
    if !legacy.is_noop() {
        tracing::info!(
            favorites_added = legacy.favorites_added,
            device_id_adopted = legacy.device_id_adopted,
            draft_moved = legacy.draft_moved,
            "migrated legacy session keys"
        );
    }

    let store = Arc::new(JsonFileStore::new(&config.data_path));
    let repo = ListingRepository::new(Arc::clone(&store) as Arc<dyn ListingStore>);

    match command {
        Commands::MigrateCategory { dry_run } => {
            migrate::run_migrate_category(store.as_ref(), dry_run).await?;
        }
        Commands::Listings {
            category,
            q,
            sort,
            favorites,
        } => {
            let spec = Commands::filter_spec(&category, q.as_deref(), &sort, favorites);
            browse::run_listings(&repo, &kv, &spec).await?;
        }
        Commands::Show { id } => browse::run_show(&repo, &id).await?,
        Commands::Mine => browse::run_mine(&repo, &kv).await?,
        Commands::DeviceId => {
            println!("{}", friplass_core::get_or_create_device_id(&kv)?);
        }
        Commands::Favorites { command } => session::run_favorites(&kv, &command)?,
        Commands::Draft { command } => session::run_draft(&repo, &kv, command).await?,
    }

    Ok(())
}
