//! # Recipe Catalog CLI (`recipes`)
//!
//! Every command first brings the catalog to readiness: it opens the
//! database, applies migrations, and seeds the catalog from the configured
//! dataset if it is still empty. The command then runs against the store.
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `recipes init` | Prepare the catalog and print a summary |
//! | `recipes stats` | Print recipe, category, and ingredient counts |
//! | `recipes get <id>` | Print one recipe with its ingredients |
//! | `recipes search [text]` | List recipes matching text and filters |
//!
//! Logs go to stderr; set `RUST_LOG` to change the level.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use recipe_catalog::search::SearchFilters;
use recipe_catalog::store::Store;
use recipe_catalog::{config, get, ingest, search, stats};

/// Recipe Catalog CLI.
#[derive(Parser)]
#[command(
    name = "recipes",
    about = "Recipe Catalog — a static recipe catalog seeded from a CSV dataset",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/recipes.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the schema and seed the catalog if it is empty.
    ///
    /// Running it again is safe: a populated catalog is left untouched.
    Init,

    /// Show catalog counts.
    Stats {
        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },

    /// Retrieve a recipe by id.
    Get {
        /// Recipe id.
        id: i64,

        /// Print JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Search recipes.
    ///
    /// Text matches title or description, case-insensitively. Filters
    /// combine with AND. Results are in id order.
    Search {
        /// Text to look for in title or description.
        query: Option<String>,

        /// Only recipes in this category (exact name).
        #[arg(long)]
        category: Option<String>,

        /// Only recipes that use this ingredient (exact name).
        #[arg(long)]
        ingredient: Option<String>,

        /// Only recipes that cook in at most this many minutes.
        #[arg(long)]
        max_cook_time: Option<i32>,

        /// Maximum number of results to return.
        #[arg(long)]
        limit: Option<i64>,

        /// Print JSON instead of text.
        #[arg(long)]
        json: bool,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("recipe_catalog=info,recipe_catalog_core=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let cfg = config::load_config(&cli.config)?;
    let store = ingest::prepare_catalog(&cfg).await?;

    match cli.command {
        Commands::Init => {
            let counts = store.counts().await?;
            println!("Catalog ready.");
            println!("  recipes:     {}", counts.recipes);
            println!("  categories:  {}", counts.categories);
            println!("  ingredients: {}", counts.ingredients);
        }
        Commands::Stats { json } => {
            stats::run_stats(&cfg, &store, json).await?;
        }
        Commands::Get { id, json } => {
            get::run_get(&store, id, json).await?;
        }
        Commands::Search {
            query,
            category,
            ingredient,
            max_cook_time,
            limit,
            json,
        } => {
            let filters = SearchFilters {
                text: query,
                category,
                ingredient,
                max_cook_time,
                limit,
            };
            search::run_search(&cfg, &store, &filters, json).await?;
        }
    }

    store.pool().close().await;
    Ok(())
}
