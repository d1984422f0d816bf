//! Catalog startup: connect, migrate, seed.
//!
//! [`prepare_catalog`] is the readiness hook every command runs before it
//! does anything else. The seed itself is idempotent: once the catalog
//! holds recipes, later starts skip it without opening the dataset.

use anyhow::{Context, Result};
use std::fs::File;
use std::io::BufReader;

use recipe_catalog_core::seed::{run_seed, SeedOutcome};

use crate::config::Config;
use crate::db;
use crate::migrate;
use crate::sqlite_store::SqliteStore;

/// Open the database, apply migrations, and seed the catalog if it is
/// empty. Returns a store ready for queries.
///
/// # Errors
///
/// Fails if the database cannot be opened, or if seeding hits an
/// unreadable dataset or a storage error. In the latter cases nothing
/// from the failed run is left in the database.
pub async fn prepare_catalog(config: &Config) -> Result<SqliteStore> {
    let pool = db::connect(config).await?;
    migrate::run_migrations(&pool).await?;

    let store = SqliteStore::new(pool);
    match seed_catalog(config, &store).await? {
        SeedOutcome::Skipped { existing } => {
            tracing::debug!(existing, "catalog already seeded");
        }
        SeedOutcome::Completed(report) => {
            tracing::debug!(
                accepted = report.accepted,
                rejected = report.rejected,
                batches = report.batches,
                "catalog seeded"
            );
        }
    }
    Ok(store)
}

/// Seed `store` from the configured dataset.
pub async fn seed_catalog(config: &Config, store: &SqliteStore) -> Result<SeedOutcome> {
    let dataset = &config.seed.dataset;
    let options = config.seed.options();

    let outcome = run_seed(store, || File::open(dataset).map(BufReader::new), &options)
        .await
        .with_context(|| format!("Failed to seed catalog from {}", dataset.display()))?;

    Ok(outcome)
}
