//! Catalog statistics.
//!
//! Prints what the seed left in the database: recipe, category, and
//! ingredient counts plus the database file size. Used by `recipes stats`.

use anyhow::Result;
use recipe_catalog_core::store::Store;

use crate::config::Config;

/// Run the stats command: query the store and print a summary.
pub async fn run_stats(config: &Config, store: &dyn Store, json: bool) -> Result<()> {
    let counts = store.counts().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&counts)?);
        return Ok(());
    }

    let db_size = std::fs::metadata(&config.db.path)
        .map(|m| m.len())
        .unwrap_or(0);

    println!("Recipe Catalog — Database Stats");
    println!("===============================");
    println!();
    println!("  Database:     {}", config.db.path.display());
    println!("  Size:         {}", format_bytes(db_size));
    println!();
    println!("  Recipes:      {}", counts.recipes);
    println!("  Categories:   {}", counts.categories);
    println!("  Ingredients:  {}", counts.ingredients);
    println!();

    Ok(())
}

/// Format a byte count as a human-readable string.
fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else if bytes < 1024 * 1024 * 1024 {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    } else {
        format!("{:.2} GB", bytes as f64 / (1024.0 * 1024.0 * 1024.0))
    }
}
