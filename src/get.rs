//! Recipe retrieval by ID.
//!
//! Used by the `recipes get` command.

use anyhow::{bail, Result};
use recipe_catalog_core::models::RecipeDetail;
use recipe_catalog_core::store::Store;

/// Fetch a recipe with its category and ingredients.
pub async fn get_recipe(store: &dyn Store, id: i64) -> Result<RecipeDetail> {
    match store.get_recipe(id).await? {
        Some(recipe) => Ok(recipe),
        None => bail!("recipe not found: {}", id),
    }
}

/// CLI entry point: fetch the recipe and print it to stdout.
pub async fn run_get(store: &dyn Store, id: i64, json: bool) -> Result<()> {
    let recipe = get_recipe(store, id).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&recipe)?);
        return Ok(());
    }

    println!("--- Recipe ---");
    println!("id:          {}", recipe.id);
    println!("title:       {}", recipe.title);
    println!("category:    {}", recipe.category.name);
    println!("cook_time:   {} min", recipe.cook_time);
    println!("created_at:  {}", recipe.created_at);
    println!();

    println!("--- Description ---");
    if recipe.description.is_empty() {
        println!("(none)");
    } else {
        println!("{}", recipe.description);
    }
    println!();

    println!("--- Ingredients ({}) ---", recipe.ingredients.len());
    for ingredient in &recipe.ingredients {
        println!("- {}", ingredient.name);
    }

    Ok(())
}
