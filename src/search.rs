use anyhow::{bail, Result};
use recipe_catalog_core::models::RecipeSummary;
use recipe_catalog_core::store::{RecipeQuery, Store};

use crate::config::Config;

/// Search filters as given on the command line.
#[derive(Debug, Clone, Default)]
pub struct SearchFilters {
    pub text: Option<String>,
    pub category: Option<String>,
    pub ingredient: Option<String>,
    pub max_cook_time: Option<i32>,
    pub limit: Option<i64>,
}

/// Build a [`RecipeQuery`] from CLI filters, applying the configured
/// default limit. Blank text is treated as no text filter.
pub fn build_query(config: &Config, filters: &SearchFilters) -> Result<RecipeQuery> {
    let limit = filters.limit.unwrap_or(config.query.default_limit);
    if limit < 1 {
        bail!("--limit must be >= 1");
    }
    if let Some(max) = filters.max_cook_time {
        if max < 0 {
            bail!("--max-cook-time must be >= 0");
        }
    }

    let mut query = RecipeQuery::new(limit);
    if let Some(text) = filters.text.as_deref().map(str::trim) {
        if !text.is_empty() {
            query = query.with_text(text);
        }
    }
    if let Some(ref category) = filters.category {
        query = query.with_category(category.clone());
    }
    if let Some(ref ingredient) = filters.ingredient {
        query = query.with_ingredient(ingredient.clone());
    }
    if let Some(max) = filters.max_cook_time {
        query = query.with_max_cook_time(max);
    }
    Ok(query)
}

pub async fn search_recipes(
    config: &Config,
    store: &dyn Store,
    filters: &SearchFilters,
) -> Result<Vec<RecipeSummary>> {
    let query = build_query(config, filters)?;
    store.search_recipes(&query).await
}

pub async fn run_search(
    config: &Config,
    store: &dyn Store,
    filters: &SearchFilters,
    json: bool,
) -> Result<()> {
    let results = search_recipes(config, store, filters).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }

    if results.is_empty() {
        println!("No results.");
        return Ok(());
    }

    for (i, recipe) in results.iter().enumerate() {
        println!("{}. {}", i + 1, recipe.title);
        println!("    category: {}", recipe.category);
        println!("    cook_time: {} min", recipe.cook_time);
        println!("    id: {}", recipe.id);
        println!();
    }

    Ok(())
}
