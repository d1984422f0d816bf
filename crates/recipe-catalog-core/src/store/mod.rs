//! Storage abstraction for Recipe Catalog.
//!
//! The [`Store`] trait covers read-only lookups and hands out a
//! [`StoreTx`], the write side used by the seed pipeline. A seed run does
//! all of its work through one transaction, so a structural failure can
//! undo every category, ingredient, and recipe the run created.
//!
//! Implementations must be `Send + Sync` to work with async runtimes.

pub mod memory;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{
    CatalogCounts, EntityKind, NamedEntity, NewRecipe, RecipeDetail, RecipeSummary,
};

/// Filters for [`Store::search_recipes`].
///
/// All filters combine with AND. Results come back in ascending id order,
/// truncated to `limit`.
#[derive(Debug, Clone)]
pub struct RecipeQuery {
    /// Substring matched against title or description. Case folding is
    /// ASCII-only, matching SQLite's `lower()`: `"CRÈME"` matches `"crÈme"`
    /// but not `"crème"`.
    pub text: Option<String>,
    /// Exact category name.
    pub category: Option<String>,
    /// Exact ingredient name.
    pub ingredient: Option<String>,
    /// Inclusive upper bound on cook time in minutes.
    pub max_cook_time: Option<i32>,
    pub limit: i64,
}

impl RecipeQuery {
    pub fn new(limit: i64) -> Self {
        Self {
            text: None,
            category: None,
            ingredient: None,
            max_cook_time: None,
            limit,
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_ingredient(mut self, ingredient: impl Into<String>) -> Self {
        self.ingredient = Some(ingredient.into());
        self
    }

    pub fn with_max_cook_time(mut self, minutes: i32) -> Self {
        self.max_cook_time = Some(minutes);
        self
    }
}

/// Abstract storage backend.
///
/// # Operations
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`begin`](Store::begin) | Open a write transaction |
/// | [`counts`](Store::counts) | Count recipes, categories, ingredients |
/// | [`get_recipe`](Store::get_recipe) | Full recipe with category and ingredients |
/// | [`search_recipes`](Store::search_recipes) | Filtered recipe listing |
#[async_trait]
pub trait Store: Send + Sync {
    /// Open a write transaction. Nothing written through it is visible to
    /// other readers until [`StoreTx::commit`].
    async fn begin<'a>(&'a self) -> Result<Box<dyn StoreTx + 'a>>;

    async fn counts(&self) -> Result<CatalogCounts>;

    async fn get_recipe(&self, id: i64) -> Result<Option<RecipeDetail>>;

    async fn search_recipes(&self, query: &RecipeQuery) -> Result<Vec<RecipeSummary>>;
}

/// Write transaction handed out by [`Store::begin`].
///
/// Dropping a transaction without calling [`commit`](StoreTx::commit)
/// discards its writes.
#[async_trait]
pub trait StoreTx: Send {
    async fn count_recipes(&mut self) -> Result<i64>;

    /// Look up a category or ingredient by exact name.
    async fn find_named(&mut self, kind: EntityKind, name: &str) -> Result<Option<i64>>;

    /// Create a category or ingredient and return its id.
    ///
    /// If the name already exists the existing id is returned instead of
    /// inserting a second row.
    async fn create_named(&mut self, kind: EntityKind, name: &str) -> Result<i64>;

    /// Write a batch of recipes with their ingredient links. Returns the
    /// assigned ids in input order.
    async fn insert_recipes(&mut self, batch: &[NewRecipe]) -> Result<Vec<i64>>;

    async fn commit(self: Box<Self>) -> Result<()>;

    async fn rollback(self: Box<Self>) -> Result<()>;
}

/// Typed wrapper over [`StoreTx::find_named`].
pub async fn find_by_name<E, T>(tx: &mut T, name: &str) -> Result<Option<E>>
where
    E: NamedEntity,
    T: StoreTx + ?Sized,
{
    Ok(tx
        .find_named(E::KIND, name)
        .await?
        .map(|id| E::from_parts(id, name.to_string())))
}

/// Typed wrapper over [`StoreTx::create_named`].
pub async fn create<E, T>(tx: &mut T, name: &str) -> Result<E>
where
    E: NamedEntity,
    T: StoreTx + ?Sized,
{
    let id = tx.create_named(E::KIND, name).await?;
    Ok(E::from_parts(id, name.to_string()))
}
