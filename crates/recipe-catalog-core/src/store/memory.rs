//! In-memory [`Store`] implementation for testing.
//!
//! State lives behind a `std::sync::RwLock`. A transaction works on a
//! private copy of the state and swaps it in on commit, so rollback is
//! just dropping the copy. Ids are 1-based positions, like SQLite rowids.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{RwLock, RwLockReadGuard};

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use crate::models::{
    format_ts_iso, CatalogCounts, Category, EntityKind, Ingredient, NewRecipe, RecipeDetail,
    RecipeSummary,
};

use super::{RecipeQuery, Store, StoreTx};

#[derive(Debug, Clone)]
struct StoredRecipe {
    id: i64,
    recipe: NewRecipe,
}

#[derive(Debug, Clone, Default)]
struct MemoryState {
    categories: Vec<String>,
    ingredients: Vec<String>,
    recipes: Vec<StoredRecipe>,
}

impl MemoryState {
    fn names(&self, kind: EntityKind) -> &Vec<String> {
        match kind {
            EntityKind::Category => &self.categories,
            EntityKind::Ingredient => &self.ingredients,
        }
    }

    fn names_mut(&mut self, kind: EntityKind) -> &mut Vec<String> {
        match kind {
            EntityKind::Category => &mut self.categories,
            EntityKind::Ingredient => &mut self.ingredients,
        }
    }

    fn find(&self, kind: EntityKind, name: &str) -> Option<i64> {
        self.names(kind)
            .iter()
            .position(|n| n == name)
            .map(|i| i as i64 + 1)
    }

    fn name_of(&self, kind: EntityKind, id: i64) -> Option<&str> {
        usize::try_from(id - 1)
            .ok()
            .and_then(|i| self.names(kind).get(i))
            .map(String::as_str)
    }
}

/// In-memory store for tests.
///
/// Counts name lookups so tests can check that the seed pipeline's cache
/// keeps repeated names away from storage.
pub struct InMemoryStore {
    state: RwLock<MemoryState>,
    find_calls: AtomicU64,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(MemoryState::default()),
            find_calls: AtomicU64::new(0),
        }
    }

    /// Number of [`StoreTx::find_named`] calls served so far.
    pub fn find_calls(&self) -> u64 {
        self.find_calls.load(Ordering::SeqCst)
    }

    /// Names of every stored entity of `kind`, in id order.
    pub fn names(&self, kind: EntityKind) -> Result<Vec<String>> {
        Ok(self.read()?.names(kind).clone())
    }

    /// Ingredient ids linked to a recipe, in link order.
    pub fn ingredient_ids(&self, recipe_id: i64) -> Result<Vec<i64>> {
        Ok(self
            .read()?
            .recipes
            .iter()
            .find(|r| r.id == recipe_id)
            .map(|r| r.recipe.ingredient_ids.clone())
            .unwrap_or_default())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, MemoryState>> {
        self.state
            .read()
            .map_err(|_| anyhow!("in-memory store lock poisoned"))
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

struct MemoryTx<'a> {
    store: &'a InMemoryStore,
    staged: MemoryState,
}

#[async_trait]
impl StoreTx for MemoryTx<'_> {
    async fn count_recipes(&mut self) -> Result<i64> {
        Ok(self.staged.recipes.len() as i64)
    }

    async fn find_named(&mut self, kind: EntityKind, name: &str) -> Result<Option<i64>> {
        self.store.find_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.staged.find(kind, name))
    }

    async fn create_named(&mut self, kind: EntityKind, name: &str) -> Result<i64> {
        if let Some(id) = self.staged.find(kind, name) {
            return Ok(id);
        }
        let names = self.staged.names_mut(kind);
        names.push(name.to_string());
        Ok(names.len() as i64)
    }

    async fn insert_recipes(&mut self, batch: &[NewRecipe]) -> Result<Vec<i64>> {
        let mut ids = Vec::with_capacity(batch.len());
        for recipe in batch {
            if self
                .staged
                .name_of(EntityKind::Category, recipe.category_id)
                .is_none()
            {
                return Err(anyhow!("unknown category id: {}", recipe.category_id));
            }
            let id = self.staged.recipes.len() as i64 + 1;
            self.staged.recipes.push(StoredRecipe {
                id,
                recipe: recipe.clone(),
            });
            ids.push(id);
        }
        Ok(ids)
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        let MemoryTx { store, staged } = *self;
        let mut state = store
            .state
            .write()
            .map_err(|_| anyhow!("in-memory store lock poisoned"))?;
        *state = staged;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<()> {
        Ok(())
    }
}

#[async_trait]
impl Store for InMemoryStore {
    async fn begin<'a>(&'a self) -> Result<Box<dyn StoreTx + 'a>> {
        let staged = self.read()?.clone();
        Ok(Box::new(MemoryTx {
            store: self,
            staged,
        }))
    }

    async fn counts(&self) -> Result<CatalogCounts> {
        let state = self.read()?;
        Ok(CatalogCounts {
            recipes: state.recipes.len() as i64,
            categories: state.categories.len() as i64,
            ingredients: state.ingredients.len() as i64,
        })
    }

    async fn get_recipe(&self, id: i64) -> Result<Option<RecipeDetail>> {
        let state = self.read()?;
        let stored = match state.recipes.iter().find(|r| r.id == id) {
            Some(s) => s,
            None => return Ok(None),
        };
        let recipe = &stored.recipe;

        let category = Category {
            id: recipe.category_id,
            name: state
                .name_of(EntityKind::Category, recipe.category_id)
                .unwrap_or_default()
                .to_string(),
        };
        let mut ingredients: Vec<Ingredient> = recipe
            .ingredient_ids
            .iter()
            .map(|&ing_id| Ingredient {
                id: ing_id,
                name: state
                    .name_of(EntityKind::Ingredient, ing_id)
                    .unwrap_or_default()
                    .to_string(),
            })
            .collect();
        ingredients.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(Some(RecipeDetail {
            id: stored.id,
            title: recipe.title.clone(),
            description: recipe.description.clone(),
            cook_time: recipe.cook_time,
            created_at: format_ts_iso(recipe.created_at.timestamp()),
            category,
            ingredients,
        }))
    }

    async fn search_recipes(&self, query: &RecipeQuery) -> Result<Vec<RecipeSummary>> {
        let state = self.read()?;
        let text = query.text.as_ref().map(|t| t.to_ascii_lowercase());
        let ingredient_id = match &query.ingredient {
            Some(name) => match state.find(EntityKind::Ingredient, name) {
                Some(id) => Some(id),
                None => return Ok(Vec::new()),
            },
            None => None,
        };

        let limit = usize::try_from(query.limit).unwrap_or(0);
        Ok(state
            .recipes
            .iter()
            .filter_map(|stored| {
                let recipe = &stored.recipe;
                let category = state
                    .name_of(EntityKind::Category, recipe.category_id)
                    .unwrap_or_default();

                if let Some(ref t) = text {
                    if !recipe.title.to_ascii_lowercase().contains(t)
                        && !recipe.description.to_ascii_lowercase().contains(t)
                    {
                        return None;
                    }
                }
                if let Some(ref c) = query.category {
                    if category != c {
                        return None;
                    }
                }
                if let Some(id) = ingredient_id {
                    if !recipe.ingredient_ids.contains(&id) {
                        return None;
                    }
                }
                if let Some(max) = query.max_cook_time {
                    if recipe.cook_time > max {
                        return None;
                    }
                }

                Some(RecipeSummary {
                    id: stored.id,
                    title: recipe.title.clone(),
                    cook_time: recipe.cook_time,
                    category: category.to_string(),
                })
            })
            .take(limit)
            .collect())
    }
}
