//! Core data models for the recipe catalog.
//!
//! Categories and ingredients are name-keyed entities: each distinct name
//! exists at most once in storage. Recipes reference exactly one category
//! and any number of ingredients.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// The two kinds of name-keyed entity the seed pipeline resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Category,
    Ingredient,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Category => "category",
            EntityKind::Ingredient => "ingredient",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An entity identified by a unique name.
///
/// Stores persist these as `(id, name)` pairs; the associated [`KIND`](NamedEntity::KIND)
/// tells the store which table to use.
pub trait NamedEntity: Clone + Send + Sync {
    const KIND: EntityKind;

    fn from_parts(id: i64, name: String) -> Self;
    fn id(&self) -> i64;
    fn name(&self) -> &str;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
}

impl NamedEntity for Category {
    const KIND: EntityKind = EntityKind::Category;

    fn from_parts(id: i64, name: String) -> Self {
        Self { id, name }
    }

    fn id(&self) -> i64 {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ingredient {
    pub id: i64,
    pub name: String,
}

impl NamedEntity for Ingredient {
    const KIND: EntityKind = EntityKind::Ingredient;

    fn from_parts(id: i64, name: String) -> Self {
        Self { id, name }
    }

    fn id(&self) -> i64 {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// A recipe that has been parsed and resolved but not yet written.
///
/// `ingredient_ids` holds no duplicates; the category and every ingredient
/// already exist in storage when this value is built.
#[derive(Debug, Clone)]
pub struct NewRecipe {
    pub title: String,
    pub description: String,
    pub cook_time: i32,
    pub created_at: DateTime<Utc>,
    pub category_id: i64,
    pub ingredient_ids: Vec<i64>,
}

/// Full recipe as returned by lookups.
#[derive(Debug, Clone, Serialize)]
pub struct RecipeDetail {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub cook_time: i32,
    pub created_at: String, // ISO8601
    pub category: Category,
    pub ingredients: Vec<Ingredient>,
}

/// One row of a search result.
#[derive(Debug, Clone, Serialize)]
pub struct RecipeSummary {
    pub id: i64,
    pub title: String,
    pub cook_time: i32,
    pub category: String,
}

/// Row counts per table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CatalogCounts {
    pub recipes: i64,
    pub categories: i64,
    pub ingredients: i64,
}

pub fn format_ts_iso(ts: i64) -> String {
    DateTime::from_timestamp(ts, 0)
        .map(|dt| dt.format("%Y-%m-%dT%H:%M:%SZ").to_string())
        .unwrap_or_else(|| ts.to_string())
}
