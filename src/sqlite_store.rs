//! SQLite-backed [`Store`] implementation.
//!
//! Reads go straight to the pool. Writes go through [`SqliteTx`], which
//! wraps one `sqlx` transaction; dropping it without a commit rolls back.
//!
//! Named entities are created with `INSERT … ON CONFLICT(name) DO NOTHING`
//! followed by a lookup, so a name that another writer inserted first
//! resolves to the existing row instead of failing or duplicating.

use anyhow::Result;
use async_trait::async_trait;
use sqlx::{Row, Sqlite, SqlitePool, Transaction};

use recipe_catalog_core::models::{
    format_ts_iso, CatalogCounts, Category, EntityKind, Ingredient, NewRecipe, RecipeDetail,
    RecipeSummary,
};
use recipe_catalog_core::store::{RecipeQuery, Store, StoreTx};

/// SQLite implementation of the [`Store`] trait.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn table(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::Category => "categories",
        EntityKind::Ingredient => "ingredients",
    }
}

/// One open write transaction.
pub struct SqliteTx {
    tx: Transaction<'static, Sqlite>,
}

#[async_trait]
impl StoreTx for SqliteTx {
    async fn count_recipes(&mut self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM recipes")
            .fetch_one(&mut *self.tx)
            .await?;
        Ok(count)
    }

    async fn find_named(&mut self, kind: EntityKind, name: &str) -> Result<Option<i64>> {
        let sql = format!("SELECT id FROM {} WHERE name = ?", table(kind));
        let id: Option<i64> = sqlx::query_scalar(&sql)
            .bind(name)
            .fetch_optional(&mut *self.tx)
            .await?;
        Ok(id)
    }

    async fn create_named(&mut self, kind: EntityKind, name: &str) -> Result<i64> {
        let insert = format!(
            "INSERT INTO {} (name) VALUES (?) ON CONFLICT(name) DO NOTHING",
            table(kind)
        );
        sqlx::query(&insert)
            .bind(name)
            .execute(&mut *self.tx)
            .await?;

        let select = format!("SELECT id FROM {} WHERE name = ?", table(kind));
        let id: i64 = sqlx::query_scalar(&select)
            .bind(name)
            .fetch_one(&mut *self.tx)
            .await?;
        Ok(id)
    }

    async fn insert_recipes(&mut self, batch: &[NewRecipe]) -> Result<Vec<i64>> {
        let mut ids = Vec::with_capacity(batch.len());

        for recipe in batch {
            let id = sqlx::query(
                r#"
                INSERT INTO recipes (title, description, cook_time, created_at, category_id)
                VALUES (?, ?, ?, ?, ?)
                "#,
            )
            .bind(&recipe.title)
            .bind(&recipe.description)
            .bind(recipe.cook_time)
            .bind(recipe.created_at.timestamp())
            .bind(recipe.category_id)
            .execute(&mut *self.tx)
            .await?
            .last_insert_rowid();

            for ingredient_id in &recipe.ingredient_ids {
                sqlx::query(
                    "INSERT OR IGNORE INTO recipe_ingredients (recipe_id, ingredient_id) VALUES (?, ?)",
                )
                .bind(id)
                .bind(*ingredient_id)
                .execute(&mut *self.tx)
                .await?;
            }

            ids.push(id);
        }

        Ok(ids)
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        self.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<()> {
        self.tx.rollback().await?;
        Ok(())
    }
}

#[async_trait]
impl Store for SqliteStore {
    async fn begin<'a>(&'a self) -> Result<Box<dyn StoreTx + 'a>> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(SqliteTx { tx }))
    }

    async fn counts(&self) -> Result<CatalogCounts> {
        let recipes: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM recipes")
            .fetch_one(&self.pool)
            .await?;
        let categories: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM categories")
            .fetch_one(&self.pool)
            .await?;
        let ingredients: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM ingredients")
            .fetch_one(&self.pool)
            .await?;

        Ok(CatalogCounts {
            recipes,
            categories,
            ingredients,
        })
    }

    async fn get_recipe(&self, id: i64) -> Result<Option<RecipeDetail>> {
        let row = sqlx::query(
            r#"
            SELECT r.id, r.title, r.description, r.cook_time, r.created_at,
                   c.id AS category_id, c.name AS category_name
            FROM recipes r
            JOIN categories c ON c.id = r.category_id
            WHERE r.id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let row = match row {
            Some(row) => row,
            None => return Ok(None),
        };

        let ingredient_rows = sqlx::query(
            r#"
            SELECT i.id, i.name
            FROM recipe_ingredients ri
            JOIN ingredients i ON i.id = ri.ingredient_id
            WHERE ri.recipe_id = ?
            ORDER BY i.name ASC
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        let ingredients = ingredient_rows
            .iter()
            .map(|r| Ingredient {
                id: r.get("id"),
                name: r.get("name"),
            })
            .collect();

        let created_at: i64 = row.get("created_at");

        Ok(Some(RecipeDetail {
            id: row.get("id"),
            title: row.get("title"),
            description: row.get("description"),
            cook_time: row.get("cook_time"),
            created_at: format_ts_iso(created_at),
            category: Category {
                id: row.get("category_id"),
                name: row.get("category_name"),
            },
            ingredients,
        }))
    }

    async fn search_recipes(&self, query: &RecipeQuery) -> Result<Vec<RecipeSummary>> {
        let mut sql = String::from(
            r#"
            SELECT r.id, r.title, r.cook_time, c.name AS category
            FROM recipes r
            JOIN categories c ON c.id = r.category_id
            WHERE 1 = 1
            "#,
        );

        let needle = query.text.as_ref().map(|t| t.to_ascii_lowercase());
        if needle.is_some() {
            sql.push_str(
                " AND (instr(lower(r.title), ?) > 0 OR instr(lower(r.description), ?) > 0)",
            );
        }
        if query.category.is_some() {
            sql.push_str(" AND c.name = ?");
        }
        if query.ingredient.is_some() {
            sql.push_str(
                r#"
                AND EXISTS (
                    SELECT 1 FROM recipe_ingredients ri
                    JOIN ingredients i ON i.id = ri.ingredient_id
                    WHERE ri.recipe_id = r.id AND i.name = ?
                )
                "#,
            );
        }
        if query.max_cook_time.is_some() {
            sql.push_str(" AND r.cook_time <= ?");
        }
        sql.push_str(" ORDER BY r.id ASC LIMIT ?");

        let mut q = sqlx::query::<Sqlite>(&sql);
        if let Some(ref n) = needle {
            q = q.bind(n.clone()).bind(n.clone());
        }
        if let Some(ref c) = query.category {
            q = q.bind(c.clone());
        }
        if let Some(ref i) = query.ingredient {
            q = q.bind(i.clone());
        }
        if let Some(max) = query.max_cook_time {
            q = q.bind(max);
        }
        q = q.bind(query.limit);

        let rows = q.fetch_all(&self.pool).await?;

        Ok(rows
            .iter()
            .map(|row| RecipeSummary {
                id: row.get("id"),
                title: row.get("title"),
                cook_time: row.get("cook_time"),
                category: row.get("category"),
            })
            .collect())
    }
}
