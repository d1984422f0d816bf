//! Seed pipeline: recipe CSV → normalized catalog.
//!
//! A run moves through these states:
//!
//! ```text
//! NotStarted → Guarding ─┬─▶ Skipped                (catalog already populated)
//!                        └─▶ Ingesting ─┬─▶ Completed
//!                                       └─▶ Failed  (dataset unreadable / storage error)
//! ```
//!
//! Everything happens inside one [`StoreTx`]. A rejected row only drops
//! that row; a failure in `Ingesting` rolls back every category,
//! ingredient, and recipe the run created.
//!
//! Categories and ingredients are written as soon as they are first seen
//! (see [`crate::resolve`]). Recipes are buffered and written in batches of
//! [`SeedOptions::batch_size`] to bound memory.

use std::io::Read;

use chrono::Utc;
use csv::{ReaderBuilder, StringRecord};
use thiserror::Error;

use crate::models::{Category, Ingredient, NewRecipe};
use crate::resolve::{resolve, NameCache};
use crate::row::{parse_row, ParsedRow};
use crate::store::{Store, StoreTx};

pub const DEFAULT_MAX_RECIPES: usize = 500;
pub const DEFAULT_BATCH_SIZE: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedOptions {
    /// Ceiling on accepted recipes. Reading stops once it is reached.
    pub max_recipes: usize,
    /// Recipes buffered before a bulk write.
    pub batch_size: usize,
}

impl Default for SeedOptions {
    fn default() -> Self {
        Self {
            max_recipes: DEFAULT_MAX_RECIPES,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

/// Seed run state. A finished run reports `Skipped` or `Completed`
/// through [`SeedOutcome::state`] and `Failed` through
/// [`SeedError::state`]; the other states are only passed through and
/// appear in debug logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedState {
    NotStarted,
    Guarding,
    Skipped,
    Ingesting,
    Completed,
    Failed,
}

/// Counters for a run that reached `Ingesting`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub accepted: usize,
    pub rejected: usize,
    pub batches: usize,
    pub categories_created: usize,
    pub ingredients_created: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeedOutcome {
    /// Storage already held recipes; nothing was read or written.
    Skipped { existing: i64 },
    Completed(SeedReport),
}

impl SeedOutcome {
    pub fn state(&self) -> SeedState {
        match self {
            SeedOutcome::Skipped { .. } => SeedState::Skipped,
            SeedOutcome::Completed(_) => SeedState::Completed,
        }
    }
}

/// Fatal seed failures. The run's transaction has been rolled back by the
/// time one of these is returned.
#[derive(Debug, Error)]
pub enum SeedError {
    #[error("dataset unreadable: {0}")]
    SourceUnreadable(#[from] csv::Error),

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

impl SeedError {
    /// Final state of the run that returned this error.
    pub fn state(&self) -> SeedState {
        SeedState::Failed
    }
}

struct Run {
    state: SeedState,
}

impl Run {
    fn new() -> Self {
        Self {
            state: SeedState::NotStarted,
        }
    }

    fn enter(&mut self, next: SeedState) {
        tracing::debug!(from = ?self.state, to = ?next, "seed state");
        self.state = next;
    }
}

/// Seed `store` from the dataset returned by `open`, unless it already
/// holds recipes.
///
/// `open` is only called once the guard has passed, so a populated store
/// never touches the dataset.
pub async fn run_seed<S, F, R>(
    store: &S,
    open: F,
    options: &SeedOptions,
) -> Result<SeedOutcome, SeedError>
where
    S: Store + ?Sized,
    F: FnOnce() -> std::io::Result<R>,
    R: Read + Send,
{
    let mut run = Run::new();
    let mut tx = store.begin().await?;

    run.enter(SeedState::Guarding);
    let counted = tx.count_recipes().await;
    let existing = match counted {
        Ok(n) => n,
        Err(e) => {
            run.enter(SeedState::Failed);
            rollback(tx).await;
            return Err(e.into());
        }
    };
    if existing > 0 {
        tx.rollback().await?;
        run.enter(SeedState::Skipped);
        tracing::info!(existing, "catalog already contains recipes, skipping seed");
        return Ok(SeedOutcome::Skipped { existing });
    }

    tracing::info!(
        max_recipes = options.max_recipes,
        batch_size = options.batch_size,
        "seeding catalog"
    );
    run.enter(SeedState::Ingesting);

    let ingested = ingest(tx.as_mut(), open, options).await;
    let result = match ingested {
        Ok(report) => tx.commit().await.map(|_| report).map_err(SeedError::from),
        Err(e) => {
            rollback(tx).await;
            Err(e)
        }
    };

    match result {
        Ok(report) => {
            run.enter(SeedState::Completed);
            tracing::info!(
                recipes = report.accepted,
                rejected = report.rejected,
                categories = report.categories_created,
                ingredients = report.ingredients_created,
                "seed completed"
            );
            Ok(SeedOutcome::Completed(report))
        }
        Err(e) => {
            run.enter(SeedState::Failed);
            tracing::error!(error = %e, "seed failed, rolled back");
            Err(e)
        }
    }
}

async fn rollback(tx: Box<dyn StoreTx + '_>) {
    if let Err(e) = tx.rollback().await {
        tracing::warn!(error = %e, "rollback failed");
    }
}

/// Caches owned by one run.
struct RunCaches {
    categories: NameCache<Category>,
    ingredients: NameCache<Ingredient>,
}

async fn ingest<T, F, R>(
    tx: &mut T,
    open: F,
    options: &SeedOptions,
) -> Result<SeedReport, SeedError>
where
    T: StoreTx + ?Sized,
    F: FnOnce() -> std::io::Result<R>,
    R: Read + Send,
{
    let source = open().map_err(csv::Error::from)?;
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(source);

    let mut caches = RunCaches {
        categories: NameCache::new(),
        ingredients: NameCache::new(),
    };
    let mut batch: Vec<NewRecipe> = Vec::with_capacity(options.batch_size);
    let mut report = SeedReport::default();
    let mut record = StringRecord::new();
    // Record 1 is the header.
    let mut row_num = 1usize;

    while report.accepted < options.max_recipes {
        if !reader.read_record(&mut record)? {
            break;
        }
        row_num += 1;

        let row = match parse_row(&record) {
            Ok(row) => row,
            Err(reason) => {
                report.rejected += 1;
                tracing::warn!(row = row_num, %reason, "skipping dataset row");
                continue;
            }
        };

        batch.push(build_recipe(tx, &mut caches, row).await?);
        report.accepted += 1;

        if batch.len() >= options.batch_size {
            flush(tx, &mut batch, &mut report).await?;
            tracing::info!(processed = report.accepted, "processed recipes");
        }
    }

    if !batch.is_empty() {
        flush(tx, &mut batch, &mut report).await?;
        tracing::info!(processed = report.accepted, "processed recipes in total");
    }

    report.categories_created = caches.categories.created();
    report.ingredients_created = caches.ingredients.created();
    Ok(report)
}

async fn build_recipe<T>(
    tx: &mut T,
    caches: &mut RunCaches,
    row: ParsedRow,
) -> anyhow::Result<NewRecipe>
where
    T: StoreTx + ?Sized,
{
    let category = resolve(tx, &mut caches.categories, &row.category).await?;

    let mut ingredient_ids = Vec::with_capacity(row.ingredients.len());
    for name in &row.ingredients {
        let ingredient = resolve(tx, &mut caches.ingredients, name).await?;
        if !ingredient_ids.contains(&ingredient.id) {
            ingredient_ids.push(ingredient.id);
        }
    }

    Ok(NewRecipe {
        title: row.title,
        description: row.description,
        cook_time: row.cook_time,
        created_at: Utc::now(),
        category_id: category.id,
        ingredient_ids,
    })
}

async fn flush<T>(
    tx: &mut T,
    batch: &mut Vec<NewRecipe>,
    report: &mut SeedReport,
) -> anyhow::Result<()>
where
    T: StoreTx + ?Sized,
{
    tx.insert_recipes(batch).await?;
    report.batches += 1;
    batch.clear();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CatalogCounts, EntityKind, RecipeDetail};
    use crate::store::memory::InMemoryStore;
    use crate::store::RecipeQuery;
    use std::io::Cursor;

    const HEADER: [&str; 12] = [
        "id",
        "name",
        "url",
        "minutes",
        "author",
        "date",
        "nutrition",
        "n_steps",
        "tags",
        "steps",
        "ingredients",
        "description",
    ];

    fn row(title: &str, minutes: &str, tags: &str, ingredients: &str) -> Vec<String> {
        vec![
            "1".into(),
            title.into(),
            "url".into(),
            minutes.into(),
            "author".into(),
            "2020-01-01".into(),
            "[]".into(),
            "3".into(),
            tags.into(),
            "['mix']".into(),
            ingredients.into(),
            format!("About {}.", title),
        ]
    }

    fn dataset(rows: &[Vec<String>]) -> Vec<u8> {
        let mut writer = csv::WriterBuilder::new()
            .flexible(true)
            .from_writer(Vec::new());
        writer.write_record(HEADER).unwrap();
        for r in rows {
            writer.write_record(r).unwrap();
        }
        writer.into_inner().unwrap()
    }

    async fn seed(
        store: &InMemoryStore,
        bytes: Vec<u8>,
        options: SeedOptions,
    ) -> Result<SeedOutcome, SeedError> {
        run_seed(store, move || Ok(Cursor::new(bytes)), &options).await
    }

    fn completed(outcome: SeedOutcome) -> SeedReport {
        match outcome {
            SeedOutcome::Completed(report) => report,
            other => panic!("expected completed run, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_pasta_salad_example() {
        let store = InMemoryStore::new();
        let mut pasta = row(
            "Pasta Salad",
            "25",
            "['30-minutes-or-less', 'pasta']",
            "['pasta', 'tomato', 'pasta']",
        );
        pasta[11] = "A simple salad.".into();

        let outcome = seed(&store, dataset(&[pasta]), SeedOptions::default()).await;
        let report = completed(outcome.unwrap());
        assert_eq!(report.accepted, 1);

        let recipe = store.get_recipe(1).await.unwrap().unwrap();
        assert_eq!(recipe.title, "Pasta Salad");
        assert_eq!(recipe.cook_time, 25);
        assert_eq!(recipe.description, "A simple salad.");
        assert_eq!(recipe.category.name, "30-minutes-or-less");
        let names: Vec<&str> = recipe.ingredients.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["pasta", "tomato"]);
        assert_eq!(store.ingredient_ids(1).unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_shared_names_resolve_to_one_entity() {
        let store = InMemoryStore::new();
        let rows = vec![
            row("A", "10", "['easy', 'quick']", "['salt', 'egg']"),
            row("B", "20", "['easy']", "['egg', 'flour']"),
            row("C", "30", "['hard']", "['salt']"),
        ];

        let outcome = seed(&store, dataset(&rows), SeedOptions::default()).await;
        let report = completed(outcome.unwrap());
        assert_eq!(report.accepted, 3);
        assert_eq!(report.categories_created, 2);
        assert_eq!(report.ingredients_created, 3);

        assert_eq!(
            store.names(EntityKind::Category).unwrap(),
            vec!["easy", "hard"]
        );
        assert_eq!(
            store.names(EntityKind::Ingredient).unwrap(),
            vec!["salt", "egg", "flour"]
        );

        let a = store.get_recipe(1).await.unwrap().unwrap();
        let b = store.get_recipe(2).await.unwrap().unwrap();
        let c = store.get_recipe(3).await.unwrap().unwrap();
        assert_eq!(a.category.id, b.category.id);
        let egg = |r: &RecipeDetail| {
            r.ingredients.iter().find(|i| i.name == "egg").map(|i| i.id)
        };
        assert_eq!(egg(&a), egg(&b));
        let salt = |r: &RecipeDetail| {
            r.ingredients.iter().find(|i| i.name == "salt").map(|i| i.id)
        };
        assert_eq!(salt(&a), salt(&c));
    }

    #[tokio::test]
    async fn test_bad_rows_are_skipped_without_aborting() {
        let store = InMemoryStore::new();
        let mut short = row("Short", "5", "['x']", "['y']");
        short.truncate(10);
        let rows = vec![
            row("Good 1", "10", "['easy']", "['salt']"),
            short,
            row("Bad Time", "ten", "['easy']", "['salt']"),
            row("Negative", "-1", "['easy']", "['salt']"),
            row("", "10", "['easy']", "['salt']"),
            row("Good 2", "0", "['easy']", "['salt']"),
        ];

        let outcome = seed(&store, dataset(&rows), SeedOptions::default()).await;
        let report = completed(outcome.unwrap());
        assert_eq!(report.accepted, 2);
        assert_eq!(report.rejected, 4);

        let titles: Vec<String> = store
            .search_recipes(&RecipeQuery::new(10))
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.title)
            .collect();
        assert_eq!(titles, vec!["Good 1", "Good 2"]);
    }

    #[tokio::test]
    async fn test_whitespace_title_is_stored_verbatim() {
        let store = InMemoryStore::new();
        let rows = vec![row("   ", "25", "['easy']", "['salt']")];

        let report = completed(seed(&store, dataset(&rows), SeedOptions::default()).await.unwrap());
        assert_eq!(report.accepted, 1);
        assert_eq!(report.rejected, 0);
        assert_eq!(store.get_recipe(1).await.unwrap().unwrap().title, "   ");
    }

    #[tokio::test]
    async fn test_search_folds_ascii_case_only() {
        let store = InMemoryStore::new();
        let rows = vec![row("CRÈME BRÛLÉE", "60", "['desserts']", "['cream']")];
        completed(seed(&store, dataset(&rows), SeedOptions::default()).await.unwrap());

        let hits = |text: &str| RecipeQuery::new(10).with_text(text);
        assert_eq!(store.search_recipes(&hits("crÈme")).await.unwrap().len(), 1);
        assert!(store.search_recipes(&hits("crème")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_tag_list_falls_back_to_general() {
        let store = InMemoryStore::new();
        let rows = vec![
            row("Plain", "15", "[]", "['water']"),
            row("Blank", "15", "['', ' ']", "[]"),
        ];

        let outcome = seed(&store, dataset(&rows), SeedOptions::default()).await;
        completed(outcome.unwrap());
        assert_eq!(store.names(EntityKind::Category).unwrap(), vec!["General"]);
        let blank = store.get_recipe(2).await.unwrap().unwrap();
        assert_eq!(blank.category.name, "General");
        assert!(blank.ingredients.is_empty());
    }

    #[tokio::test]
    async fn test_second_run_is_a_noop() {
        let store = InMemoryStore::new();
        let rows = vec![row("A", "10", "['easy']", "['salt']")];

        let outcome = seed(&store, dataset(&rows), SeedOptions::default()).await;
        completed(outcome.unwrap());
        let before = store.counts().await.unwrap();

        let more = vec![
            row("B", "10", "['new']", "['pepper']"),
            row("C", "10", "['new']", "['pepper']"),
        ];
        let outcome = seed(&store, dataset(&more), SeedOptions::default()).await.unwrap();
        assert_eq!(outcome, SeedOutcome::Skipped { existing: 1 });
        assert_eq!(outcome.state(), SeedState::Skipped);
        assert_eq!(store.counts().await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_skip_never_opens_dataset() {
        let store = InMemoryStore::new();
        let rows = vec![row("A", "1", "[]", "[]")];
        let outcome = seed(&store, dataset(&rows), SeedOptions::default()).await;
        completed(outcome.unwrap());

        let outcome = run_seed(
            &store,
            || -> std::io::Result<Cursor<Vec<u8>>> {
                panic!("dataset opened on a populated store")
            },
            &SeedOptions::default(),
        )
        .await
        .unwrap();
        assert!(matches!(outcome, SeedOutcome::Skipped { .. }));
    }

    #[tokio::test]
    async fn test_ceiling_stops_reading() {
        let store = InMemoryStore::new();
        let rows: Vec<Vec<String>> = (0..500)
            .map(|i| row(&format!("Recipe {}", i), "10", "['easy']", "['salt']"))
            .collect();
        let mut bytes = dataset(&rows);
        // Row 501 is not valid UTF-8; reading it would fail the run.
        bytes.extend_from_slice(b"1,\xff\xfe,url,10,a,d,n,3,[],s,[],d\n");

        let report = completed(seed(&store, bytes, SeedOptions::default()).await.unwrap());
        assert_eq!(report.accepted, 500);
        assert_eq!(report.batches, 10);
        assert_eq!(store.counts().await.unwrap().recipes, 500);
    }

    #[tokio::test]
    async fn test_ceiling_counts_only_accepted_rows() {
        let store = InMemoryStore::new();
        let rows = vec![
            row("A", "x", "[]", "[]"),
            row("B", "1", "[]", "[]"),
            row("C", "2", "[]", "[]"),
            row("D", "3", "[]", "[]"),
        ];
        let options = SeedOptions {
            max_recipes: 2,
            batch_size: 50,
        };

        let report = completed(seed(&store, dataset(&rows), options).await.unwrap());
        assert_eq!(report.accepted, 2);
        assert_eq!(report.rejected, 1);
        assert!(store.get_recipe(3).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_partial_batch_is_flushed() {
        let store = InMemoryStore::new();
        let rows: Vec<Vec<String>> = (0..5)
            .map(|i| row(&format!("R{}", i), "10", "['easy']", "['salt']"))
            .collect();
        let options = SeedOptions {
            max_recipes: 500,
            batch_size: 2,
        };

        let report = completed(seed(&store, dataset(&rows), options).await.unwrap());
        assert_eq!(report.batches, 3);
        assert_eq!(store.counts().await.unwrap().recipes, 5);
    }

    #[tokio::test]
    async fn test_corrupt_dataset_rolls_back() {
        let store = InMemoryStore::new();
        let rows: Vec<Vec<String>> = (0..3)
            .map(|i| row(&format!("R{}", i), "10", "['easy']", "['salt']"))
            .collect();
        let mut bytes = dataset(&rows);
        bytes.extend_from_slice(b"1,\xff\xfe,url,10,a,d,n,3,[],s,[],d\n");
        let options = SeedOptions {
            max_recipes: 500,
            batch_size: 2,
        };

        let err = seed(&store, bytes, options).await.unwrap_err();
        assert!(matches!(err, SeedError::SourceUnreadable(_)));
        assert_eq!(err.state(), SeedState::Failed);
        assert_eq!(store.counts().await.unwrap(), CatalogCounts::default());
    }

    #[tokio::test]
    async fn test_missing_dataset_is_fatal() {
        let store = InMemoryStore::new();
        let err = run_seed(
            &store,
            || -> std::io::Result<Cursor<Vec<u8>>> {
                Err(std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"))
            },
            &SeedOptions::default(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, SeedError::SourceUnreadable(_)));
        assert_eq!(store.counts().await.unwrap().recipes, 0);
    }

    #[tokio::test]
    async fn test_header_only_dataset_completes_empty() {
        let store = InMemoryStore::new();
        let outcome = seed(&store, dataset(&[]), SeedOptions::default()).await;
        let report = completed(outcome.unwrap());
        assert_eq!(report, SeedReport::default());
    }
}
