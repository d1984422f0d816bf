//! TOML configuration parsing and validation.
//!
//! ```toml
//! [db]
//! path = "./data/recipes.sqlite"
//!
//! [seed]
//! dataset = "./data/RAW_recipes.csv"
//! max_recipes = 500
//! batch_size = 50
//!
//! [query]
//! default_limit = 20
//! ```
//!
//! Only `[db]` is required. Relative paths are resolved against the
//! process working directory.

use anyhow::{Context, Result};
use recipe_catalog_core::seed::{SeedOptions, DEFAULT_BATCH_SIZE, DEFAULT_MAX_RECIPES};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub db: DbConfig,
    #[serde(default)]
    pub seed: SeedConfig,
    #[serde(default)]
    pub query: QueryConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DbConfig {
    pub path: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SeedConfig {
    #[serde(default = "default_dataset")]
    pub dataset: PathBuf,
    #[serde(default = "default_max_recipes")]
    pub max_recipes: usize,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            dataset: default_dataset(),
            max_recipes: DEFAULT_MAX_RECIPES,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

impl SeedConfig {
    pub fn options(&self) -> SeedOptions {
        SeedOptions {
            max_recipes: self.max_recipes,
            batch_size: self.batch_size,
        }
    }
}

fn default_dataset() -> PathBuf {
    PathBuf::from("./data/RAW_recipes.csv")
}
fn default_max_recipes() -> usize {
    DEFAULT_MAX_RECIPES
}
fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}

#[derive(Debug, Deserialize, Clone)]
pub struct QueryConfig {
    #[serde(default = "default_limit")]
    pub default_limit: i64,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            default_limit: default_limit(),
        }
    }
}

fn default_limit() -> i64 {
    20
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    parse_config(&content)
}

pub fn parse_config(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content).with_context(|| "Failed to parse config file")?;

    if config.seed.max_recipes == 0 {
        anyhow::bail!("seed.max_recipes must be >= 1");
    }
    if config.seed.batch_size == 0 {
        anyhow::bail!("seed.batch_size must be >= 1");
    }
    if config.query.default_limit < 1 {
        anyhow::bail!("query.default_limit must be >= 1");
    }

    Ok(config)
}
