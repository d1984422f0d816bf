//! # Recipe Catalog
//!
//! **A static recipe catalog seeded from a bulk CSV dataset.**
//!
//! On startup the catalog is seeded once from a Food.com-style recipe CSV:
//! rows are parsed, categories and ingredients are de-duplicated by name,
//! and recipes are written in batches inside a single transaction. Later
//! starts find the catalog populated and skip the seed.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐   ┌──────────────────────┐   ┌──────────┐
//! │ RAW CSV     │──▶│ Seed pipeline        │──▶│  SQLite  │
//! │ dataset     │   │ parse+resolve+batch  │   │          │
//! └─────────────┘   └──────────────────────┘   └────┬─────┘
//!                                                   │
//!                                                   ▼
//!                                             ┌──────────┐
//!                                             │   CLI    │
//!                                             │(recipes) │
//!                                             └──────────┘
//! ```
//!
//! The pipeline itself (row parser, name resolver, batch controller, run
//! guard) lives in `recipe-catalog-core` and is storage-agnostic. This
//! crate provides the SQLite store, configuration, and the CLI.
//!
//! ## Quick Start
//!
//! ```bash
//! recipes init                               # migrate + seed
//! recipes stats                              # counts
//! recipes search salad --max-cook-time 30    # filtered listing
//! recipes get 42                             # one recipe
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing and validation |
//! | [`db`] | SQLite connection pool with WAL mode |
//! | [`migrate`] | Database schema migrations (idempotent) |
//! | [`sqlite_store`] | SQLite implementation of the core `Store` trait |
//! | [`ingest`] | Startup hook: connect, migrate, seed |
//! | [`get`] | Recipe retrieval by id |
//! | [`search`] | Filtered recipe listing |
//! | [`stats`] | Catalog counts |

pub mod config;
pub mod db;
pub mod get;
pub mod ingest;
pub mod migrate;
pub mod search;
pub mod sqlite_store;
pub mod stats;

pub use recipe_catalog_core::{models, resolve, row, seed, store};
