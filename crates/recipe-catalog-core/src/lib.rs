//! # Recipe Catalog Core
//!
//! Storage-agnostic logic for Recipe Catalog: data models, the dataset row
//! parser, name-keyed entity resolution, the store abstraction, and the
//! seed pipeline that turns a raw recipe CSV into a normalized catalog.
//!
//! This crate contains no tokio, sqlx, or filesystem I/O. Backends live
//! in the `recipe-catalog` crate (SQLite) or in [`store::memory`].

pub mod models;
pub mod resolve;
pub mod row;
pub mod seed;
pub mod store;
