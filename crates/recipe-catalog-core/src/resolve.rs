//! Get-or-create resolution of name-keyed entities.
//!
//! Each seed run owns one [`NameCache`] per entity kind. [`resolve`]
//! consults the cache, then storage, and only then creates the entity.
//! Creation is immediate rather than batched, so an entity always has an
//! id before any recipe refers to it.

use std::collections::HashMap;

use anyhow::Result;

use crate::models::NamedEntity;
use crate::store::{self, StoreTx};

/// Run-scoped map from entity name to resolved entity.
#[derive(Debug)]
pub struct NameCache<E> {
    entries: HashMap<String, E>,
    created: usize,
}

impl<E: NamedEntity> NameCache<E> {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            created: 0,
        }
    }

    pub fn get(&self, name: &str) -> Option<&E> {
        self.entries.get(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// How many entities this run had to create (as opposed to finding).
    pub fn created(&self) -> usize {
        self.created
    }
}

impl<E: NamedEntity> Default for NameCache<E> {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolve `name` to an entity, creating it if neither the cache nor
/// storage knows it.
pub async fn resolve<E, T>(tx: &mut T, cache: &mut NameCache<E>, name: &str) -> Result<E>
where
    E: NamedEntity,
    T: StoreTx + ?Sized,
{
    if let Some(hit) = cache.entries.get(name) {
        return Ok(hit.clone());
    }

    let entity = match store::find_by_name::<E, T>(tx, name).await? {
        Some(existing) => existing,
        None => {
            let created = store::create::<E, T>(tx, name).await?;
            cache.created += 1;
            tracing::debug!(kind = E::KIND.as_str(), name, id = created.id(), "created");
            created
        }
    };

    cache.entries.insert(name.to_string(), entity.clone());
    Ok(entity)
}
