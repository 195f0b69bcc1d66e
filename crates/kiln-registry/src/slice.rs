//! Scope-partitioned collection of one entity type
//!
//! A `Slice<T>` is the registry's unit of storage: one partition per scope,
//! each behind its own `RwLock` so readers proceed concurrently while
//! writers to the same partition serialize. Entities are cloned out on read;
//! a reader observes either a fully-populated entity or not-found, never a
//! half-updated one.

use crate::entity::{Entity, Scope};
use crate::error::{RegistryError, Result};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Typed, partitioned store for one entity kind
pub struct Slice<T: Entity> {
    active: RwLock<HashMap<Uuid, T>>,
    retired: RwLock<HashMap<Uuid, T>>,
}

impl<T: Entity> Default for Slice<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Entity> Slice<T> {
    pub fn new() -> Self {
        Self {
            active: RwLock::new(HashMap::new()),
            retired: RwLock::new(HashMap::new()),
        }
    }

    fn partition(&self, scope: Scope) -> &RwLock<HashMap<Uuid, T>> {
        match scope {
            Scope::Active => &self.active,
            Scope::Retired => &self.retired,
        }
    }

    /// Look up one entity; unknown UUIDs are `NotFound`, which is distinct
    /// from an empty collection
    pub async fn get(&self, scope: Scope, id: Uuid) -> Result<T> {
        let partition = self.partition(scope).read().await;
        partition
            .get(&id)
            .cloned()
            .ok_or(RegistryError::NotFound { kind: T::KIND, id })
    }

    /// Full collection for the scope; order unspecified
    pub async fn list(&self, scope: Scope) -> Vec<T> {
        let partition = self.partition(scope).read().await;
        partition.values().cloned().collect()
    }

    pub async fn contains(&self, scope: Scope, id: Uuid) -> bool {
        let partition = self.partition(scope).read().await;
        partition.contains_key(&id)
    }

    pub async fn insert(&self, scope: Scope, entity: T) {
        let mut partition = self.partition(scope).write().await;
        partition.insert(entity.uuid(), entity);
    }

    /// Apply a mutation to one stored entity under the partition's write
    /// lock, so no concurrent reader observes an intermediate state
    pub async fn update<F>(&self, scope: Scope, id: Uuid, mutate: F) -> Result<T>
    where
        F: FnOnce(&mut T),
    {
        let mut partition = self.partition(scope).write().await;
        let entity = partition
            .get_mut(&id)
            .ok_or(RegistryError::NotFound { kind: T::KIND, id })?;
        mutate(entity);
        Ok(entity.clone())
    }

    /// Remove the entity from every partition it belongs to; `false` when it
    /// no longer exists anywhere
    pub async fn evict(&self, id: Uuid) -> bool {
        let mut removed = false;
        for scope in Scope::ALL {
            let mut partition = self.partition(scope).write().await;
            removed |= partition.remove(&id).is_some();
        }
        removed
    }

    /// Move an entity out of `Active` into `Retired`. Holds both write locks
    /// for the move, so a concurrent reader sees the entity in exactly one
    /// scope (or not at all), keeping the scopes mutually exclusive.
    pub async fn retire(&self, id: Uuid) -> Result<T> {
        let mut active = self.active.write().await;
        let mut retired = self.retired.write().await;
        let entity = active
            .remove(&id)
            .ok_or(RegistryError::NotFound { kind: T::KIND, id })?;
        retired.insert(id, entity.clone());
        Ok(entity)
    }
}
