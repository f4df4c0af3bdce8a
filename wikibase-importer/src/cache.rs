//! Source URI → remote identifier cache.
//!
//! One table per entity kind. Each key owns a [`OnceCell`]: the map lock is
//! held only long enough to fetch or insert the cell, and the remote creation
//! runs while awaiting the cell, outside any map lock. Concurrent resolutions
//! of the same URI wait on the same cell, so at most one creation is in
//! flight per key. A failed creation leaves the cell empty and the next
//! resolution starts from scratch.
//!
//! Properties also remember the datatype they were resolved with, so a
//! predicate's value kind stays fixed for the run.
//!
//! Nothing is evicted and nothing is persisted; a new run starts cold.

use std::future::Future;
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::OnceCell;

use crate::entity::{EntityId, EntityKind, PropertyDatatype};

type Slot = Arc<OnceCell<EntityId>>;

/// Identifier tables for one import run.
#[derive(Debug, Default)]
pub struct IdentifierCache {
    items: DashMap<String, Slot>,
    properties: DashMap<String, Slot>,
    datatypes: DashMap<String, PropertyDatatype>,
}

impl IdentifierCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn table(&self, kind: EntityKind) -> &DashMap<String, Slot> {
        match kind {
            EntityKind::Item => &self.items,
            EntityKind::Property => &self.properties,
        }
    }

    /// Reserve the cell for `uri`; the shard lock is released on return.
    fn slot(&self, kind: EntityKind, uri: &str) -> Slot {
        if let Some(existing) = self.table(kind).get(uri) {
            return existing.clone();
        }
        self.table(kind).entry(uri.to_string()).or_default().clone()
    }

    /// Identifier already assigned to `uri`, if any.
    pub fn get(&self, kind: EntityKind, uri: &str) -> Option<EntityId> {
        self.table(kind)
            .get(uri)
            .and_then(|slot| slot.value().get().cloned())
    }

    /// Return the identifier for `uri`, running `create` on a miss.
    ///
    /// `create` runs at most once at a time per key. Its error is returned
    /// as-is and nothing is cached.
    pub async fn get_or_try_create<F, Fut, E>(&self, kind: EntityKind, uri: &str, create: F) -> Result<EntityId, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<EntityId, E>>,
    {
        let slot = self.slot(kind, uri);
        slot.get_or_try_init(create).await.cloned()
    }

    /// Datatype the property `uri` was resolved with.
    pub fn property_datatype(&self, uri: &str) -> Option<PropertyDatatype> {
        self.datatypes.get(uri).map(|entry| *entry.value())
    }

    /// Remember the datatype of property `uri`. The first datatype stays.
    pub fn set_property_datatype(&self, uri: &str, datatype: PropertyDatatype) -> PropertyDatatype {
        *self.datatypes.entry(uri.to_string()).or_insert(datatype).value()
    }

    /// Number of URIs with an assigned identifier.
    pub fn len(&self, kind: EntityKind) -> usize {
        self.table(kind)
            .iter()
            .filter(|entry| entry.value().initialized())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len(EntityKind::Item) == 0 && self.len(EntityKind::Property) == 0
    }
}
