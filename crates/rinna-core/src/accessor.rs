//! The work-item accessor port.
//!
//! Items are owned elsewhere (a repository, a service, a projection). The
//! graph engine only needs to look them up, list them and merge metadata
//! into them, which is what [`WorkItemAccessor`] captures.
//! [`InMemoryItemStore`] is a ready-made implementation for tests and for
//! embedders that keep items in memory anyway.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use crate::model::{ItemId, WorkItem};

/// Read/update access to work items by identifier.
pub trait WorkItemAccessor {
    /// Look up one item.
    fn find_by_id(&self, id: &ItemId) -> Option<WorkItem>;

    /// Every known item, in a stable order.
    fn find_all(&self) -> Vec<WorkItem>;

    /// Merge `entries` into the item's metadata (existing keys not named in
    /// `entries` are kept) and return the updated item, or `None` if the
    /// item is unknown.
    fn update_metadata(&self, id: &ItemId, entries: BTreeMap<String, String>) -> Option<WorkItem>;
}

impl<A: WorkItemAccessor + ?Sized> WorkItemAccessor for Arc<A> {
    fn find_by_id(&self, id: &ItemId) -> Option<WorkItem> {
        (**self).find_by_id(id)
    }

    fn find_all(&self) -> Vec<WorkItem> {
        (**self).find_all()
    }

    fn update_metadata(&self, id: &ItemId, entries: BTreeMap<String, String>) -> Option<WorkItem> {
        (**self).update_metadata(id, entries)
    }
}

/// Insertion-ordered in-memory item store.
#[derive(Debug, Default)]
pub struct InMemoryItemStore {
    items: RwLock<Vec<WorkItem>>,
}

impl InMemoryItemStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_items(items: impl IntoIterator<Item = WorkItem>) -> Self {
        let store = Self::new();
        for item in items {
            store.upsert(item);
        }
        store
    }

    /// Insert `item`, replacing any item with the same id in place.
    pub fn upsert(&self, item: WorkItem) {
        let mut items = self.items.write();
        if let Some(slot) = items.iter_mut().find(|existing| existing.id == item.id) {
            *slot = item;
        } else {
            items.push(item);
        }
    }

    /// Remove an item. Dependency edges that mention it are left alone.
    pub fn remove(&self, id: &ItemId) -> Option<WorkItem> {
        let mut items = self.items.write();
        let pos = items.iter().position(|item| &item.id == id)?;
        Some(items.remove(pos))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }
}

impl WorkItemAccessor for InMemoryItemStore {
    fn find_by_id(&self, id: &ItemId) -> Option<WorkItem> {
        self.items.read().iter().find(|item| &item.id == id).cloned()
    }

    fn find_all(&self) -> Vec<WorkItem> {
        self.items.read().clone()
    }

    fn update_metadata(&self, id: &ItemId, entries: BTreeMap<String, String>) -> Option<WorkItem> {
        let mut items = self.items.write();
        let item = items.iter_mut().find(|item| &item.id == id)?;
        debug!(item = %id, keys = entries.len(), "merging item metadata");
        item.metadata.extend(entries);
        Some(item.clone())
    }
}
