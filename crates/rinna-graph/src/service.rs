//! `CriticalPathService`: the one entry point embedders talk to.
//!
//! Owns the dependency store behind a single reader-writer lock and resolves
//! item identifiers through a [`WorkItemAccessor`]. Mutations hold the write
//! lock for the whole check-then-insert; every analysis takes one read guard
//! so it sees a single consistent edge snapshot.

use std::collections::HashMap;

use chrono::{NaiveDate, Utc};
use parking_lot::RwLock;
use rinna_core::{EngineConfig, ItemId, WorkItem, WorkItemAccessor};
use tracing::{debug, instrument};

use crate::block_state;
use crate::error::GraphError;
use crate::graph::{
    CriticalPath, DEFAULT_EDGE_KIND, DependencyStore, Direction, Edge, blocked_on_path,
    compute_critical_path, compute_critical_path_to, find_blocking_items, parallel_paths,
    topological_order, transitive_dependents,
};
use crate::schedule::{self, ScheduledItem};

/// Dependency tracking and critical path analysis over an item accessor.
pub struct CriticalPathService<A: WorkItemAccessor> {
    accessor: A,
    store: RwLock<DependencyStore>,
    config: EngineConfig,
}

impl<A: WorkItemAccessor> CriticalPathService<A> {
    /// Service with default weights and schedule settings.
    #[must_use]
    pub fn new(accessor: A) -> Self {
        Self::with_config(accessor, EngineConfig::default())
    }

    #[must_use]
    pub fn with_config(accessor: A, config: EngineConfig) -> Self {
        Self {
            accessor,
            store: RwLock::new(DependencyStore::new()),
            config,
        }
    }

    #[must_use]
    pub const fn accessor(&self) -> &A {
        &self.accessor
    }

    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    // --- dependencies -----------------------------------------------------

    /// Record that `dependent` cannot finish before `blocker`.
    ///
    /// # Errors
    ///
    /// [`GraphError::UnknownItem`] if either item is unknown (dependent
    /// checked first); [`GraphError::CycleDetected`] for a self-dependency
    /// or an edge that would close a cycle.
    pub fn add_dependency(&self, dependent: &ItemId, blocker: &ItemId) -> Result<Edge, GraphError> {
        self.add_labeled_dependency(dependent, blocker, DEFAULT_EDGE_KIND, None)
    }

    /// [`add_dependency`](Self::add_dependency) with an explicit label and
    /// author. An already-present pair keeps its original label.
    ///
    /// # Errors
    ///
    /// Same as [`add_dependency`](Self::add_dependency).
    #[instrument(skip(self))]
    pub fn add_labeled_dependency(
        &self,
        dependent: &ItemId,
        blocker: &ItemId,
        kind: &str,
        created_by: Option<&str>,
    ) -> Result<Edge, GraphError> {
        self.require(dependent)?;
        self.require(blocker)?;
        self.store
            .write()
            .insert(dependent, blocker, kind, created_by, Utc::now())
    }

    /// Drop the edge if present. Unknown items are not an error.
    pub fn remove_dependency(&self, dependent: &ItemId, blocker: &ItemId) -> bool {
        self.store.write().remove(dependent, blocker)
    }

    #[must_use]
    pub fn has_dependency(&self, dependent: &ItemId, blocker: &ItemId) -> bool {
        self.store.read().contains(dependent, blocker)
    }

    /// Items that wait directly on `blocker`.
    #[must_use]
    pub fn dependents_of(&self, blocker: &ItemId) -> Vec<ItemId> {
        self.store.read().dependents_of(blocker).into_iter().collect()
    }

    /// Items `dependent` waits on directly.
    #[must_use]
    pub fn blockers_of(&self, dependent: &ItemId) -> Vec<ItemId> {
        self.store.read().blockers_of(dependent).into_iter().collect()
    }

    /// Edge records on one side of `item`.
    #[must_use]
    pub fn dependencies(&self, item: &ItemId, direction: Direction) -> Vec<Edge> {
        self.store.read().edges_of(item, direction)
    }

    /// [`dependencies`](Self::dependencies) with a textual selector,
    /// `"incoming"` or `"outgoing"` in any case.
    ///
    /// # Errors
    ///
    /// [`GraphError::InvalidDirection`] for any other selector.
    pub fn dependencies_by_direction(
        &self,
        item: &ItemId,
        direction: &str,
    ) -> Result<Vec<Edge>, GraphError> {
        let direction: Direction = direction.parse()?;
        Ok(self.dependencies(item, direction))
    }

    /// Every edge, ordered by `(dependent, blocker)`.
    #[must_use]
    pub fn edges(&self) -> Vec<Edge> {
        self.store.read().edges()
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.store.read().edge_count()
    }

    // --- analyses ---------------------------------------------------------

    /// All accessor items, blockers before their dependents.
    #[must_use]
    #[instrument(skip(self))]
    pub fn topological_order(&self) -> Vec<WorkItem> {
        let items = self.accessor.find_all();
        let ids: Vec<ItemId> = items.iter().map(|i| i.id.clone()).collect();
        let order = topological_order(&self.store.read(), &ids);

        let mut by_id: HashMap<ItemId, WorkItem> =
            items.into_iter().map(|i| (i.id.clone(), i)).collect();
        order.iter().filter_map(|id| by_id.remove(id)).collect()
    }

    /// Incomplete items that more than one item waits on, highest priority
    /// first.
    #[must_use]
    #[instrument(skip(self))]
    pub fn find_blocking_items(&self) -> Vec<WorkItem> {
        let items = self.accessor.find_all();
        let blocking = find_blocking_items(&self.store.read(), items);
        debug!(count = blocking.len(), "blocking items found");
        blocking
    }

    /// Items on the critical path, blockers first.
    #[must_use]
    pub fn find_critical_path(&self) -> Vec<WorkItem> {
        self.critical_path().items
    }

    /// The critical path with its total weight.
    #[must_use]
    #[instrument(skip(self))]
    pub fn critical_path(&self) -> CriticalPath {
        let items = self.accessor.find_all();
        compute_critical_path(&self.store.read(), &items, &self.config.weights)
    }

    /// Heaviest path that ends at `target`.
    ///
    /// # Errors
    ///
    /// [`GraphError::UnknownItem`] if `target` is unknown.
    #[instrument(skip(self))]
    pub fn critical_path_to(&self, target: &ItemId) -> Result<CriticalPath, GraphError> {
        self.require(target)?;
        let items = self.accessor.find_all();
        Ok(compute_critical_path_to(
            &self.store.read(),
            &items,
            &self.config.weights,
            target,
        ))
    }

    /// Up to `max_paths` independent source-to-sink chains, longest first.
    ///
    /// Ids that no longer resolve through the accessor are dropped from the
    /// returned paths.
    #[must_use]
    #[instrument(skip(self))]
    pub fn parallel_paths(&self, max_paths: usize) -> Vec<Vec<WorkItem>> {
        let paths = parallel_paths(&self.store.read(), max_paths);
        debug!(count = paths.len(), "parallel paths found");
        paths.into_iter().map(|path| self.resolve(path)).collect()
    }

    /// Items that wait directly on `id`.
    ///
    /// # Errors
    ///
    /// [`GraphError::UnknownItem`] if `id` is unknown.
    pub fn find_items_depending_on(&self, id: &ItemId) -> Result<Vec<WorkItem>, GraphError> {
        self.require(id)?;
        let dependents = self.store.read().dependents_of(id);
        Ok(self.resolve(dependents))
    }

    /// Every item that would slip if `id` slips, directly or transitively.
    ///
    /// `delay_days` does not change who is affected; it is recorded on the
    /// span only.
    ///
    /// # Errors
    ///
    /// [`GraphError::UnknownItem`] if `id` is unknown.
    #[instrument(skip(self))]
    pub fn calculate_delay_impact(
        &self,
        id: &ItemId,
        delay_days: u32,
    ) -> Result<Vec<WorkItem>, GraphError> {
        self.require(id)?;
        let reached = transitive_dependents(&self.store.read(), id);
        let impacted = self.resolve(reached);
        debug!(count = impacted.len(), "delay impact computed");
        Ok(impacted)
    }

    // --- block state ------------------------------------------------------

    /// Flag `id` as blocked as of today (UTC).
    ///
    /// # Errors
    ///
    /// [`GraphError::UnknownItem`] if `id` is unknown.
    pub fn mark_as_blocked(
        &self,
        id: &ItemId,
        reason: &str,
        blocked_by: Option<&str>,
    ) -> Result<WorkItem, GraphError> {
        block_state::mark_as_blocked(
            &self.accessor,
            id,
            reason,
            blocked_by,
            Utc::now().date_naive(),
        )
    }

    /// Clear the block flag on `id` as of today (UTC).
    ///
    /// # Errors
    ///
    /// [`GraphError::UnknownItem`] if `id` is unknown.
    pub fn mark_as_unblocked(&self, id: &ItemId) -> Result<WorkItem, GraphError> {
        block_state::mark_as_unblocked(&self.accessor, id, Utc::now().date_naive())
    }

    // --- reporting --------------------------------------------------------

    /// Critical path items that carry a manual block flag.
    #[must_use]
    pub fn blocked_on_critical_path(&self) -> Vec<WorkItem> {
        blocked_on_path(&self.critical_path())
    }

    /// Projected finish dates along the critical path starting at `start`.
    #[must_use]
    #[instrument(skip(self))]
    pub fn estimated_completion_dates(&self, start: NaiveDate) -> Vec<ScheduledItem> {
        let path = self.critical_path();
        schedule::estimated_completion_dates(
            &path.items,
            start,
            self.config.schedule.default_estimated_days,
        )
    }

    fn require(&self, id: &ItemId) -> Result<WorkItem, GraphError> {
        self.accessor
            .find_by_id(id)
            .ok_or_else(|| GraphError::UnknownItem(id.clone()))
    }

    fn resolve(&self, ids: impl IntoIterator<Item = ItemId>) -> Vec<WorkItem> {
        ids.into_iter()
            .filter_map(|id| self.accessor.find_by_id(&id))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rinna_core::config::WeightConfig;
    use rinna_core::{InMemoryItemStore, Priority};

    fn service(names: &[&str]) -> CriticalPathService<InMemoryItemStore> {
        CriticalPathService::new(InMemoryItemStore::with_items(
            names.iter().map(|n| WorkItem::new(*n, n.to_uppercase())),
        ))
    }

    fn id(name: &str) -> ItemId {
        ItemId::from(name)
    }

    #[test]
    fn unknown_dependent_reported_before_unknown_blocker() {
        let svc = service(&["a"]);
        assert_eq!(
            svc.add_dependency(&id("x"), &id("y")),
            Err(GraphError::UnknownItem(id("x")))
        );
        assert_eq!(
            svc.add_dependency(&id("a"), &id("y")),
            Err(GraphError::UnknownItem(id("y")))
        );
        assert_eq!(svc.edge_count(), 0);
    }

    #[test]
    fn labeled_dependency_keeps_label_and_author() {
        let svc = service(&["a", "b"]);
        let edge = svc
            .add_labeled_dependency(&id("b"), &id("a"), "REQUIRES", Some("ana"))
            .unwrap();
        assert_eq!(edge.kind, "REQUIRES");
        assert_eq!(edge.created_by.as_deref(), Some("ana"));

        let again = svc.add_dependency(&id("b"), &id("a")).unwrap();
        assert_eq!(again, edge);
        assert_eq!(svc.edge_count(), 1);
    }

    #[test]
    fn remove_does_not_consult_accessor() {
        let svc = service(&["a"]);
        assert!(!svc.remove_dependency(&id("ghost"), &id("a")));
    }

    #[test]
    fn direction_selector_is_case_insensitive() {
        let svc = service(&["a", "b"]);
        svc.add_dependency(&id("b"), &id("a")).unwrap();

        let incoming = svc.dependencies_by_direction(&id("b"), "INCOMING").unwrap();
        assert_eq!(incoming.len(), 1);
        assert_eq!(incoming[0].blocker, id("a"));

        let outgoing = svc.dependencies_by_direction(&id("a"), "Outgoing").unwrap();
        assert_eq!(outgoing.len(), 1);

        assert_eq!(
            svc.dependencies_by_direction(&id("a"), "sideways"),
            Err(GraphError::InvalidDirection("sideways".to_string()))
        );
    }

    #[test]
    fn topological_order_resolves_items() {
        let svc = service(&["c", "b", "a"]);
        svc.add_dependency(&id("b"), &id("a")).unwrap();
        svc.add_dependency(&id("c"), &id("b")).unwrap();
        let order: Vec<_> = svc
            .topological_order()
            .into_iter()
            .map(|i| i.id)
            .collect();
        assert_eq!(order, vec![id("a"), id("b"), id("c")]);
    }

    #[test]
    fn custom_weights_change_total() {
        let store = InMemoryItemStore::with_items([
            WorkItem::new("a", "A"),
            WorkItem::new("b", "B").with_priority(Priority::High),
        ]);
        let config = EngineConfig {
            weights: WeightConfig {
                base: 10.0,
                ..WeightConfig::default()
            },
            ..EngineConfig::default()
        };
        let svc = CriticalPathService::with_config(store, config);
        svc.add_dependency(&id("b"), &id("a")).unwrap();

        let path = svc.critical_path();
        assert_eq!(path.ids(), vec![id("a"), id("b")]);
        assert!((path.total_weight - 13.0).abs() < f64::EPSILON);
    }

    #[test]
    fn delay_impact_requires_known_item() {
        let svc = service(&["a"]);
        assert_eq!(
            svc.calculate_delay_impact(&id("nope"), 3),
            Err(GraphError::UnknownItem(id("nope")))
        );
        assert!(svc.calculate_delay_impact(&id("a"), 3).unwrap().is_empty());
    }

    #[test]
    fn dangling_dependents_are_skipped() {
        let store = std::sync::Arc::new(InMemoryItemStore::with_items([
            WorkItem::new("a", "A"),
            WorkItem::new("b", "B"),
        ]));
        let svc = CriticalPathService::new(std::sync::Arc::clone(&store));
        svc.add_dependency(&id("b"), &id("a")).unwrap();
        store.remove(&id("b"));

        assert!(svc.find_items_depending_on(&id("a")).unwrap().is_empty());
        assert!(svc.calculate_delay_impact(&id("a"), 1).unwrap().is_empty());
        assert!(svc.has_dependency(&id("b"), &id("a")));
    }
}
