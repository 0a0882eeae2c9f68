//! Critical path analysis over the dependency graph.
//!
//! # Overview
//!
//! The critical path is the heaviest chain of blocking work: a sequence of
//! items, each waiting on the previous one, whose summed weight is maximal.
//!
//! # Weights
//!
//! Each item carries a weight derived from its priority (see
//! [`WeightConfig`]). With the default configuration:
//!
//! | Priority | Weight | Weight once done/released |
//! |----------|--------|---------------------------|
//! | critical | 5.0    | 2.5                       |
//! | high     | 4.0    | 2.0                       |
//! | medium   | 3.0    | 1.5                       |
//! | low      | 2.0    | 1.0                       |
//!
//! A path's weight is the sum of the weights of every item after its root;
//! the root itself contributes nothing.
//!
//! # Algorithm
//!
//! 1. **Roots** are items with no blocker inside the analysed set. If there
//!    are none, the highest-priority item (earliest on ties) stands in.
//! 2. Distances start at −∞, roots at 0.
//! 3. In topological order, relax each item's dependents:
//!    `dist[dep] = max(dist[dep], dist[item] + weight(dep))`. Only strict
//!    improvements replace the predecessor, so the first route found wins
//!    ties.
//! 4. The terminal item has the largest distance (earliest on ties).
//! 5. Predecessors are followed back to a root and the chain reversed.

use std::collections::{HashMap, HashSet};

use rinna_core::config::WeightConfig;
use rinna_core::{ItemId, WorkItem};
use tracing::{debug, warn};

use super::store::DependencyStore;
use super::topo::topological_order;

/// Result of critical path analysis.
#[derive(Debug, Clone, PartialEq)]
pub struct CriticalPath {
    /// Items on the path, blockers first.
    pub items: Vec<WorkItem>,
    /// Summed weight of every item after the root.
    pub total_weight: f64,
}

impl CriticalPath {
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            items: Vec::new(),
            total_weight: 0.0,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn ids(&self) -> Vec<ItemId> {
        self.items.iter().map(|i| i.id.clone()).collect()
    }
}

/// Weight an item adds when a path extends onto it.
#[must_use]
pub fn item_weight(item: &WorkItem, weights: &WeightConfig) -> f64 {
    let weight = weights.base + weights.bonus(item.priority);
    if item.state.is_complete() {
        weight * weights.completed_factor
    } else {
        weight
    }
}

/// Longest-path distances and predecessor links for one item set.
struct Relaxation<'a> {
    by_id: HashMap<&'a ItemId, &'a WorkItem>,
    distance: HashMap<ItemId, f64>,
    predecessor: HashMap<ItemId, ItemId>,
}

impl<'a> Relaxation<'a> {
    fn run(store: &DependencyStore, items: &'a [WorkItem], weights: &WeightConfig) -> Self {
        let by_id: HashMap<&ItemId, &WorkItem> = items.iter().map(|i| (&i.id, i)).collect();

        let mut roots: Vec<&ItemId> = items
            .iter()
            .filter(|item| {
                store
                    .blockers_of(&item.id)
                    .iter()
                    .all(|b| !by_id.contains_key(b))
            })
            .map(|item| &item.id)
            .collect();

        if roots.is_empty() {
            // first-wins on equal priority
            if let Some(fallback) = items
                .iter()
                .reduce(|best, item| if item.priority > best.priority { item } else { best })
            {
                warn!(item = %fallback.id, "no root items; using highest priority item");
                roots.push(&fallback.id);
            }
        }

        let mut distance: HashMap<ItemId, f64> = items
            .iter()
            .map(|i| (i.id.clone(), f64::NEG_INFINITY))
            .collect();
        for root in &roots {
            distance.insert((*root).clone(), 0.0);
        }

        let ids: Vec<ItemId> = items.iter().map(|i| i.id.clone()).collect();
        let mut predecessor: HashMap<ItemId, ItemId> = HashMap::new();

        for id in topological_order(store, &ids) {
            let current = distance.get(&id).copied().unwrap_or(f64::NEG_INFINITY);
            if !current.is_finite() {
                continue;
            }
            for dependent in store.dependents_of(&id) {
                let Some(item) = by_id.get(&dependent) else {
                    continue;
                };
                let candidate = current + item_weight(item, weights);
                let best = distance.get(&dependent).copied().unwrap_or(f64::NEG_INFINITY);
                if candidate > best {
                    distance.insert(dependent.clone(), candidate);
                    predecessor.insert(dependent, id.clone());
                }
            }
        }

        Self {
            by_id,
            distance,
            predecessor,
        }
    }

    fn distance_of(&self, id: &ItemId) -> f64 {
        self.distance.get(id).copied().unwrap_or(f64::NEG_INFINITY)
    }

    /// Walk predecessors back from `end`, returning the path root-first.
    fn path_to(&self, end: &ItemId) -> CriticalPath {
        let mut chain = vec![end.clone()];
        let mut seen: HashSet<&ItemId> = HashSet::from([end]);
        let mut current = end;
        while let Some(prev) = self.predecessor.get(current) {
            if !seen.insert(prev) {
                warn!(item = %prev, "predecessor loop while rebuilding path");
                break;
            }
            chain.push(prev.clone());
            current = prev;
        }
        chain.reverse();

        let total = self.distance_of(end);
        CriticalPath {
            items: chain
                .iter()
                .filter_map(|id| self.by_id.get(id).map(|item| (*item).clone()))
                .collect(),
            total_weight: if total.is_finite() { total } else { 0.0 },
        }
    }
}

/// Compute the critical path through `items`.
///
/// Edges to items outside `items` are ignored. Returns an empty path for an
/// empty set and never panics.
#[must_use]
pub fn compute_critical_path(
    store: &DependencyStore,
    items: &[WorkItem],
    weights: &WeightConfig,
) -> CriticalPath {
    if items.is_empty() {
        return CriticalPath::empty();
    }

    let relax = Relaxation::run(store, items, weights);

    let mut terminal: Option<(&ItemId, f64)> = None;
    for item in items {
        let d = relax.distance_of(&item.id);
        if terminal.is_none_or(|(_, best)| d > best) {
            terminal = Some((&item.id, d));
        }
    }

    let Some((end, _)) = terminal else {
        return CriticalPath::empty();
    };

    let path = relax.path_to(end);
    debug!(len = path.len(), weight = path.total_weight, "critical path computed");
    path
}

/// Heaviest path through `items` that ends at `target`.
///
/// Returns an empty path if `target` is not in `items`. A target the
/// relaxation never reached yields a single-item path.
#[must_use]
pub fn compute_critical_path_to(
    store: &DependencyStore,
    items: &[WorkItem],
    weights: &WeightConfig,
    target: &ItemId,
) -> CriticalPath {
    if !items.iter().any(|i| &i.id == target) {
        return CriticalPath::empty();
    }
    Relaxation::run(store, items, weights).path_to(target)
}
