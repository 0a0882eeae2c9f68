//! The dependency store: the only owner of dependency edges.
//!
//! # Edge Direction
//!
//! Callers speak in `(dependent, blocker)` pairs. Internally each pair is a
//! graph edge `blocker → dependent` ("blocker blocks dependent"), so:
//!
//! - outgoing neighbours of `x` are the items that depend on `x`
//! - incoming neighbours of `x` are the items that block `x`
//!
//! Both lookups are O(degree), and because they are two views of one
//! adjacency structure they cannot drift apart.
//!
//! # Invariants
//!
//! - at most one edge per ordered pair
//! - no self-edges
//! - the edge set is acyclic; [`DependencyStore::insert`] checks reachability
//!   before mutating and rejects the edge outright
//!
//! Nodes are created lazily by the first edge that mentions an item and
//! dropped again once their last edge is removed.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use rinna_core::ItemId;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::GraphError;

/// Label used when a caller does not supply one.
pub const DEFAULT_EDGE_KIND: &str = "BLOCKS";

/// A recorded dependency: `dependent` cannot finish before `blocker`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub dependent: ItemId,
    pub blocker: ItemId,
    pub kind: String,
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Which side of an item's edges to list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Edges where the item is the dependent (what blocks it).
    Incoming,
    /// Edges where the item is the blocker (what it blocks).
    Outgoing,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Incoming => "incoming",
            Self::Outgoing => "outgoing",
        })
    }
}

impl FromStr for Direction {
    type Err = GraphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "incoming" => Ok(Self::Incoming),
            "outgoing" => Ok(Self::Outgoing),
            _ => Err(GraphError::InvalidDirection(s.to_string())),
        }
    }
}

/// Arena-backed dependency graph.
#[derive(Debug, Default, Clone)]
pub struct DependencyStore {
    graph: StableDiGraph<ItemId, Edge>,
    node_map: HashMap<ItemId, NodeIndex>,
}

impl DependencyStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `dependent` waiting on `blocker`.
    ///
    /// Returns the stored edge. If the pair is already present the existing
    /// edge is returned untouched and `kind` / `created_by` are ignored.
    ///
    /// # Errors
    ///
    /// [`GraphError::CycleDetected`] if `dependent == blocker`, or if
    /// `blocker` already (transitively) depends on `dependent`. The store is
    /// left unchanged.
    pub fn insert(
        &mut self,
        dependent: &ItemId,
        blocker: &ItemId,
        kind: &str,
        created_by: Option<&str>,
        created_at: DateTime<Utc>,
    ) -> Result<Edge, GraphError> {
        if dependent == blocker {
            return Err(GraphError::CycleDetected {
                dependent: dependent.clone(),
                blocker: blocker.clone(),
                path: vec![dependent.clone(), dependent.clone()],
            });
        }

        if let Some(existing) = self.get(dependent, blocker) {
            debug!(%dependent, %blocker, "dependency already present");
            return Ok(existing.clone());
        }

        if let Some(mut path) = self.path_between(dependent, blocker) {
            path.push(dependent.clone());
            debug!(%dependent, %blocker, len = path.len(), "rejected dependency: cycle");
            return Err(GraphError::CycleDetected {
                dependent: dependent.clone(),
                blocker: blocker.clone(),
                path,
            });
        }

        let edge = Edge {
            dependent: dependent.clone(),
            blocker: blocker.clone(),
            kind: kind.to_string(),
            created_by: created_by.map(str::to_string),
            created_at,
        };

        let blocker_idx = self.ensure_node(blocker);
        let dependent_idx = self.ensure_node(dependent);
        self.graph.add_edge(blocker_idx, dependent_idx, edge.clone());
        debug!(%dependent, %blocker, "added dependency");

        Ok(edge)
    }

    /// Remove the edge for `(dependent, blocker)`. Returns whether one existed.
    pub fn remove(&mut self, dependent: &ItemId, blocker: &ItemId) -> bool {
        let (Some(&b), Some(&d)) = (self.node_map.get(blocker), self.node_map.get(dependent))
        else {
            return false;
        };
        let Some(edge_idx) = self.graph.find_edge(b, d) else {
            return false;
        };

        self.graph.remove_edge(edge_idx);
        self.prune_if_isolated(b);
        self.prune_if_isolated(d);
        debug!(%dependent, %blocker, "removed dependency");
        true
    }

    #[must_use]
    pub fn contains(&self, dependent: &ItemId, blocker: &ItemId) -> bool {
        self.get(dependent, blocker).is_some()
    }

    #[must_use]
    pub fn get(&self, dependent: &ItemId, blocker: &ItemId) -> Option<&Edge> {
        let b = *self.node_map.get(blocker)?;
        let d = *self.node_map.get(dependent)?;
        let edge_idx = self.graph.find_edge(b, d)?;
        self.graph.edge_weight(edge_idx)
    }

    /// Items waiting directly on `blocker`.
    #[must_use]
    pub fn dependents_of(&self, blocker: &ItemId) -> BTreeSet<ItemId> {
        self.neighbors(blocker, petgraph::Direction::Outgoing)
    }

    /// Items `dependent` waits on directly.
    #[must_use]
    pub fn blockers_of(&self, dependent: &ItemId) -> BTreeSet<ItemId> {
        self.neighbors(dependent, petgraph::Direction::Incoming)
    }

    /// Number of items waiting directly on `blocker`.
    #[must_use]
    pub fn dependent_count(&self, blocker: &ItemId) -> usize {
        self.node_map.get(blocker).map_or(0, |&idx| {
            self.graph
                .neighbors_directed(idx, petgraph::Direction::Outgoing)
                .count()
        })
    }

    /// Edge records on one side of `item`, ordered by the other endpoint.
    #[must_use]
    pub fn edges_of(&self, item: &ItemId, direction: Direction) -> Vec<Edge> {
        let Some(&idx) = self.node_map.get(item) else {
            return Vec::new();
        };
        let pg_direction = match direction {
            Direction::Incoming => petgraph::Direction::Incoming,
            Direction::Outgoing => petgraph::Direction::Outgoing,
        };
        let mut edges: Vec<Edge> = self
            .graph
            .edges_directed(idx, pg_direction)
            .map(|e| e.weight().clone())
            .collect();
        edges.sort_by(|a, b| (&a.blocker, &a.dependent).cmp(&(&b.blocker, &b.dependent)));
        edges
    }

    /// Snapshot of every edge, ordered by `(dependent, blocker)`.
    #[must_use]
    pub fn edges(&self) -> Vec<Edge> {
        let mut edges: Vec<Edge> = self
            .graph
            .edge_indices()
            .filter_map(|e| self.graph.edge_weight(e).cloned())
            .collect();
        edges.sort_by(|a, b| (&a.dependent, &a.blocker).cmp(&(&b.dependent, &b.blocker)));
        edges
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.graph.edge_count() == 0
    }

    /// Every item that appears in at least one edge, in id order.
    #[must_use]
    pub fn items(&self) -> Vec<ItemId> {
        let mut items: Vec<ItemId> = self.node_map.keys().cloned().collect();
        items.sort();
        items
    }

    /// Add an edge with no duplicate or cycle check, for building graphs
    /// that `insert` would refuse.
    #[cfg(test)]
    pub(crate) fn insert_unchecked(&mut self, dependent: &ItemId, blocker: &ItemId) {
        let edge = Edge {
            dependent: dependent.clone(),
            blocker: blocker.clone(),
            kind: DEFAULT_EDGE_KIND.to_string(),
            created_by: None,
            created_at: Utc::now(),
        };
        let blocker_idx = self.ensure_node(blocker);
        let dependent_idx = self.ensure_node(dependent);
        self.graph.add_edge(blocker_idx, dependent_idx, edge);
    }

    /// Find a path `from → … → to` following "blocks" edges (from a blocker
    /// to the items that depend on it).
    ///
    /// Iterative DFS; the returned path includes both endpoints.
    #[must_use]
    pub fn path_between(&self, from: &ItemId, to: &ItemId) -> Option<Vec<ItemId>> {
        let &start = self.node_map.get(from)?;
        let &goal = self.node_map.get(to)?;

        let mut parent: HashMap<NodeIndex, NodeIndex> = HashMap::new();
        let mut seen: HashSet<NodeIndex> = HashSet::from([start]);
        let mut stack = vec![start];

        while let Some(node) = stack.pop() {
            if node == goal {
                let mut path = vec![node];
                let mut cur = node;
                while let Some(&prev) = parent.get(&cur) {
                    path.push(prev);
                    cur = prev;
                }
                path.reverse();
                return Some(
                    path.into_iter()
                        .filter_map(|idx| self.graph.node_weight(idx).cloned())
                        .collect(),
                );
            }
            for next in self
                .graph
                .neighbors_directed(node, petgraph::Direction::Outgoing)
            {
                if seen.insert(next) {
                    parent.insert(next, node);
                    stack.push(next);
                }
            }
        }

        None
    }

    fn neighbors(&self, item: &ItemId, direction: petgraph::Direction) -> BTreeSet<ItemId> {
        let Some(&idx) = self.node_map.get(item) else {
            return BTreeSet::new();
        };
        self.graph
            .neighbors_directed(idx, direction)
            .filter_map(|n| self.graph.node_weight(n).cloned())
            .collect()
    }

    fn ensure_node(&mut self, item: &ItemId) -> NodeIndex {
        if let Some(&idx) = self.node_map.get(item) {
            return idx;
        }
        let idx = self.graph.add_node(item.clone());
        self.node_map.insert(item.clone(), idx);
        idx
    }

    fn prune_if_isolated(&mut self, idx: NodeIndex) {
        if self.graph.neighbors_undirected(idx).next().is_some() {
            return;
        }
        if let Some(item) = self.graph.remove_node(idx) {
            self.node_map.remove(&item);
        }
    }
}
