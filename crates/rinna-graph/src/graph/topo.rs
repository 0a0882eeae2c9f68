//! Topological ordering of an item set.
//!
//! Iterative three-colour DFS along "blocks" edges, emitting items in
//! reverse post-order so every blocker precedes the items waiting on it.
//! Edges leaving the requested set are ignored.
//!
//! The store rejects cycles on insertion, so a back edge here means the
//! invariant was broken somewhere else. It is logged and skipped rather
//! than followed; the traversal always terminates.

use std::collections::{HashMap, HashSet};

use rinna_core::ItemId;
use tracing::warn;

use super::store::DependencyStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Color {
    /// On the DFS stack.
    Gray,
    /// Finished.
    Black,
}

struct Frame {
    node: ItemId,
    children: Vec<ItemId>,
    next: usize,
}

/// Order `items` so that for every edge `(dependent, blocker)` inside the
/// set, `blocker` comes before `dependent`.
///
/// Traversal starts are taken in `items` order, which makes the output
/// deterministic for a given input order. Duplicate ids are emitted once.
#[must_use]
pub fn topological_order(store: &DependencyStore, items: &[ItemId]) -> Vec<ItemId> {
    let in_set: HashSet<&ItemId> = items.iter().collect();
    let children_of = |node: &ItemId| -> Vec<ItemId> {
        store
            .dependents_of(node)
            .into_iter()
            .filter(|d| in_set.contains(d))
            .collect()
    };

    let mut color: HashMap<ItemId, Color> = HashMap::with_capacity(items.len());
    let mut post_order: Vec<ItemId> = Vec::with_capacity(items.len());

    for start in items {
        if color.contains_key(start) {
            continue;
        }

        color.insert(start.clone(), Color::Gray);
        let mut stack = vec![Frame {
            node: start.clone(),
            children: children_of(start),
            next: 0,
        }];

        while let Some(frame) = stack.last_mut() {
            if let Some(child) = frame.children.get(frame.next).cloned() {
                frame.next += 1;
                match color.get(&child) {
                    None => {
                        color.insert(child.clone(), Color::Gray);
                        let children = children_of(&child);
                        stack.push(Frame {
                            node: child,
                            children,
                            next: 0,
                        });
                    }
                    Some(Color::Gray) => {
                        warn!(item = %child, "dependency cycle in analysed set; edge skipped");
                    }
                    Some(Color::Black) => {}
                }
            } else if let Some(done) = stack.pop() {
                color.insert(done.node.clone(), Color::Black);
                post_order.push(done.node);
            }
        }
    }

    post_order.reverse();
    post_order
}
