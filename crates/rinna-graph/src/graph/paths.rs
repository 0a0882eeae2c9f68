//! Enumeration of independent source-to-sink chains.
//!
//! A source is an item that blocks something but waits on nothing; a sink
//! waits on something but blocks nothing. Every simple path from a source to
//! a sink is a chain of work that can proceed alongside the others. The
//! number of such paths can grow exponentially with the graph, so the walk
//! stops once `max_paths` have been collected.

use rinna_core::ItemId;
use tracing::debug;

use super::store::DependencyStore;

struct Frame {
    children: Vec<ItemId>,
    next: usize,
}

/// Up to `max_paths` source-to-sink paths, longest first.
///
/// Sources are visited in id order and children in id order, so the set of
/// paths kept under the cap is deterministic. Paths of equal length keep
/// their discovery order.
#[must_use]
pub fn parallel_paths(store: &DependencyStore, max_paths: usize) -> Vec<Vec<ItemId>> {
    let mut paths: Vec<Vec<ItemId>> = Vec::new();
    if max_paths == 0 {
        return paths;
    }

    let sources = store
        .items()
        .into_iter()
        .filter(|item| store.blockers_of(item).is_empty());

    'sources: for source in sources {
        let mut path = vec![source.clone()];
        let mut stack = vec![Frame {
            children: store.dependents_of(&source).into_iter().collect(),
            next: 0,
        }];

        while let Some(frame) = stack.last_mut() {
            if frame.children.is_empty() {
                paths.push(path.clone());
                if paths.len() >= max_paths {
                    debug!(max_paths, "parallel path limit reached");
                    break 'sources;
                }
                stack.pop();
                path.pop();
                continue;
            }

            if let Some(child) = frame.children.get(frame.next).cloned() {
                frame.next += 1;
                if path.contains(&child) {
                    continue;
                }
                let children = store.dependents_of(&child).into_iter().collect();
                path.push(child);
                stack.push(Frame { children, next: 0 });
            } else {
                stack.pop();
                path.pop();
            }
        }
    }

    paths.sort_by(|a, b| b.len().cmp(&a.len()));
    paths
}
