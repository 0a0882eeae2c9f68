//! Forward reachability: everything that waits, directly or not, on an item.

use std::collections::{HashSet, VecDeque};

use rinna_core::ItemId;

use super::store::DependencyStore;

/// Every item reachable from `item` through one or more dependency edges,
/// in breadth-first discovery order. `item` itself is never included.
#[must_use]
pub fn transitive_dependents(store: &DependencyStore, item: &ItemId) -> Vec<ItemId> {
    let mut seen: HashSet<ItemId> = HashSet::from([item.clone()]);
    let mut queue: VecDeque<ItemId> = VecDeque::from([item.clone()]);
    let mut reached = Vec::new();

    while let Some(current) = queue.pop_front() {
        for dependent in store.dependents_of(&current) {
            if seen.insert(dependent.clone()) {
                reached.push(dependent.clone());
                queue.push_back(dependent);
            }
        }
    }

    reached
}
