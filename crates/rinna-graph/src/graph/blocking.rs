//! Items that hold up more than one other item.

use rinna_core::WorkItem;

use super::critical_path::CriticalPath;
use super::store::DependencyStore;

/// Incomplete items with at least two direct dependents, highest priority
/// first.
///
/// Items of equal priority keep their order from `items`.
#[must_use]
pub fn find_blocking_items(store: &DependencyStore, items: Vec<WorkItem>) -> Vec<WorkItem> {
    let mut blocking: Vec<WorkItem> = items
        .into_iter()
        .filter(|item| !item.state.is_complete() && store.dependent_count(&item.id) > 1)
        .collect();
    blocking.sort_by(|a, b| b.priority.cmp(&a.priority));
    blocking
}

/// Items on `path` that carry a manual block annotation.
#[must_use]
pub fn blocked_on_path(path: &CriticalPath) -> Vec<WorkItem> {
    path.items
        .iter()
        .filter(|item| item.is_blocked())
        .cloned()
        .collect()
}
