//! Manual block annotations written through the item accessor.
//!
//! Nothing here touches the dependency store: a "blocked" flag is a human
//! note about external impediments, independent of item-to-item edges.

use chrono::NaiveDate;
use rinna_core::model::block::unblocked_metadata;
use rinna_core::{BlockState, ItemId, WorkItem, WorkItemAccessor};
use tracing::debug;

use crate::error::GraphError;

/// Flag `id` as blocked on `on`, recording `reason` and optionally who or
/// what is blocking it.
///
/// # Errors
///
/// [`GraphError::UnknownItem`] if the accessor does not know `id`.
pub fn mark_as_blocked<A: WorkItemAccessor + ?Sized>(
    accessor: &A,
    id: &ItemId,
    reason: &str,
    blocked_by: Option<&str>,
    on: NaiveDate,
) -> Result<WorkItem, GraphError> {
    if accessor.find_by_id(id).is_none() {
        return Err(GraphError::UnknownItem(id.clone()));
    }

    let state = BlockState {
        reason: reason.to_string(),
        blocked_by: blocked_by.map(str::to_string),
        since: Some(on),
    };
    let updated = accessor
        .update_metadata(id, state.to_metadata())
        .ok_or_else(|| GraphError::UnknownItem(id.clone()))?;
    debug!(item = %id, reason, "marked blocked");
    Ok(updated)
}

/// Clear the block flag on `id` as of `on`.
///
/// The previous reason is left in place for history.
///
/// # Errors
///
/// [`GraphError::UnknownItem`] if the accessor does not know `id`.
pub fn mark_as_unblocked<A: WorkItemAccessor + ?Sized>(
    accessor: &A,
    id: &ItemId,
    on: NaiveDate,
) -> Result<WorkItem, GraphError> {
    if accessor.find_by_id(id).is_none() {
        return Err(GraphError::UnknownItem(id.clone()));
    }

    let updated = accessor
        .update_metadata(id, unblocked_metadata(on))
        .ok_or_else(|| GraphError::UnknownItem(id.clone()))?;
    debug!(item = %id, "marked unblocked");
    Ok(updated)
}
