//! Finish-date projection along a path of work items.

use chrono::{Days, NaiveDate};
use rinna_core::{ItemId, WorkItem};
use serde::{Deserialize, Serialize};

/// Projected finish date for one item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledItem {
    pub id: ItemId,
    pub finish: NaiveDate,
}

/// Walk `path` in order, accumulating each remaining item's estimate.
///
/// Completed items are skipped. Items without a usable `estimated_days`
/// value take `default_days`. Dates saturate at [`NaiveDate::MAX`].
#[must_use]
pub fn estimated_completion_dates(
    path: &[WorkItem],
    start: NaiveDate,
    default_days: u32,
) -> Vec<ScheduledItem> {
    let mut cursor = start;
    path.iter()
        .filter(|item| !item.state.is_complete())
        .map(|item| {
            let days = item.estimated_days().unwrap_or(default_days);
            cursor = cursor
                .checked_add_days(Days::new(u64::from(days)))
                .unwrap_or(NaiveDate::MAX);
            ScheduledItem {
                id: item.id.clone(),
                finish: cursor,
            }
        })
        .collect()
}
