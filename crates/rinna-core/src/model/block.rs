//! Manual "blocked" annotations carried in item metadata.
//!
//! Items owned by an external accessor only expose a string metadata map, so
//! the annotation is written as a handful of well-known keys and read back
//! through [`BlockState`].

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const BLOCKED_KEY: &str = "blocked";
pub const BLOCKED_REASON_KEY: &str = "blocked_reason";
pub const BLOCKED_BY_KEY: &str = "blocked_by";
pub const BLOCKED_DATE_KEY: &str = "blocked_date";
pub const UNBLOCKED_DATE_KEY: &str = "unblocked_date";
pub const ESTIMATED_DAYS_KEY: &str = "estimated_days";

/// A manual block recorded on an item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockState {
    pub reason: String,
    pub blocked_by: Option<String>,
    pub since: Option<NaiveDate>,
}

impl BlockState {
    /// Read the annotation from item metadata.
    ///
    /// `blocked` must be `"true"`; a missing reason reads as empty and an
    /// unparseable date as `None`.
    #[must_use]
    pub fn from_metadata(metadata: &BTreeMap<String, String>) -> Option<Self> {
        let flagged = metadata
            .get(BLOCKED_KEY)
            .is_some_and(|v| v.trim().eq_ignore_ascii_case("true"));
        if !flagged {
            return None;
        }

        Some(Self {
            reason: metadata.get(BLOCKED_REASON_KEY).cloned().unwrap_or_default(),
            blocked_by: metadata.get(BLOCKED_BY_KEY).cloned(),
            since: metadata
                .get(BLOCKED_DATE_KEY)
                .and_then(|raw| NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()),
        })
    }

    /// Metadata entries that record this block.
    #[must_use]
    pub fn to_metadata(&self) -> BTreeMap<String, String> {
        let mut entries = BTreeMap::new();
        entries.insert(BLOCKED_KEY.to_string(), "true".to_string());
        entries.insert(BLOCKED_REASON_KEY.to_string(), self.reason.clone());
        if let Some(by) = &self.blocked_by {
            entries.insert(BLOCKED_BY_KEY.to_string(), by.clone());
        }
        if let Some(since) = self.since {
            entries.insert(BLOCKED_DATE_KEY.to_string(), since.to_string());
        }
        entries
    }
}

/// Metadata entries that clear a block as of `on`.
#[must_use]
pub fn unblocked_metadata(on: NaiveDate) -> BTreeMap<String, String> {
    let mut entries = BTreeMap::new();
    entries.insert(BLOCKED_KEY.to_string(), "false".to_string());
    entries.insert(UNBLOCKED_DATE_KEY.to_string(), on.to_string());
    entries
}
