use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::{fmt, str::FromStr};

use super::block::BlockState;

/// Opaque work-item identifier.
///
/// The engine never interprets the contents; ordering exists only so that
/// identifier sets can be reported deterministically.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ItemId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// The kinds of work item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Feature,
    Bug,
    Chore,
    Goal,
}

impl ItemKind {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Feature => "feature",
            Self::Bug => "bug",
            Self::Chore => "chore",
            Self::Goal => "goal",
        }
    }
}

/// Priority levels, ordered `Low < Medium < High < Critical`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
    Critical,
}

impl Default for Priority {
    fn default() -> Self {
        Self::Medium
    }
}

impl Priority {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

/// Workflow states in lifecycle order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WorkflowState {
    Found,
    Triaged,
    ToDo,
    InProgress,
    InTest,
    Done,
    Released,
}

impl Default for WorkflowState {
    fn default() -> Self {
        Self::ToDo
    }
}

impl WorkflowState {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Found => "found",
            Self::Triaged => "triaged",
            Self::ToDo => "to-do",
            Self::InProgress => "in-progress",
            Self::InTest => "in-test",
            Self::Done => "done",
            Self::Released => "released",
        }
    }

    /// `true` for `done` and `released`: work that no longer holds anything up.
    #[must_use]
    pub const fn is_complete(self) -> bool {
        matches!(self, Self::Done | Self::Released)
    }
}

/// A work item as supplied by the item accessor.
///
/// The engine only reads `priority`, `state` and `metadata`; the remaining
/// fields are carried so results can be handed back to callers whole.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkItem {
    pub id: ItemId,
    pub title: String,
    pub kind: ItemKind,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub state: WorkflowState,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

impl WorkItem {
    /// A `feature` at medium priority in `to-do` with no metadata.
    #[must_use]
    pub fn new(id: impl Into<ItemId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            kind: ItemKind::Feature,
            priority: Priority::default(),
            state: WorkflowState::default(),
            metadata: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_kind(mut self, kind: ItemKind) -> Self {
        self.kind = kind;
        self
    }

    #[must_use]
    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    #[must_use]
    pub fn with_state(mut self, state: WorkflowState) -> Self {
        self.state = state;
        self
    }

    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Typed view of the `blocked*` metadata keys.
    ///
    /// Returns `None` unless `blocked` is `"true"` (case-insensitive).
    #[must_use]
    pub fn block_state(&self) -> Option<BlockState> {
        BlockState::from_metadata(&self.metadata)
    }

    #[must_use]
    pub fn is_blocked(&self) -> bool {
        self.block_state().is_some()
    }

    /// Estimated effort in days from the `estimated_days` metadata key.
    ///
    /// Missing or malformed values yield `None`.
    #[must_use]
    pub fn estimated_days(&self) -> Option<u32> {
        self.metadata
            .get(super::block::ESTIMATED_DAYS_KEY)
            .and_then(|raw| raw.trim().parse().ok())
    }
}

/// Error returned when parsing an enum value from text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseEnumError {
    pub expected: &'static str,
    pub got: String,
}

impl fmt::Display for ParseEnumError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid {}: '{}'", self.expected, self.got)
    }
}

impl std::error::Error for ParseEnumError {}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for WorkflowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn normalize(input: &str) -> String {
    input.trim().to_ascii_lowercase().replace('_', "-")
}

impl FromStr for ItemKind {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "feature" => Ok(Self::Feature),
            "bug" => Ok(Self::Bug),
            "chore" => Ok(Self::Chore),
            "goal" => Ok(Self::Goal),
            _ => Err(ParseEnumError {
                expected: "kind",
                got: s.to_string(),
            }),
        }
    }
}

impl FromStr for Priority {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "critical" => Ok(Self::Critical),
            _ => Err(ParseEnumError {
                expected: "priority",
                got: s.to_string(),
            }),
        }
    }
}

impl FromStr for WorkflowState {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "found" => Ok(Self::Found),
            "triaged" => Ok(Self::Triaged),
            "to-do" | "todo" => Ok(Self::ToDo),
            "in-progress" => Ok(Self::InProgress),
            "in-test" => Ok(Self::InTest),
            "done" => Ok(Self::Done),
            "released" => Ok(Self::Released),
            _ => Err(ParseEnumError {
                expected: "workflow state",
                got: s.to_string(),
            }),
        }
    }
}
