use rinna_core::{ErrorCode, ItemId};

/// Errors surfaced by the dependency engine.
///
/// Each variant is reported distinctly so callers can tell a bad reference
/// from an edge that would corrupt the graph from a malformed query.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    /// An identifier did not resolve through the item accessor.
    #[error("work item not found: {0}")]
    UnknownItem(ItemId),

    /// Inserting `dependent -> blocker` would close a cycle.
    ///
    /// `path` starts at `dependent`, follows existing "blocks" edges to
    /// `blocker`, and ends at `dependent` again through the rejected edge.
    #[error(
        "dependency {dependent} -> {blocker} would create a cycle: {}",
        render_path(path)
    )]
    CycleDetected {
        dependent: ItemId,
        blocker: ItemId,
        path: Vec<ItemId>,
    },

    /// A direction selector other than `incoming` / `outgoing`.
    #[error("invalid dependency direction '{0}': expected 'incoming' or 'outgoing'")]
    InvalidDirection(String),
}

impl GraphError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::UnknownItem(_) => ErrorCode::ItemNotFound,
            Self::CycleDetected { .. } => ErrorCode::CycleDetected,
            Self::InvalidDirection(_) => ErrorCode::InvalidDirection,
        }
    }

    #[must_use]
    pub const fn hint(&self) -> Option<&'static str> {
        self.code().hint()
    }
}

fn render_path(path: &[ItemId]) -> String {
    path.iter()
        .map(ItemId::as_str)
        .collect::<Vec<_>>()
        .join(" -> ")
}
