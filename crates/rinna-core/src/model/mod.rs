pub mod block;
pub mod item;

pub use block::BlockState;
pub use item::{ItemId, ItemKind, ParseEnumError, Priority, WorkItem, WorkflowState};
