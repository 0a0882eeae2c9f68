#![forbid(unsafe_code)]
//! rinna-core library.
//!
//! Shared building blocks for the dependency engine: the work-item model,
//! machine-readable error codes, engine configuration and the
//! [`accessor::WorkItemAccessor`] port through which items are read.
//!
//! # Conventions
//!
//! - **Errors**: stable [`ErrorCode`]s shared with downstream crates,
//!   `anyhow::Result` for configuration I/O.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`, `trace!`).

pub mod accessor;
pub mod config;
pub mod error;
pub mod model;

pub use accessor::{InMemoryItemStore, WorkItemAccessor};
pub use config::EngineConfig;
pub use error::ErrorCode;
pub use model::{BlockState, ItemId, ItemKind, Priority, WorkItem, WorkflowState};
