#![forbid(unsafe_code)]
//! rinna-graph library.
//!
//! Dependency tracking between work items and the analyses built on it:
//! topological ordering, critical path, blocking items, delay impact and
//! manual block annotations. [`CriticalPathService`] is the facade; the
//! [`graph`] module exposes the underlying algorithms for callers that
//! manage their own store.
//!
//! # Conventions
//!
//! - **Errors**: [`GraphError`] for every fallible operation.
//! - **Logging**: `tracing` spans on the analyses, `debug!` for edge changes.

pub mod block_state;
pub mod error;
pub mod graph;
pub mod schedule;
pub mod service;

pub use error::GraphError;
pub use graph::{CriticalPath, DependencyStore, Direction, Edge};
pub use schedule::ScheduledItem;
pub use service::CriticalPathService;
