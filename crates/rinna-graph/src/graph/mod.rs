//! Dependency graph and the analyses that run over it.
//!
//! ## Submodules
//!
//! - [`store`]: the edge set, with duplicate, self-loop and cycle checks on
//!   insertion.
//! - [`topo`]: topological ordering of an item set.
//! - [`critical_path`]: weighted longest path.
//! - [`blocking`]: incomplete items holding up several others.
//! - [`impact`]: transitive dependents of a delayed item.
//! - [`paths`]: bounded enumeration of source-to-sink chains.
//!
//! Every analysis takes a `&DependencyStore` plus the item set to analyse,
//! so callers decide which items are in scope and which lock guard the
//! store is read through.

pub mod blocking;
pub mod critical_path;
pub mod impact;
pub mod paths;
pub mod store;
pub mod topo;

pub use blocking::{blocked_on_path, find_blocking_items};
pub use critical_path::{CriticalPath, compute_critical_path, compute_critical_path_to, item_weight};
pub use impact::transitive_dependents;
pub use paths::parallel_paths;
pub use store::{DEFAULT_EDGE_KIND, DependencyStore, Direction, Edge};
pub use topo::topological_order;
