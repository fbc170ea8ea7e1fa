//! Dispatch subsystem.
//!
//! # Data Flow
//! ```text
//! Match (route, remainder, params)
//!     → resolver.rs (Traverser: remainder → Resource)
//!     → traversal.rs (tree walk + typed events)
//!     → hierarchy.rs (ancestor order of the resource type)
//!     → registry.rs (most specific handler on the route)
//!     → dispatcher.rs (Bound handler, or advance to next candidate)
//! ```
//!
//! # Design Decisions
//! - Types are declared up front; ancestor lists are computed once
//! - Handler lookup is a walk over a precomputed slice, no reflection
//! - Resolution failures are values, never panics

pub mod dispatcher;
pub mod hierarchy;
pub mod registry;
pub mod resolver;
pub mod traversal;

pub use dispatcher::{Bound, DispatchError, DispatchResult, Dispatcher};
pub use hierarchy::{HierarchyError, TypeHierarchy, TypeTag};
pub use registry::ControllerRegistry;
pub use resolver::{Resource, TraversalError, Traverser};
pub use traversal::{TraversalEvents, TreeTraverser};
