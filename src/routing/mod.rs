//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Registration:
//!     pattern string
//!     → PatternCompiler (eager, syntax errors surface here)
//!     → Route (name, handlers, traverser)
//!     → appended to Router in registration order
//!
//! Lookup:
//!     path
//!     → router.rs (combined fast reject, then per-route evaluation)
//!     → matcher.rs (Match: route + remainder + params)
//!     → lazy sequence, registration order
//! ```
//!
//! # Design Decisions
//! - Registration order is priority; no reordering
//! - Every matching route is a candidate, not just the first
//! - Deterministic: same table and path always yield the same sequence

pub mod matcher;
pub mod route;
pub mod router;

pub use matcher::Match;
pub use route::{Route, RouteError};
pub use router::{Matches, Router};
