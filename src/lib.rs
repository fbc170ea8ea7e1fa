//! Path routing and type-directed dispatch.
//!
//! Patterns such as `/docs/*/:name` compile into matchers and generators.
//! A [`Router`] yields every matching route for a path, in registration
//! order; a [`Dispatcher`] resolves each candidate's wildcard remainder to
//! a typed resource and picks the most specific handler for it.

pub mod app;
pub mod config;
pub mod dispatch;
pub mod observability;
pub mod pattern;
pub mod routing;

pub use app::{Application, Request, Response};
pub use config::WaypointConfig;
pub use dispatch::{Dispatcher, Resource, Traverser, TypeHierarchy, TypeTag};
pub use pattern::{CompiledPattern, ParamValue, Params, PatternCompiler};
pub use routing::{Match, Route, Router};
