//! Application subsystem.
//!
//! # Data Flow
//! ```text
//! Request (path)
//!     → Router::matches (ordered candidates)
//!     → Dispatcher::resolve (context + handler per candidate)
//!     → Controller (Response, or skip / deny)
//!     → exhausted: 403 if denied, 301 if the slash-toggled path
//!       matches, else 404
//! ```
//!
//! # Design Decisions
//! - Controllers are plain closures behind `Arc`
//! - Controller failures map to statuses, never panics
//! - Fallback policy is driven by `AppConfig`

pub mod application;
pub mod response;

pub use application::{controller, Application, Controller, HandlerError, Invocation, Request};
pub use response::Response;
