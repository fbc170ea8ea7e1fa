//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks, patterns compiled once)
//!     → WaypointConfig (validated, immutable)
//!     → Application::from_config builds the router
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a new router
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{AppConfig, ObservabilityConfig, RouteConfig, RouterConfig, WaypointConfig};
pub use validation::ValidationError;
