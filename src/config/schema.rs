//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::pattern::compiler::DEFAULT_CACHE_CAPACITY;
use crate::pattern::{CompileOptions, PatternCompiler};

/// Root configuration for a routing table.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct WaypointConfig {
    /// Pattern compilation settings.
    pub router: RouterConfig,

    /// Request handling policy.
    pub application: AppConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Routes, in priority order.
    pub routes: Vec<RouteConfig>,
}

/// Pattern compiler configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Require `:name` segments to be non-empty.
    pub strict_segments: bool,

    /// Entries kept by the encoding cache (0 disables it).
    pub encoding_cache_capacity: usize,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            strict_segments: false,
            encoding_cache_capacity: DEFAULT_CACHE_CAPACITY,
        }
    }
}

impl RouterConfig {
    pub fn compiler(&self) -> PatternCompiler {
        PatternCompiler::new(
            CompileOptions {
                strict_segments: self.strict_segments,
            },
            self.encoding_cache_capacity,
        )
    }
}

/// Request handling policy.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    /// Try later candidates when a handler denies access.
    pub retry_on_forbidden: bool,

    /// Redirect to the path with its trailing slash toggled when only that
    /// form matches.
    pub redirect_trailing_slash: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            retry_on_forbidden: true,
            redirect_trailing_slash: true,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// A route served with a fixed body.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RouteConfig {
    /// Route identifier for path generation, logging and metrics.
    pub name: String,

    /// Path pattern.
    pub pattern: String,

    /// Response body. `{name}` placeholders are replaced by captures.
    #[serde(default)]
    pub body: String,
}
