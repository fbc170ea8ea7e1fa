//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check route names are present and unique
//! - Compile every pattern with the configured compiler
//! - Validate the log level
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: WaypointConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;

use thiserror::Error;

use crate::config::schema::WaypointConfig;
use crate::pattern::PatternSyntaxError;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// A single semantic problem in a config.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("route #{index} has an empty name")]
    EmptyName { index: usize },

    #[error("route name `{0}` is used more than once")]
    DuplicateName(String),

    #[error("route `{name}`: {source}")]
    Pattern {
        name: String,
        #[source]
        source: PatternSyntaxError,
    },

    #[error("unknown log level `{0}`")]
    LogLevel(String),
}

/// Validate the entire configuration.
pub fn validate_config(config: &WaypointConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let mut seen = HashSet::new();
    let compiler = config.router.compiler();

    for (index, route) in config.routes.iter().enumerate() {
        if route.name.trim().is_empty() {
            errors.push(ValidationError::EmptyName { index });
        } else if !seen.insert(route.name.as_str()) {
            errors.push(ValidationError::DuplicateName(route.name.clone()));
        }

        if let Err(source) = compiler.compile(&route.pattern) {
            errors.push(ValidationError::Pattern {
                name: route.name.clone(),
                source,
            });
        }
    }

    let level = config.observability.log_level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ValidationError::LogLevel(config.observability.log_level.clone()));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::RouteConfig;

    fn route(name: &str, pattern: &str) -> RouteConfig {
        RouteConfig {
            name: name.to_string(),
            pattern: pattern.to_string(),
            body: String::new(),
        }
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&WaypointConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_every_error() {
        let mut config = WaypointConfig::default();
        config.routes = vec![
            route("home", "/"),
            route("home", "/index"),
            route("", "/empty"),
            route("bad", "/*a/*b"),
        ];
        config.observability.log_level = "loud".into();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 4);
        assert_eq!(errors[0], ValidationError::DuplicateName("home".into()));
        assert_eq!(errors[1], ValidationError::EmptyName { index: 2 });
        assert!(matches!(errors[2], ValidationError::Pattern { ref name, .. } if name == "bad"));
        assert_eq!(errors[3], ValidationError::LogLevel("loud".into()));
    }

    #[test]
    fn test_zero_cache_capacity_allowed() {
        let mut config = WaypointConfig::default();
        config.router.encoding_cache_capacity = 0;
        config.routes = vec![route("home", "/")];
        assert!(validate_config(&config).is_ok());
    }
}
