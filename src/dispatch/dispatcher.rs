//! Handler resolution for router candidates.
//!
//! # Responsibilities
//! - Resolve the traversal remainder of a match to a context
//! - Pick the most specific handler for the context's type
//! - Bind context and remaining captures for invocation
//!
//! # Design Decisions
//! - Per-candidate failures are values; the caller advances to the next
//!   candidate unless the error says otherwise
//! - A missing traverser is a configuration error and is never retried

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::dispatch::hierarchy::{TypeHierarchy, TypeTag};
use crate::dispatch::resolver::{Resource, TraversalError};
use crate::observability::metrics;
use crate::pattern::Params;
use crate::routing::{Match, Router};

/// Why a candidate could not be dispatched.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The match has a traversal remainder but the route has no traverser.
    #[error("route `{pattern}` has a traversal remainder but no traverser")]
    ResolutionUnsupported { pattern: String },

    #[error("traversal failed for route `{pattern}`: {source}")]
    Traversal {
        pattern: String,
        #[source]
        source: TraversalError,
    },

    #[error("route `{pattern}` has no handler for type `{type_name}`")]
    NoHandler { pattern: String, type_name: String },

    #[error("no route found for `{path}`")]
    NotFound { path: String },
}

impl DispatchError {
    /// Whether the next candidate should be tried.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Traversal { .. } | Self::NoHandler { .. })
    }

    /// Short label for logs and metrics.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::ResolutionUnsupported { .. } => "unsupported",
            Self::Traversal { .. } => "traversal",
            Self::NoHandler { .. } => "no_handler",
            Self::NotFound { .. } => "not_found",
        }
    }
}

/// Result type for dispatch operations.
pub type DispatchResult<T> = Result<T, DispatchError>;

/// A handler with everything it is invoked with.
pub struct Bound<H> {
    pub handler: H,
    /// Resolved traversal context, if the route traversed.
    pub context: Option<Arc<dyn Resource>>,
    /// Named captures left after traversal.
    pub params: Params,
    /// Pattern of the route that produced this binding.
    pub pattern: String,
}

impl<H> fmt::Debug for Bound<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bound")
            .field("pattern", &self.pattern)
            .field("context", &self.context)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

/// Resolves matches against one type hierarchy.
#[derive(Debug, Clone, Default)]
pub struct Dispatcher {
    hierarchy: Arc<TypeHierarchy>,
}

impl Dispatcher {
    pub fn new(hierarchy: Arc<TypeHierarchy>) -> Self {
        Self { hierarchy }
    }

    pub fn hierarchy(&self) -> &Arc<TypeHierarchy> {
        &self.hierarchy
    }

    /// Bind the handler for one candidate.
    pub fn resolve<H: Clone>(&self, candidate: Match<'_, H>) -> DispatchResult<Bound<H>> {
        let (route, remainder, mut params) = candidate.into_parts();

        let (context, tag) = match remainder {
            Some(remainder) => {
                let context = route.resolve(&remainder, &mut params)?;
                let tag = context.type_tag();
                (Some(context), tag)
            }
            None => (None, TypeTag::ANY),
        };

        let handler = route
            .bind(&self.hierarchy, tag)
            .cloned()
            .ok_or_else(|| DispatchError::NoHandler {
                pattern: route.pattern().to_string(),
                type_name: self.hierarchy.name(tag).unwrap_or("<undeclared>").to_string(),
            })?;

        Ok(Bound {
            handler,
            context,
            params,
            pattern: route.pattern().to_string(),
        })
    }

    /// Bind the first candidate for `path` that resolves.
    ///
    /// Retryable failures advance to the next candidate; exhaustion is
    /// [`DispatchError::NotFound`].
    pub fn dispatch<H: Clone>(&self, router: &Router<H>, path: &str) -> DispatchResult<Bound<H>> {
        for candidate in router.matches(path) {
            match self.resolve(candidate) {
                Ok(bound) => return Ok(bound),
                Err(err) if err.is_retryable() => {
                    tracing::debug!(path, error = %err, "Candidate skipped");
                    metrics::record_candidate_skipped(err.reason());
                }
                Err(err) => {
                    tracing::error!(path, error = %err, "Dispatch failed");
                    return Err(err);
                }
            }
        }
        Err(DispatchError::NotFound {
            path: path.to_string(),
        })
    }
}
