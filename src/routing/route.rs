//! A declared route: compiled pattern, handlers, traverser.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::dispatch::dispatcher::{DispatchError, DispatchResult};
use crate::dispatch::hierarchy::{TypeHierarchy, TypeTag};
use crate::dispatch::registry::ControllerRegistry;
use crate::dispatch::resolver::{Resource, TraversalError, Traverser};
use crate::pattern::{CompiledPattern, GenerateError, Params};

/// Errors raised while generating a route's path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    #[error("no route named `{0}`")]
    UnknownRoute(String),

    #[error("route `{pattern}` cannot {operation} without a traverser")]
    Unsupported {
        pattern: String,
        operation: &'static str,
    },

    #[error("route `{0}` has no wildcard to place a resource location in")]
    NoWildcard(String),

    #[error(transparent)]
    Traversal(#[from] TraversalError),

    #[error(transparent)]
    Generate(#[from] GenerateError),
}

/// One entry of a [`Router`](crate::routing::Router).
pub struct Route<H> {
    name: Option<String>,
    pattern: CompiledPattern,
    controllers: ControllerRegistry<H>,
    traverser: Option<Arc<dyn Traverser>>,
}

impl<H> fmt::Debug for Route<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("name", &self.name)
            .field("pattern", &self.pattern.source())
            .field("controllers", &self.controllers)
            .field("traverser", &self.traverser)
            .finish()
    }
}

impl<H> Route<H> {
    pub fn new(pattern: CompiledPattern) -> Self {
        Self {
            name: None,
            pattern,
            controllers: ControllerRegistry::new(),
            traverser: None,
        }
    }

    pub fn named(&mut self, name: impl Into<String>) -> &mut Self {
        self.name = Some(name.into());
        self
    }

    /// Handler used when no type-specific handler applies.
    pub fn handle(&mut self, handler: H) -> &mut Self {
        self.controllers.register_universal(handler);
        self
    }

    /// Handler for resolved contexts of type `tag` and its subtypes.
    pub fn handle_type(&mut self, tag: TypeTag, handler: H) -> &mut Self {
        self.controllers.register(tag, handler);
        self
    }

    pub fn traverse_with(&mut self, traverser: Arc<dyn Traverser>) -> &mut Self {
        self.traverser = Some(traverser);
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The pattern as written.
    pub fn pattern(&self) -> &str {
        self.pattern.source()
    }

    pub fn compiled(&self) -> &CompiledPattern {
        &self.pattern
    }

    pub fn controllers(&self) -> &ControllerRegistry<H> {
        &self.controllers
    }

    pub fn traverser(&self) -> Option<&Arc<dyn Traverser>> {
        self.traverser.as_ref()
    }

    /// Most specific handler for a context of type `tag`.
    pub fn bind(&self, hierarchy: &TypeHierarchy, tag: TypeTag) -> Option<&H> {
        self.controllers.lookup(hierarchy, tag)
    }

    pub fn captures(&self, path: &str) -> Option<Params> {
        self.pattern.captures(path)
    }

    /// Generate this route's path from `params`.
    pub fn path(&self, params: &Params) -> Result<String, RouteError> {
        Ok(self.pattern.generate(params)?)
    }

    /// Generate the path locating `context`, placing the segments the
    /// traverser reports into the wildcard.
    pub fn path_for(&self, context: &dyn Resource, params: &Params) -> Result<String, RouteError> {
        let traverser = self.traverser.as_ref().ok_or_else(|| RouteError::Unsupported {
            pattern: self.pattern().to_string(),
            operation: "reverse",
        })?;
        let key = self
            .pattern
            .wildcard_key()
            .ok_or_else(|| RouteError::NoWildcard(self.pattern().to_string()))?;

        let segments = traverser.reverse(context)?;
        let mut params = params.clone();
        params.insert(key, segments);
        self.path(&params)
    }

    /// Resolve a wildcard remainder through the traverser.
    pub fn resolve(&self, remainder: &[String], params: &mut Params) -> DispatchResult<Arc<dyn Resource>> {
        let traverser = self
            .traverser
            .as_ref()
            .ok_or_else(|| DispatchError::ResolutionUnsupported {
                pattern: self.pattern().to_string(),
            })?;
        traverser
            .resolve(remainder, params)
            .map_err(|source| DispatchError::Traversal {
                pattern: self.pattern().to_string(),
                source,
            })
    }
}
