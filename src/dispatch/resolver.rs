//! Contract between routes and the objects a wildcard remainder names.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::dispatch::hierarchy::TypeTag;
use crate::pattern::Params;

/// Errors raised by a [`Traverser`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TraversalError {
    /// No resource at `segment`.
    #[error("no resource at segment `{0}`")]
    Missing(String),

    /// A resource on the way to the root has no name.
    #[error("resource has no location")]
    Unlocated,

    #[error("`{0}` is not supported by this traverser")]
    Unsupported(&'static str),

    #[error("traversal failed: {0}")]
    Failed(String),
}

/// An application object reachable by traversal.
///
/// Only `type_tag` and `as_any` are required; tree-shaped resources also
/// expose their children and location.
pub trait Resource: Any + Send + Sync + fmt::Debug {
    /// Declared type, used to pick the route handler.
    fn type_tag(&self) -> TypeTag;

    fn as_any(&self) -> &dyn Any;

    fn child(&self, _segment: &str) -> Option<Arc<dyn Resource>> {
        None
    }

    /// Segment under which the parent holds this resource.
    fn name(&self) -> Option<&str> {
        None
    }

    fn parent(&self) -> Option<Arc<dyn Resource>> {
        None
    }
}

impl dyn Resource {
    pub fn downcast_ref<T: Resource>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }
}

/// Turns a wildcard remainder into a resource, and back.
pub trait Traverser: Send + Sync + fmt::Debug {
    /// Resolve `remainder` to a resource.
    ///
    /// Named captures are passed mutably: a traverser removes the ones it
    /// consumed so they are not handed to the handler again.
    fn resolve(
        &self,
        remainder: &[String],
        params: &mut Params,
    ) -> Result<Arc<dyn Resource>, TraversalError>;

    /// Segments locating `context`, for path generation.
    fn reverse(&self, _context: &dyn Resource) -> Result<Vec<String>, TraversalError> {
        Err(TraversalError::Unsupported("reverse"))
    }
}
