//! Tree traversal over [`Resource`] children.
//!
//! # Responsibilities
//! - Produce the root for a request (root factory may consume captures)
//! - Walk one child per remainder segment
//! - Fire typed traversal events after each step
//! - Rebuild the segment list of a resource from its parents
//!
//! # Design Decisions
//! - Event handlers are looked up along the ancestor order of the
//!   reached resource; all of them fire, most-derived first
//! - A missing child fails the whole traversal; the router then moves on
//!   to the next candidate

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::dispatch::hierarchy::{TypeHierarchy, TypeTag};
use crate::dispatch::resolver::{Resource, TraversalError, Traverser};
use crate::pattern::Params;

/// Callback fired when traversal reaches a resource through `segment`.
pub type EventHandler = Arc<dyn Fn(&dyn Resource, &str) + Send + Sync>;

/// Produces the traversal root, optionally consuming captures.
pub type RootFactory =
    Arc<dyn Fn(&mut Params) -> Result<Arc<dyn Resource>, TraversalError> + Send + Sync>;

/// Subscribers to traversal steps, keyed by resource type.
pub struct TraversalEvents {
    hierarchy: Arc<TypeHierarchy>,
    handlers: HashMap<TypeTag, Vec<EventHandler>>,
}

impl fmt::Debug for TraversalEvents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TraversalEvents")
            .field("types", &self.handlers.len())
            .finish()
    }
}

impl TraversalEvents {
    pub fn new(hierarchy: Arc<TypeHierarchy>) -> Self {
        Self {
            hierarchy,
            handlers: HashMap::new(),
        }
    }

    /// Fire `handler` for resources of type `tag` and its subtypes.
    pub fn subscribe<F>(&mut self, tag: TypeTag, handler: F)
    where
        F: Fn(&dyn Resource, &str) + Send + Sync + 'static,
    {
        self.handlers.entry(tag).or_default().push(Arc::new(handler));
    }

    /// Fire every handler matching `resource`. Returns how many ran.
    pub fn notify(&self, resource: &dyn Resource, segment: &str) -> usize {
        let mut fired = 0;
        for tag in self.hierarchy.ancestors(resource.type_tag()) {
            for handler in self.handlers.get(tag).into_iter().flatten() {
                handler(resource, segment);
                fired += 1;
            }
        }
        fired
    }
}

/// [`Traverser`] walking [`Resource::child`] from a root.
#[derive(Clone)]
pub struct TreeTraverser {
    root: RootFactory,
    events: Option<Arc<TraversalEvents>>,
}

impl fmt::Debug for TreeTraverser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TreeTraverser")
            .field("events", &self.events)
            .finish_non_exhaustive()
    }
}

impl TreeTraverser {
    /// Traverse from roots built by `factory`.
    pub fn new<F>(factory: F) -> Self
    where
        F: Fn(&mut Params) -> Result<Arc<dyn Resource>, TraversalError> + Send + Sync + 'static,
    {
        Self {
            root: Arc::new(factory),
            events: None,
        }
    }

    /// Traverse from one shared root.
    pub fn with_root(root: Arc<dyn Resource>) -> Self {
        Self::new(move |_| Ok(root.clone()))
    }

    pub fn with_events(mut self, events: Arc<TraversalEvents>) -> Self {
        self.events = Some(events);
        self
    }
}

impl Traverser for TreeTraverser {
    fn resolve(
        &self,
        remainder: &[String],
        params: &mut Params,
    ) -> Result<Arc<dyn Resource>, TraversalError> {
        let mut context = (self.root)(params)?;
        for segment in remainder {
            context = context
                .child(segment)
                .ok_or_else(|| TraversalError::Missing(segment.clone()))?;
            if let Some(events) = &self.events {
                events.notify(context.as_ref(), segment);
            }
        }
        Ok(context)
    }

    fn reverse(&self, context: &dyn Resource) -> Result<Vec<String>, TraversalError> {
        let mut segments = Vec::new();
        let mut name = context.name().map(str::to_string);
        let mut parent = context.parent();
        while let Some(node) = parent {
            segments.push(name.ok_or(TraversalError::Unlocated)?);
            name = node.name().map(str::to_string);
            parent = node.parent();
        }
        segments.reverse();
        Ok(segments)
    }
}
