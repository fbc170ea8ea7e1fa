//! Per-route handler registry keyed by resource type.

use std::collections::HashMap;
use std::fmt;

use crate::dispatch::hierarchy::{TypeHierarchy, TypeTag};

/// Handlers of one route, keyed by the type they accept.
///
/// The universal handler lives under [`TypeTag::ANY`].
#[derive(Clone)]
pub struct ControllerRegistry<H> {
    handlers: HashMap<TypeTag, H>,
}

impl<H> Default for ControllerRegistry<H> {
    fn default() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }
}

impl<H> fmt::Debug for ControllerRegistry<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut tags: Vec<_> = self.handlers.keys().collect();
        tags.sort();
        f.debug_struct("ControllerRegistry").field("types", &tags).finish()
    }
}

impl<H> ControllerRegistry<H> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for `tag`, returning the one it replaces.
    pub fn register(&mut self, tag: TypeTag, handler: H) -> Option<H> {
        self.handlers.insert(tag, handler)
    }

    pub fn register_universal(&mut self, handler: H) -> Option<H> {
        self.register(TypeTag::ANY, handler)
    }

    pub fn get(&self, tag: TypeTag) -> Option<&H> {
        self.handlers.get(&tag)
    }

    pub fn universal(&self) -> Option<&H> {
        self.get(TypeTag::ANY)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Most specific handler for a context of type `tag`.
    ///
    /// Walks the ancestor order of `tag`; an undeclared tag only sees the
    /// universal handler.
    pub fn lookup(&self, hierarchy: &TypeHierarchy, tag: TypeTag) -> Option<&H> {
        let ancestors = hierarchy.ancestors(tag);
        if ancestors.is_empty() {
            return self.universal();
        }
        ancestors.iter().find_map(|t| self.handlers.get(t))
    }
}
