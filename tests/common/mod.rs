//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::any::Any;
use std::collections::BTreeMap;
use std::sync::{Arc, Weak};

use waypoint::dispatch::{Resource, TypeHierarchy, TypeTag};

/// Types of the catalog fixture.
pub struct Catalog {
    pub hierarchy: Arc<TypeHierarchy>,
    pub folder: TypeTag,
    pub document: TypeTag,
    pub image: TypeTag,
}

/// `Folder`, `Document` and `Image: Document`.
pub fn catalog() -> Catalog {
    let mut hierarchy = TypeHierarchy::new();
    let folder = hierarchy.declare("Folder", &[]).unwrap();
    let document = hierarchy.declare("Document", &[]).unwrap();
    let image = hierarchy.declare("Image", &[document]).unwrap();
    Catalog {
        hierarchy: Arc::new(hierarchy),
        folder,
        document,
        image,
    }
}

/// Tree node built once and then shared read-only.
#[derive(Debug)]
pub struct Node {
    pub tag: TypeTag,
    pub name: Option<String>,
    parent: Weak<Node>,
    children: BTreeMap<String, Arc<Node>>,
}

impl Resource for Node {
    fn type_tag(&self) -> TypeTag {
        self.tag
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn child(&self, segment: &str) -> Option<Arc<dyn Resource>> {
        self.children.get(segment).map(|c| c.clone() as Arc<dyn Resource>)
    }

    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn parent(&self) -> Option<Arc<dyn Resource>> {
        self.parent.upgrade().map(|p| p as Arc<dyn Resource>)
    }
}

/// Description of a subtree: `(name, type, children)`.
pub struct Branch(pub &'static str, pub TypeTag, pub Vec<Branch>);

/// Build a tree rooted at a node of type `tag`.
pub fn tree(tag: TypeTag, children: Vec<Branch>) -> Arc<Node> {
    build(None, tag, Weak::new(), children)
}

fn build(name: Option<&str>, tag: TypeTag, parent: Weak<Node>, children: Vec<Branch>) -> Arc<Node> {
    Arc::new_cyclic(|me| Node {
        tag,
        name: name.map(str::to_string),
        parent,
        children: children
            .into_iter()
            .map(|Branch(child, child_tag, grandchildren)| {
                let node = build(Some(child), child_tag, me.clone(), grandchildren);
                (child.to_string(), node)
            })
            .collect(),
    })
}

/// `/math/pi` (Document), `/math/plot` (Image), `/empty` (Folder).
pub fn library(catalog: &Catalog) -> Arc<Node> {
    tree(
        catalog.folder,
        vec![
            Branch(
                "math",
                catalog.folder,
                vec![
                    Branch("pi", catalog.document, vec![]),
                    Branch("plot", catalog.image, vec![]),
                ],
            ),
            Branch("empty", catalog.folder, vec![]),
        ],
    )
}
