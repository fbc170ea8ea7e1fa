//! Declared resource types and their ancestor order.
//!
//! Every type gets a [`TypeTag`] when declared. Its linearized ancestor
//! list (C3, most-derived first, always ending in [`TypeTag::ANY`]) is
//! computed once at declaration and never recomputed.

use thiserror::Error;

/// Opaque identifier of a declared type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeTag(u32);

impl TypeTag {
    /// The root of every hierarchy.
    pub const ANY: TypeTag = TypeTag(0);

    fn index(self) -> usize {
        self.0 as usize
    }
}

/// Errors raised while declaring a type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HierarchyError {
    #[error("type `{0}` is already declared")]
    Duplicate(String),

    #[error("type `{name}` names an undeclared base {base:?}")]
    UnknownBase { name: String, base: TypeTag },

    #[error("type `{name}` lists a base more than once")]
    RepeatedBase { name: String },

    #[error("bases of `{0}` have no consistent linearization")]
    Inconsistent(String),
}

#[derive(Debug, Clone)]
struct TypeEntry {
    name: String,
    bases: Vec<TypeTag>,
    ancestors: Vec<TypeTag>,
}

/// Registry of declared types.
#[derive(Debug, Clone)]
pub struct TypeHierarchy {
    entries: Vec<TypeEntry>,
}

impl Default for TypeHierarchy {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeHierarchy {
    /// Name of the root type.
    pub const ROOT: &'static str = "object";

    pub fn new() -> Self {
        Self {
            entries: vec![TypeEntry {
                name: Self::ROOT.to_string(),
                bases: Vec::new(),
                ancestors: vec![TypeTag::ANY],
            }],
        }
    }

    /// Declare `name` deriving from `bases` (the root when empty).
    pub fn declare(&mut self, name: &str, bases: &[TypeTag]) -> Result<TypeTag, HierarchyError> {
        if self.lookup(name).is_some() {
            return Err(HierarchyError::Duplicate(name.to_string()));
        }
        if let Some(&base) = bases.iter().find(|b| b.index() >= self.entries.len()) {
            return Err(HierarchyError::UnknownBase {
                name: name.to_string(),
                base,
            });
        }
        if bases.iter().enumerate().any(|(i, b)| bases[..i].contains(b)) {
            return Err(HierarchyError::RepeatedBase {
                name: name.to_string(),
            });
        }

        let tag = TypeTag(self.entries.len() as u32);
        let bases = if bases.is_empty() {
            vec![TypeTag::ANY]
        } else {
            bases.to_vec()
        };
        let ancestors = self
            .linearize(tag, &bases)
            .ok_or_else(|| HierarchyError::Inconsistent(name.to_string()))?;

        tracing::debug!(name, ?ancestors, "Type declared");
        self.entries.push(TypeEntry {
            name: name.to_string(),
            bases,
            ancestors,
        });
        Ok(tag)
    }

    pub fn lookup(&self, name: &str) -> Option<TypeTag> {
        self.entries
            .iter()
            .position(|e| e.name == name)
            .map(|i| TypeTag(i as u32))
    }

    pub fn name(&self, tag: TypeTag) -> Option<&str> {
        self.entries.get(tag.index()).map(|e| e.name.as_str())
    }

    pub fn bases(&self, tag: TypeTag) -> &[TypeTag] {
        self.entries.get(tag.index()).map_or(&[], |e| &e.bases)
    }

    /// Ancestor order of `tag`, itself first. Empty for undeclared tags.
    pub fn ancestors(&self, tag: TypeTag) -> &[TypeTag] {
        self.entries.get(tag.index()).map_or(&[], |e| &e.ancestors)
    }

    pub fn is_subtype(&self, tag: TypeTag, base: TypeTag) -> bool {
        self.ancestors(tag).contains(&base)
    }

    /// Number of declared types, the root included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn linearize(&self, tag: TypeTag, bases: &[TypeTag]) -> Option<Vec<TypeTag>> {
        let mut sequences: Vec<Vec<TypeTag>> = bases
            .iter()
            .map(|b| self.entries[b.index()].ancestors.clone())
            .collect();
        sequences.push(bases.to_vec());

        let mut order = vec![tag];
        loop {
            sequences.retain(|s| !s.is_empty());
            if sequences.is_empty() {
                return Some(order);
            }
            // first head that appears in no tail
            let head = sequences
                .iter()
                .map(|s| s[0])
                .find(|candidate| !sequences.iter().any(|s| s[1..].contains(candidate)))?;
            order.push(head);
            for sequence in &mut sequences {
                if sequence[0] == head {
                    sequence.remove(0);
                }
            }
        }
    }
}
