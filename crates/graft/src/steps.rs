//! Path compilation: validating a [`Path`] against a root type and turning it
//! into access steps.

use crate::reflect::TypeDescriptor;
use crate::value::Shape;
use crate::{GraftError, GraftResult, Path, Seg};
use dashmap::DashMap;
use std::any::TypeId;
use std::sync::Arc;

/// Property slot resolved at compile time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    pub owner: TypeId,
    pub index: usize,
}

/// One navigation step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessStep {
    /// Read a named property.
    Member {
        property: String,
        /// Resolved slot when the owner type was statically known.
        slot: Option<Slot>,
    },
    /// Read a list element.
    Index { index: usize },
}

impl AccessStep {
    /// The property name of a member step.
    pub fn property(&self) -> Option<&str> {
        match self {
            AccessStep::Member { property, .. } => Some(property),
            AccessStep::Index { .. } => None,
        }
    }
}

/// A path validated against a root type.
#[derive(Debug, Clone)]
pub struct CompiledPath {
    root: &'static TypeDescriptor,
    path: Path,
    steps: Vec<AccessStep>,
}

impl CompiledPath {
    pub fn root(&self) -> &'static TypeDescriptor {
        self.root
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn steps(&self) -> &[AccessStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// Compiles paths and caches the result per (root type, path text).
#[derive(Debug, Default)]
pub struct StepExtractor {
    cache: DashMap<(TypeId, String), Arc<CompiledPath>>,
}

impl StepExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cached paths.
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    pub fn extract(
        &self,
        root: &'static TypeDescriptor,
        path: &Path,
    ) -> GraftResult<Arc<CompiledPath>> {
        if path.is_empty() {
            return Err(GraftError::null_argument("path"));
        }
        let key = (root.type_id(), path.to_string());
        if let Some(found) = self.cache.get(&key) {
            return Ok(Arc::clone(&found));
        }

        let compiled = Arc::new(compile(root, path)?);
        tracing::debug!(
            root = root.name(),
            path = %path,
            steps = compiled.len(),
            "compiled path"
        );
        let entry = self.cache.entry(key).or_insert(compiled);
        Ok(Arc::clone(&entry))
    }
}

/// Validate `path` against `root` without caching.
pub fn compile(root: &'static TypeDescriptor, path: &Path) -> GraftResult<CompiledPath> {
    let mut shape = Shape::Object(root);
    let mut steps = Vec::with_capacity(path.len());

    for (i, seg) in path.iter().enumerate() {
        let node = || path.prefix(i + 1).to_string();
        match seg {
            Seg::Key(name) => {
                let (slot, next) = match shape {
                    Shape::Object(descriptor) => {
                        let (index, property) = descriptor.property(name).ok_or_else(|| {
                            GraftError::unsupported_path(
                                node(),
                                format!(
                                    "'{name}' is not a readable property of '{}'",
                                    descriptor.name()
                                ),
                            )
                        })?;
                        let slot = Slot {
                            owner: descriptor.type_id(),
                            index,
                        };
                        (Some(slot), property.shape())
                    }
                    Shape::Dynamic => (None, Shape::Dynamic),
                    Shape::Scalar(kind) => {
                        return Err(GraftError::unsupported_path(
                            node(),
                            format!("cannot access '{name}' on a {kind} value"),
                        ))
                    }
                    Shape::List(_) => {
                        return Err(GraftError::unsupported_path(
                            node(),
                            format!("cannot access '{name}' on a list; index it first"),
                        ))
                    }
                };
                steps.push(AccessStep::Member {
                    property: name.clone(),
                    slot,
                });
                shape = next;
            }
            Seg::Index(index) => {
                if !matches!(steps.last(), Some(AccessStep::Member { .. })) {
                    return Err(GraftError::unsupported_path(
                        node(),
                        "an index must follow the property that holds the list",
                    ));
                }
                shape = match shape {
                    Shape::List(element) => element(),
                    Shape::Dynamic => Shape::Dynamic,
                    _ => {
                        return Err(GraftError::unsupported_path(
                            node(),
                            "the indexed property is not a list",
                        ))
                    }
                };
                steps.push(AccessStep::Index { index: *index });
            }
        }
    }

    Ok(CompiledPath {
        root,
        path: path.clone(),
        steps,
    })
}
