//! Leaf-to-root reconstruction of an object graph.

use crate::config::{IndexWrite, Options};
use crate::eval;
use crate::steps::{AccessStep, CompiledPath};
use crate::strategy::{Resolver, Strategy};
use crate::value::{ListAccess, Value};
use crate::{GraftError, GraftResult, Path};
use std::sync::Arc;

/// Result of a walk.
#[derive(Debug)]
pub struct Outcome {
    /// The new root, or the original root when nothing changed.
    pub root: Value,
    /// Rebuilt properties, root first.
    pub affected: Vec<String>,
    pub changed: bool,
}

#[derive(Debug)]
enum HopKind {
    Member,
    Element { index: usize },
}

/// One planned reconstruction: rebuild the owner at `depth` with a new value
/// for the property bound at `position`.
#[derive(Debug)]
struct Hop {
    kind: HopKind,
    depth: usize,
    strategy: Arc<Strategy>,
    position: usize,
    label: String,
}

/// An in-place list write held back until every hop has been built.
struct PendingWrite {
    list: Arc<dyn ListAccess>,
    index: usize,
    value: Value,
    at: Path,
}

pub struct Walker<'a> {
    resolver: &'a Resolver,
    options: &'a Options,
}

impl<'a> Walker<'a> {
    pub fn new(resolver: &'a Resolver, options: &'a Options) -> Self {
        Self { resolver, options }
    }

    pub fn apply(
        &self,
        root: &Value,
        compiled: &CompiledPath,
        new_value: Value,
    ) -> GraftResult<Outcome> {
        let values = eval::trace(root, compiled)?;
        if values[compiled.len()] == new_value {
            tracing::trace!(path = %compiled.path(), "value unchanged, keeping original root");
            return Ok(Outcome {
                root: root.clone(),
                affected: Vec::new(),
                changed: false,
            });
        }

        let plan = self.plan(compiled, &values)?;
        let mut pending = new_value;
        let mut affected = Vec::with_capacity(plan.len());
        let mut writes = Vec::new();
        for hop in plan {
            pending = self.execute(&hop, compiled, &values, pending, &mut writes)?;
            tracing::trace!(
                owner = hop.strategy.target().name(),
                property = %hop.label,
                "rebuilt owner"
            );
            affected.push(hop.label);
        }
        affected.reverse();

        for write in writes {
            write
                .list
                .set(write.index, write.value)
                .map_err(|e| e.with_prefix(&write.at))?;
        }

        Ok(Outcome {
            root: pending,
            affected,
            changed: true,
        })
    }

    /// Resolve every hop before anything is built or written.
    fn plan(&self, compiled: &CompiledPath, values: &[Value]) -> GraftResult<Vec<Hop>> {
        let steps = compiled.steps();
        let mut hops = Vec::with_capacity(steps.len());
        let mut end = steps.len();
        while end > 0 {
            let (kind, depth) = match &steps[end - 1] {
                AccessStep::Member { .. } => (HopKind::Member, end - 1),
                AccessStep::Index { index } if end >= 2 => {
                    (HopKind::Element { index: *index }, end - 2)
                }
                AccessStep::Index { .. } => {
                    return Err(GraftError::unsupported_path(
                        compiled.path().prefix(end).to_string(),
                        "an index must follow the property that holds the list",
                    ))
                }
            };
            let property = steps[depth].property().ok_or_else(|| {
                GraftError::unsupported_path(
                    compiled.path().prefix(end).to_string(),
                    "an index must follow the property that holds the list",
                )
            })?;
            let (strategy, position) =
                self.bind(&values[depth], property, compiled.path().prefix(depth))?;
            let label = match kind {
                HopKind::Member => property.to_string(),
                HopKind::Element { index } => format!("{property}[{index}]"),
            };
            hops.push(Hop {
                kind,
                depth,
                strategy,
                position,
                label,
            });
            end = depth;
        }
        Ok(hops)
    }

    fn bind(&self, owner: &Value, property: &str, at: Path) -> GraftResult<(Arc<Strategy>, usize)> {
        let object = match owner {
            Value::Object(object) => object,
            Value::Null => return Err(GraftError::path_not_found(at)),
            other => return Err(GraftError::type_mismatch(at, "object", other.kind_name())),
        };
        let descriptor = object.descriptor();
        let strategy = self.resolver.resolve(descriptor, descriptor)?;
        let position = strategy
            .binding_for(property)
            .map(|b| b.position)
            .ok_or_else(|| GraftError::unassignable_property(property, descriptor.name()))?;
        Ok((strategy, position))
    }

    fn execute(
        &self,
        hop: &Hop,
        compiled: &CompiledPath,
        values: &[Value],
        pending: Value,
        writes: &mut Vec<PendingWrite>,
    ) -> GraftResult<Value> {
        let replacement = match hop.kind {
            HopKind::Member => pending,
            HopKind::Element { index } => {
                let at = compiled.path().prefix(hop.depth + 1);
                let list = match &values[hop.depth + 1] {
                    Value::List(list) => list,
                    Value::Null => return Err(GraftError::path_not_found(at)),
                    other => return Err(GraftError::type_mismatch(at, "list", other.kind_name())),
                };
                let in_place = self.options.index_writes == IndexWrite::InPlace && list.is_shared();
                if in_place {
                    list.accepts(index, &pending).map_err(|e| e.with_prefix(&at))?;
                    writes.push(PendingWrite {
                        list: Arc::clone(list),
                        index,
                        value: pending,
                        at,
                    });
                    Value::List(Arc::clone(list))
                } else {
                    Value::List(list.replaced(index, pending).map_err(|e| e.with_prefix(&at))?)
                }
            }
        };

        let Value::Object(owner) = &values[hop.depth] else {
            return Err(GraftError::path_not_found(compiled.path().prefix(hop.depth)));
        };
        let owner_path = compiled.path().prefix(hop.depth);
        hop.strategy
            .build(owner.as_ref(), Some((hop.position, replacement)))
            .map(Value::Object)
            .map_err(|e| e.with_prefix(&owner_path))
    }
}
