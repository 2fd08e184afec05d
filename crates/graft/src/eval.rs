//! Reading the values along a compiled path.

use crate::steps::{AccessStep, CompiledPath};
use crate::value::Value;
use crate::{GraftError, GraftResult};

/// Values at every prefix of `compiled`: index 0 is `root`, index `n` the
/// value reached after `n` steps.
pub fn trace(root: &Value, compiled: &CompiledPath) -> GraftResult<Vec<Value>> {
    let mut values = Vec::with_capacity(compiled.len() + 1);
    values.push(root.clone());
    for (depth, step) in compiled.steps().iter().enumerate() {
        let next = read_step(&values[depth], step, compiled, depth)?;
        values.push(next);
    }
    Ok(values)
}

/// The value reached after the first `depth` steps of `compiled`.
pub fn evaluate(root: &Value, compiled: &CompiledPath, depth: usize) -> GraftResult<Value> {
    let mut current = root.clone();
    for (i, step) in compiled.steps().iter().take(depth).enumerate() {
        current = read_step(&current, step, compiled, i)?;
    }
    Ok(current)
}

fn read_step(
    current: &Value,
    step: &AccessStep,
    compiled: &CompiledPath,
    depth: usize,
) -> GraftResult<Value> {
    let path = compiled.path();
    match (current, step) {
        (Value::Object(object), AccessStep::Member { property, slot }) => {
            let descriptor = object.descriptor();
            let found = match slot {
                Some(slot) if slot.owner == descriptor.type_id() => {
                    descriptor.properties().get(slot.index)
                }
                _ => descriptor.property(property).map(|(_, p)| p),
            };
            let found = found.ok_or_else(|| {
                GraftError::unsupported_path(
                    path.prefix(depth + 1).to_string(),
                    format!(
                        "'{property}' is not a readable property of '{}'",
                        descriptor.name()
                    ),
                )
            })?;
            found.read(object.as_ref()).ok_or_else(|| {
                GraftError::type_mismatch(path.prefix(depth), found.declared_in(), descriptor.name())
            })
        }
        (Value::List(list), AccessStep::Index { index }) => list
            .get(*index)
            .ok_or_else(|| GraftError::index_out_of_bounds(path.prefix(depth), *index, list.len())),
        (Value::Null, _) => Err(GraftError::path_not_found(path.prefix(depth + 1))),
        (other, AccessStep::Member { .. }) => Err(GraftError::type_mismatch(
            path.prefix(depth),
            "object",
            other.kind_name(),
        )),
        (other, AccessStep::Index { .. }) => Err(GraftError::type_mismatch(
            path.prefix(depth),
            "list",
            other.kind_name(),
        )),
    }
}
