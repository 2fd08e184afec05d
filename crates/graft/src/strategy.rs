//! Reconstruction strategies: which constructor rebuilds a type, and which
//! source property feeds each of its parameters.

use crate::config::Config;
use crate::reflect::{ConstructorDescriptor, Reflect, TypeDescriptor};
use crate::value::Value;
use crate::{GraftError, GraftResult, Path};
use dashmap::DashMap;
use std::any::TypeId;
use std::sync::Arc;

/// One constructor parameter and the source property bound to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub position: usize,
    pub parameter: &'static str,
    pub property: &'static str,
    /// Index of `property` in the source descriptor.
    pub property_index: usize,
}

/// How to build a target instance from a source instance.
///
/// Every constructor parameter has exactly one binding.
#[derive(Debug)]
pub struct Strategy {
    source: &'static TypeDescriptor,
    target: &'static TypeDescriptor,
    constructor: usize,
    bindings: Vec<Binding>,
}

impl Strategy {
    pub fn target(&self) -> &'static TypeDescriptor {
        self.target
    }

    pub fn constructor(&self) -> &'static ConstructorDescriptor {
        &self.target.constructors()[self.constructor]
    }

    /// Bindings in parameter order.
    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    /// The binding fed by `property`, if any parameter is bound to it.
    pub fn binding_for(&self, property: &str) -> Option<&Binding> {
        self.bindings.iter().find(|b| b.property == property)
    }

    /// Build a target instance, reading every argument from `source` except
    /// the one at `replace.0`, which receives `replace.1`.
    pub fn build(
        &self,
        source: &dyn Reflect,
        replace: Option<(usize, Value)>,
    ) -> GraftResult<Arc<dyn Reflect>> {
        let properties = self.source.properties();
        let (slot, mut replacement) = match replace {
            Some((position, value)) => (Some(position), Some(value)),
            None => (None, None),
        };
        let mut args = Vec::with_capacity(self.bindings.len());
        for binding in &self.bindings {
            if slot == Some(binding.position) {
                args.push(replacement.take().unwrap_or_default());
                continue;
            }
            let value = properties[binding.property_index]
                .read(source)
                .ok_or_else(|| {
                    GraftError::type_mismatch(
                        Path::root(),
                        self.source.name(),
                        source.descriptor().name(),
                    )
                })?;
            args.push(value);
        }
        self.constructor().invoke(args)
    }
}

/// Resolves and memoizes strategies per (source type, target type).
#[derive(Debug)]
pub struct Resolver {
    config: Config,
    cache: DashMap<(TypeId, TypeId), Arc<Strategy>>,
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl Resolver {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            cache: DashMap::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Number of cached strategies.
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    /// The strategy for building `target` out of `source`.
    pub fn resolve(
        &self,
        source: &'static TypeDescriptor,
        target: &'static TypeDescriptor,
    ) -> GraftResult<Arc<Strategy>> {
        let key = (source.type_id(), target.type_id());
        if let Some(found) = self.cache.get(&key) {
            return Ok(Arc::clone(&found));
        }

        let strategy = Arc::new(self.compute(source, target)?);
        tracing::debug!(
            source = source.name(),
            target = target.name(),
            constructor = strategy.constructor().name(),
            "resolved reconstruction strategy"
        );
        let entry = self.cache.entry(key).or_insert(strategy);
        Ok(Arc::clone(&entry))
    }

    fn compute(
        &self,
        source: &'static TypeDescriptor,
        target: &'static TypeDescriptor,
    ) -> GraftResult<Strategy> {
        let overrides = self.config.override_for(target.type_id());
        let constructor = match overrides {
            Some(o) => o.constructor(),
            None => {
                let mut eligible = target
                    .constructors()
                    .iter()
                    .enumerate()
                    .filter(|(_, c)| !c.is_hidden());
                match (eligible.next(), eligible.next()) {
                    (Some((index, _)), None) => index,
                    _ => {
                        let candidates =
                            target.constructors().iter().filter(|c| !c.is_hidden()).count();
                        return Err(GraftError::constructor_ambiguity(target.name(), candidates));
                    }
                }
            }
        };

        let params = target.constructors()[constructor].params();
        let mut bindings = Vec::with_capacity(params.len());
        for (position, &parameter) in params.iter().enumerate() {
            let explicit = overrides.and_then(|o| o.binding(parameter));
            let (property_index, property) = match explicit {
                Some(name) => source
                    .property(name)
                    .map(|(index, p)| (index, p.name()))
                    .ok_or_else(|| GraftError::property_binding(parameter, target.name()))?,
                None => match_by_name(source, parameter)
                    .ok_or_else(|| GraftError::property_binding(parameter, target.name()))?,
            };
            bindings.push(Binding {
                position,
                parameter,
                property,
                property_index,
            });
        }

        Ok(Strategy {
            source,
            target,
            constructor,
            bindings,
        })
    }
}

/// The single source property whose name equals `parameter` ignoring case.
fn match_by_name(source: &TypeDescriptor, parameter: &str) -> Option<(usize, &'static str)> {
    let mut matches = source
        .properties()
        .iter()
        .enumerate()
        .filter(|(_, p)| p.name().eq_ignore_ascii_case(parameter));
    match (matches.next(), matches.next()) {
        (Some((index, p)), None) => Some((index, p.name())),
        _ => None,
    }
}
