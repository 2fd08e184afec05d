//! Engine configuration: runtime options and strategy overrides.

use crate::reflect::{Reflect, TypeDescriptor};
use crate::{GraftError, GraftResult};
use serde::{Deserialize, Serialize};
use std::any::TypeId;
use std::collections::HashMap;

/// How index steps write into lists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexWrite {
    /// Write into the existing list slot when the list supports it. The list
    /// keeps its identity, so the write is visible through the original root.
    #[default]
    InPlace,
    /// Always build a new list with the slot replaced.
    CopyOnWrite,
}

/// Runtime options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    pub index_writes: IndexWrite,
}

/// An explicit reconstruction strategy registered for one type.
#[derive(Debug, Clone)]
pub struct StrategyOverride {
    pub(crate) constructor: usize,
    pub(crate) bindings: HashMap<String, String>,
}

impl StrategyOverride {
    /// Index of the selected constructor in the type's descriptor.
    pub fn constructor(&self) -> usize {
        self.constructor
    }

    /// Property explicitly bound to `parameter`, if any.
    pub fn binding(&self, parameter: &str) -> Option<&str> {
        self.bindings.get(parameter).map(String::as_str)
    }
}

/// Options plus the per-type override table.
///
/// Overrides are validated when registered:
///
/// ```
/// use graft::{Config, Reflect};
///
/// #[derive(Debug, Reflect)]
/// #[graft(constructor(name = "new", params = "first, last"))]
/// #[graft(constructor(name = "anonymous", params = "", hidden))]
/// struct Person {
///     first: String,
///     last: String,
/// }
///
/// impl Person {
///     fn new(first: String, last: String) -> Self {
///         Self { first, last }
///     }
///     fn anonymous() -> Self {
///         Self::new(String::new(), String::new())
///     }
/// }
///
/// assert!(Config::new().configure::<Person>("new").is_ok());
/// assert!(Config::new().configure::<Person>("missing").is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct Config {
    options: Options,
    overrides: HashMap<TypeId, StrategyOverride>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(mut self, options: Options) -> Self {
        self.options = options;
        self
    }

    /// Set the index write policy.
    pub fn index_writes(mut self, mode: IndexWrite) -> Self {
        self.options.index_writes = mode;
        self
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Rebuild `T` through the named constructor. Parameters are still bound
    /// to properties by name.
    pub fn configure<T: Reflect>(self, constructor: &str) -> GraftResult<Self> {
        self.configure_with::<T, _, &str, &str>(constructor, [])
    }

    /// Rebuild `T` through the named constructor, binding the listed
    /// parameters to the listed properties. Unlisted parameters are bound by
    /// name.
    pub fn configure_with<T, I, P, Q>(mut self, constructor: &str, bindings: I) -> GraftResult<Self>
    where
        T: Reflect,
        I: IntoIterator<Item = (P, Q)>,
        P: AsRef<str>,
        Q: AsRef<str>,
    {
        let descriptor = T::type_descriptor();
        let index = find_constructor(descriptor, constructor)?;
        let params = descriptor.constructors()[index].params();

        let mut map = HashMap::new();
        for (parameter, property) in bindings {
            let (parameter, property) = (parameter.as_ref(), property.as_ref());
            if !params.iter().any(|p| *p == parameter) {
                return Err(GraftError::invalid_override(format!(
                    "parameter '{parameter}' is not a parameter of constructor '{}::{constructor}'",
                    descriptor.name()
                )));
            }
            check_property(descriptor, property)?;
            map.insert(parameter.to_string(), property.to_string());
        }

        tracing::debug!(
            type_name = descriptor.name(),
            constructor,
            bound = map.len(),
            "registered strategy override"
        );
        self.overrides.insert(
            descriptor.type_id(),
            StrategyOverride {
                constructor: index,
                bindings: map,
            },
        );
        Ok(self)
    }

    /// Rebuild `T` through the named constructor, binding its parameters in
    /// order to the listed properties.
    pub fn configure_positional<T, I, Q>(self, constructor: &str, properties: I) -> GraftResult<Self>
    where
        T: Reflect,
        I: IntoIterator<Item = Q>,
        Q: AsRef<str>,
    {
        let descriptor = T::type_descriptor();
        let index = find_constructor(descriptor, constructor)?;
        let params = descriptor.constructors()[index].params();
        let properties: Vec<String> = properties
            .into_iter()
            .map(|p| p.as_ref().to_string())
            .collect();
        if properties.len() != params.len() {
            return Err(GraftError::invalid_override(format!(
                "constructor '{}::{constructor}' takes {} parameters but {} properties were given",
                descriptor.name(),
                params.len(),
                properties.len()
            )));
        }
        let pairs: Vec<(&str, String)> = params.iter().copied().zip(properties).collect();
        self.configure_with::<T, _, _, _>(constructor, pairs)
    }

    /// The override registered for the type, if any.
    pub fn override_for(&self, type_id: TypeId) -> Option<&StrategyOverride> {
        self.overrides.get(&type_id)
    }
}

fn find_constructor(descriptor: &TypeDescriptor, name: &str) -> GraftResult<usize> {
    descriptor
        .constructor(name)
        .map(|(index, _)| index)
        .ok_or_else(|| {
            GraftError::invalid_override(format!(
                "type '{}' has no constructor '{name}'",
                descriptor.name()
            ))
        })
}

fn check_property(descriptor: &TypeDescriptor, property: &str) -> GraftResult<()> {
    match descriptor.property(property) {
        Some(_) => Ok(()),
        None => Err(GraftError::invalid_override(format!(
            "property '{property}' is not a member of '{}'",
            descriptor.name()
        ))),
    }
}
