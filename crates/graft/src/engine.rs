//! The entry point: applies path updates and shape conversions.

use crate::config::{Config, Options};
use crate::notify::{ChangeEvent, ChangeSink};
use crate::path::IntoPath;
use crate::reflect::{Reflect, TypeDescriptor};
use crate::steps::{CompiledPath, StepExtractor};
use crate::strategy::{Resolver, Strategy};
use crate::value::{FieldValue, Value};
use crate::walker::Walker;
use crate::{GraftError, GraftResult, Path};
use std::sync::Arc;

/// Updates immutable object graphs.
///
/// An engine owns its strategy and path caches and its change handlers. It is
/// `Send + Sync`; share one behind an `Arc` or a `static` to reuse the caches.
///
/// ```
/// use graft::{Engine, Reflect};
/// use std::sync::Arc;
///
/// #[derive(Debug, Reflect)]
/// struct Employee {
///     first: String,
///     last: String,
/// }
///
/// #[derive(Debug, Reflect)]
/// struct Department {
///     title: String,
///     manager: Arc<Employee>,
/// }
///
/// let engine = Engine::default();
/// let dept = Arc::new(Department {
///     title: "R&D".into(),
///     manager: Arc::new(Employee { first: "Ada".into(), last: "Byron".into() }),
/// });
///
/// let renamed = engine.with(&dept, "manager.last", "Lovelace".to_string()).unwrap();
/// assert_eq!(renamed.manager.last, "Lovelace");
/// assert_eq!(dept.manager.last, "Byron");
/// ```
#[derive(Debug, Default)]
pub struct Engine {
    resolver: Resolver,
    extractor: StepExtractor,
    sink: ChangeSink,
}

impl Engine {
    pub fn new(config: Config) -> Self {
        Self {
            resolver: Resolver::new(config),
            extractor: StepExtractor::new(),
            sink: ChangeSink::new(),
        }
    }

    pub fn config(&self) -> &Config {
        self.resolver.config()
    }

    pub fn options(&self) -> &Options {
        self.resolver.config().options()
    }

    /// Register a handler run after every successful update or conversion.
    pub fn on_change(&self, handler: impl Fn(&ChangeEvent) + Send + Sync + 'static) {
        self.sink.subscribe(handler);
    }

    /// Compile `path` against `root`, using the path cache.
    pub fn compile(
        &self,
        root: &'static TypeDescriptor,
        path: impl IntoPath,
    ) -> GraftResult<Arc<CompiledPath>> {
        self.extractor.extract(root, &path.into_path()?)
    }

    /// The strategy for building `target` from `source`, using the strategy
    /// cache.
    pub fn resolve(
        &self,
        source: &'static TypeDescriptor,
        target: &'static TypeDescriptor,
    ) -> GraftResult<Arc<Strategy>> {
        self.resolver.resolve(source, target)
    }

    /// Number of cached (strategies, compiled paths).
    pub fn cache_sizes(&self) -> (usize, usize) {
        (self.resolver.len(), self.extractor.len())
    }

    /// Replace the value at `path` under `root`, returning the new root.
    ///
    /// Returns `root` itself when the value at `path` already equals
    /// `new_value`.
    pub fn apply(&self, root: Value, path: impl IntoPath, new_value: Value) -> GraftResult<Value> {
        let object = match &root {
            Value::Object(object) => object,
            Value::Null => return Err(GraftError::null_argument("root")),
            other => {
                return Err(GraftError::type_mismatch(
                    Path::root(),
                    "object",
                    other.kind_name(),
                ))
            }
        };
        let path = path.into_path()?;
        let compiled = self.extractor.extract(object.descriptor(), &path)?;

        let walker = Walker::new(&self.resolver, self.options());
        let outcome = walker.apply(&root, &compiled, new_value.clone())?;
        if outcome.changed {
            self.sink.emit(|| ChangeEvent {
                source: root.clone(),
                target: outcome.root.clone(),
                value: Some(new_value),
                affected_properties: outcome.affected,
            });
        }
        Ok(outcome.root)
    }

    /// Typed form of [`Engine::apply`].
    pub fn with<T: Reflect, V: FieldValue>(
        &self,
        root: &Arc<T>,
        path: impl IntoPath,
        value: V,
    ) -> GraftResult<Arc<T>> {
        let updated = self.apply(Value::Object(root.clone()), path, value.to_value())?;
        Arc::<T>::from_value(updated)
    }

    /// Build a `T` from the properties of `source`.
    pub fn convert<T: Reflect>(&self, source: &Value) -> GraftResult<Arc<T>> {
        let object = match source {
            Value::Object(object) => object,
            Value::Null => return Err(GraftError::null_argument("source")),
            other => {
                return Err(GraftError::type_mismatch(
                    Path::root(),
                    "object",
                    other.kind_name(),
                ))
            }
        };
        let strategy = self
            .resolver
            .resolve(object.descriptor(), T::type_descriptor())?;
        let built = Value::Object(strategy.build(object.as_ref(), None)?);
        self.sink.emit(|| ChangeEvent {
            source: source.clone(),
            target: built.clone(),
            value: None,
            affected_properties: Vec::new(),
        });
        Arc::<T>::from_value(built)
    }

    /// Typed form of [`Engine::convert`].
    pub fn convert_from<T: Reflect, S: Reflect>(&self, source: &Arc<S>) -> GraftResult<Arc<T>> {
        self.convert(&Value::Object(source.clone()))
    }
}
