//! Runtime type information for reconstructible types.
//!
//! A [`Reflect`] type exposes a [`TypeDescriptor`]: its readable properties
//! and the constructors that can rebuild it. Descriptors are normally
//! generated by `#[derive(Reflect)]`; the builder below is what the derive
//! expands to and can also be used by hand.

use crate::value::{FieldValue, Shape, Value};
use crate::{GraftError, GraftResult, Path};
use std::any::{Any, TypeId};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// Upcasting helpers, implemented for every `'static` type.
pub trait AsAny: Any + Send + Sync {
    /// Borrow as `&dyn Any`.
    fn as_any(&self) -> &dyn Any;

    /// Convert a shared handle into `Arc<dyn Any>` for downcasting.
    fn into_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

impl<T: Any + Send + Sync> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

/// A type whose instances can be read property by property and rebuilt
/// through one of its constructors.
///
/// # Example
///
/// ```
/// use graft::{Engine, Reflect};
/// use std::sync::Arc;
///
/// #[derive(Debug, Reflect)]
/// struct Point {
///     x: i64,
///     y: i64,
/// }
///
/// let engine = Engine::default();
/// let p = Arc::new(Point { x: 1, y: 2 });
/// let moved = engine.with(&p, "x", 5i64).unwrap();
/// assert_eq!((moved.x, moved.y), (5, 2));
/// ```
pub trait Reflect: AsAny + fmt::Debug {
    /// The descriptor of this type.
    fn type_descriptor() -> &'static TypeDescriptor
    where
        Self: Sized;

    /// The descriptor of the runtime type of `self`.
    fn descriptor(&self) -> &'static TypeDescriptor;
}

/// Downcast a reflected object to its concrete type.
pub fn downcast_ref<T: Reflect>(object: &dyn Reflect) -> Option<&T> {
    object.as_any().downcast_ref::<T>()
}

type ReadFn = Arc<dyn Fn(&dyn Reflect) -> Option<Value> + Send + Sync>;
type InvokeFn = Arc<dyn Fn(&mut Arguments<'_>) -> GraftResult<Arc<dyn Reflect>> + Send + Sync>;

/// A readable property.
#[derive(Clone)]
pub struct PropertyDescriptor {
    name: &'static str,
    declared_in: &'static str,
    computed: bool,
    shape: fn() -> Shape,
    read: ReadFn,
}

impl PropertyDescriptor {
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Name of the type that declares the property. Differs from the owner
    /// for flattened properties.
    pub fn declared_in(&self) -> &'static str {
        self.declared_in
    }

    /// Computed properties are derived from other state and are skipped by
    /// equality and serialization.
    pub fn is_computed(&self) -> bool {
        self.computed
    }

    pub fn shape(&self) -> Shape {
        (self.shape)()
    }

    /// Read the property from `object`. `None` if `object` is not of the
    /// owning type.
    pub fn read(&self, object: &dyn Reflect) -> Option<Value> {
        (self.read)(object)
    }
}

impl fmt::Debug for PropertyDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyDescriptor")
            .field("name", &self.name)
            .field("declared_in", &self.declared_in)
            .field("computed", &self.computed)
            .finish_non_exhaustive()
    }
}

/// A constructor: an ordered parameter list and a function building the type.
#[derive(Clone)]
pub struct ConstructorDescriptor {
    name: &'static str,
    params: Vec<&'static str>,
    hidden: bool,
    invoke: InvokeFn,
}

impl ConstructorDescriptor {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn params(&self) -> &[&'static str] {
        &self.params
    }

    /// Hidden constructors are only used when selected by an override.
    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    /// Build an instance from arguments given in parameter order.
    pub fn invoke(&self, args: Vec<Value>) -> GraftResult<Arc<dyn Reflect>> {
        let mut args = Arguments {
            params: &self.params,
            values: args.into_iter(),
            position: 0,
        };
        (self.invoke)(&mut args)
    }
}

impl fmt::Debug for ConstructorDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstructorDescriptor")
            .field("name", &self.name)
            .field("params", &self.params)
            .field("hidden", &self.hidden)
            .finish_non_exhaustive()
    }
}

/// Positional constructor arguments handed to a constructor function.
pub struct Arguments<'a> {
    params: &'a [&'static str],
    values: std::vec::IntoIter<Value>,
    position: usize,
}

impl Arguments<'_> {
    /// Take the next argument, converted to the parameter's type.
    ///
    /// Conversion errors are anchored at the parameter name. Taking more
    /// arguments than the constructor declares fails at the argument position.
    pub fn take<T: FieldValue>(&mut self) -> GraftResult<T> {
        let position = self.position;
        self.position += 1;
        let at = match self.params.get(position) {
            Some(param) => Path::root().key(*param),
            None => return Err(GraftError::path_not_found(Path::root().index(position))),
        };
        let value = self
            .values
            .next()
            .ok_or_else(|| GraftError::path_not_found(at.clone()))?;
        T::from_value(value).map_err(|e| e.with_prefix(&at))
    }
}

/// Properties and constructors of a [`Reflect`] type.
pub struct TypeDescriptor {
    name: &'static str,
    type_id: TypeId,
    properties: Vec<PropertyDescriptor>,
    constructors: Vec<ConstructorDescriptor>,
}

impl TypeDescriptor {
    /// Start describing `T`.
    pub fn builder<T: Reflect>(name: &'static str) -> DescriptorBuilder<T> {
        DescriptorBuilder {
            name,
            properties: Vec::new(),
            constructors: Vec::new(),
            _marker: PhantomData,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// All properties, flattened ones included, in declaration order.
    pub fn properties(&self) -> &[PropertyDescriptor] {
        &self.properties
    }

    pub fn constructors(&self) -> &[ConstructorDescriptor] {
        &self.constructors
    }

    /// Look up a property by exact name.
    pub fn property(&self, name: &str) -> Option<(usize, &PropertyDescriptor)> {
        self.properties
            .iter()
            .enumerate()
            .find(|(_, p)| p.name == name)
    }

    /// Look up a constructor by name.
    pub fn constructor(&self, name: &str) -> Option<(usize, &ConstructorDescriptor)> {
        self.constructors
            .iter()
            .enumerate()
            .find(|(_, c)| c.name == name)
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("name", &self.name)
            .field("properties", &self.properties)
            .field("constructors", &self.constructors)
            .finish()
    }
}

/// Builder returned by [`TypeDescriptor::builder`].
pub struct DescriptorBuilder<T> {
    name: &'static str,
    properties: Vec<PropertyDescriptor>,
    constructors: Vec<ConstructorDescriptor>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Reflect> DescriptorBuilder<T> {
    /// A stored property of type `V`.
    pub fn property<V: FieldValue>(
        self,
        name: &'static str,
        get: impl Fn(&T) -> Value + Send + Sync + 'static,
    ) -> Self {
        self.push_property::<V>(name, false, get)
    }

    /// A read-only property derived from other state.
    pub fn computed<V: FieldValue>(
        self,
        name: &'static str,
        get: impl Fn(&T) -> Value + Send + Sync + 'static,
    ) -> Self {
        self.push_property::<V>(name, true, get)
    }

    fn push_property<V: FieldValue>(
        mut self,
        name: &'static str,
        computed: bool,
        get: impl Fn(&T) -> Value + Send + Sync + 'static,
    ) -> Self {
        self.properties.push(PropertyDescriptor {
            name,
            declared_in: self.name,
            computed,
            shape: V::shape,
            read: Arc::new(move |object| downcast_ref::<T>(object).map(&get)),
        });
        self
    }

    /// Inherit every property of `B`, read through `project`.
    pub fn flatten<B: Reflect>(
        mut self,
        project: impl Fn(&T) -> &B + Send + Sync + 'static,
    ) -> Self {
        let project = Arc::new(project);
        for base in B::type_descriptor().properties() {
            let read = base.read.clone();
            let project = project.clone();
            self.properties.push(PropertyDescriptor {
                read: Arc::new(move |object| {
                    let this = downcast_ref::<T>(object)?;
                    let base: &dyn Reflect = project(this);
                    read(base)
                }),
                ..base.clone()
            });
        }
        self
    }

    /// A constructor taking `params`, in order.
    pub fn constructor(
        self,
        name: &'static str,
        params: &[&'static str],
        invoke: impl Fn(&mut Arguments<'_>) -> GraftResult<T> + Send + Sync + 'static,
    ) -> Self {
        self.push_constructor(name, params, false, invoke)
    }

    /// A constructor only used when an override selects it.
    pub fn hidden_constructor(
        self,
        name: &'static str,
        params: &[&'static str],
        invoke: impl Fn(&mut Arguments<'_>) -> GraftResult<T> + Send + Sync + 'static,
    ) -> Self {
        self.push_constructor(name, params, true, invoke)
    }

    fn push_constructor(
        mut self,
        name: &'static str,
        params: &[&'static str],
        hidden: bool,
        invoke: impl Fn(&mut Arguments<'_>) -> GraftResult<T> + Send + Sync + 'static,
    ) -> Self {
        self.constructors.push(ConstructorDescriptor {
            name,
            params: params.to_vec(),
            hidden,
            invoke: Arc::new(move |args| {
                invoke(args).map(|built| Arc::new(built) as Arc<dyn Reflect>)
            }),
        });
        self
    }

    pub fn build(self) -> TypeDescriptor {
        TypeDescriptor {
            name: self.name,
            type_id: TypeId::of::<T>(),
            properties: self.properties,
            constructors: self.constructors,
        }
    }
}
