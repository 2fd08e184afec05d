//! Dynamic values flowing through the engine.
//!
//! Typed fields are converted to and from [`Value`] through [`FieldValue`].
//! Objects and lists are held behind `Arc`, so reading a property never
//! copies a subtree and pointer identity survives a round trip.

use crate::reflect::{Reflect, TypeDescriptor};
use crate::{GraftError, GraftResult, Path};
use parking_lot::{RwLock, RwLockReadGuard};
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use std::any::Any;
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// A property value read from, or written into, an object graph.
#[derive(Clone, Debug, Default)]
pub enum Value {
    /// Absent value (`None` fields).
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Uuid(Uuid),
    /// A reflected object, shared by reference.
    Object(Arc<dyn Reflect>),
    /// A list, shared by reference.
    List(Arc<dyn ListAccess>),
}

impl Value {
    /// Wrap a reflected object.
    pub fn object<T: Reflect>(object: Arc<T>) -> Self {
        Value::Object(object)
    }

    /// Returns true for [`Value::Null`].
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// The list, if this is a list value.
    pub fn as_list(&self) -> Option<&Arc<dyn ListAccess>> {
        match self {
            Value::List(l) => Some(l),
            _ => None,
        }
    }

    /// Short name of the value kind, used in error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::Uuid(_) => "uuid",
            Value::Object(_) => "object",
            Value::List(_) => "list",
        }
    }

    /// Reference identity: true when both values point at the same object or
    /// list allocation. Scalars are never identical.
    pub fn same_ref(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Object(a), Value::Object(b)) => same_allocation(a, b),
            (Value::List(a), Value::List(b)) => same_allocation(a, b),
            _ => false,
        }
    }
}

fn same_allocation<T: ?Sized>(a: &Arc<T>, b: &Arc<T>) -> bool {
    Arc::as_ptr(a) as *const () == Arc::as_ptr(b) as *const ()
}

/// Value equality: objects compare by type and stored properties, lists
/// element-wise. Identical references short-circuit.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Uuid(a), Value::Uuid(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => {
                same_allocation(a, b) || objects_equal(a.as_ref(), b.as_ref())
            }
            (Value::List(a), Value::List(b)) => {
                same_allocation(a, b)
                    || (a.len() == b.len() && (0..a.len()).all(|i| a.get(i) == b.get(i)))
            }
            _ => false,
        }
    }
}

fn objects_equal(a: &dyn Reflect, b: &dyn Reflect) -> bool {
    let descriptor = a.descriptor();
    if descriptor.type_id() != b.descriptor().type_id() {
        return false;
    }
    descriptor
        .properties()
        .iter()
        .filter(|p| !p.is_computed())
        .all(|p| p.read(a) == p.read(b))
}

/// Objects serialize as maps of their stored properties.
impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(n) => serializer.serialize_i64(*n),
            Value::Float(f) => serializer.serialize_f64(*f),
            Value::Str(s) => serializer.serialize_str(s),
            Value::Uuid(u) => u.serialize(serializer),
            Value::Object(o) => {
                let object = o.as_ref();
                let stored: Vec<_> = object
                    .descriptor()
                    .properties()
                    .iter()
                    .filter(|p| !p.is_computed())
                    .collect();
                let mut map = serializer.serialize_map(Some(stored.len()))?;
                for property in stored {
                    map.serialize_entry(
                        property.name(),
                        &property.read(object).unwrap_or_default(),
                    )?;
                }
                map.end()
            }
            Value::List(l) => {
                let mut seq = serializer.serialize_seq(Some(l.len()))?;
                for i in 0..l.len() {
                    seq.serialize_element(&l.get(i).unwrap_or_default())?;
                }
                seq.end()
            }
        }
    }
}

/// Static description of what a property holds. Drives path validation.
#[derive(Clone, Copy, Debug)]
pub enum Shape {
    /// A leaf value of the named kind.
    Scalar(&'static str),
    /// A reflected object of a known type.
    Object(&'static TypeDescriptor),
    /// A list; the function yields the element shape.
    List(fn() -> Shape),
    /// Only known at runtime (`Value` fields).
    Dynamic,
}

/// Conversion between a typed field and [`Value`].
///
/// Implemented for the scalar types, `Option<T>`, `Arc<T: Reflect>`, the list
/// types and `Value` itself. `#[derive(Reflect)]` with `#[graft(by_value)]`
/// implements it for the deriving type.
pub trait FieldValue: Sized + Send + Sync + 'static {
    /// Convert the field into a value. Objects and lists are shared, not copied.
    fn to_value(&self) -> Value;

    /// Convert a value back into the field type.
    fn from_value(value: Value) -> GraftResult<Self>;

    /// The shape of values of this type.
    fn shape() -> Shape;
}

fn mismatch(expected: &'static str, found: &Value) -> GraftError {
    GraftError::type_mismatch(Path::root(), expected, found.kind_name())
}

impl FieldValue for Value {
    fn to_value(&self) -> Value {
        self.clone()
    }

    fn from_value(value: Value) -> GraftResult<Self> {
        Ok(value)
    }

    fn shape() -> Shape {
        Shape::Dynamic
    }
}

impl FieldValue for bool {
    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }

    fn from_value(value: Value) -> GraftResult<Self> {
        match value {
            Value::Bool(b) => Ok(b),
            other => Err(mismatch("bool", &other)),
        }
    }

    fn shape() -> Shape {
        Shape::Scalar("bool")
    }
}

macro_rules! impl_int_field {
    ($($ty:ty),*) => {
        $(
            impl FieldValue for $ty {
                fn to_value(&self) -> Value {
                    Value::Int(i64::from(*self))
                }

                fn from_value(value: Value) -> GraftResult<Self> {
                    match value {
                        Value::Int(n) => <$ty>::try_from(n).map_err(|_| {
                            GraftError::type_mismatch(Path::root(), stringify!($ty), "int out of range")
                        }),
                        other => Err(mismatch("int", &other)),
                    }
                }

                fn shape() -> Shape {
                    Shape::Scalar("int")
                }
            }
        )*
    };
}

impl_int_field!(i8, i16, i32, i64, u8, u16, u32);

impl FieldValue for f64 {
    fn to_value(&self) -> Value {
        Value::Float(*self)
    }

    fn from_value(value: Value) -> GraftResult<Self> {
        match value {
            Value::Float(f) => Ok(f),
            Value::Int(n) => Ok(n as f64),
            other => Err(mismatch("float", &other)),
        }
    }

    fn shape() -> Shape {
        Shape::Scalar("float")
    }
}

impl FieldValue for String {
    fn to_value(&self) -> Value {
        Value::Str(self.clone())
    }

    fn from_value(value: Value) -> GraftResult<Self> {
        match value {
            Value::Str(s) => Ok(s),
            other => Err(mismatch("string", &other)),
        }
    }

    fn shape() -> Shape {
        Shape::Scalar("string")
    }
}

impl FieldValue for Uuid {
    fn to_value(&self) -> Value {
        Value::Uuid(*self)
    }

    fn from_value(value: Value) -> GraftResult<Self> {
        match value {
            Value::Uuid(u) => Ok(u),
            other => Err(mismatch("uuid", &other)),
        }
    }

    fn shape() -> Shape {
        Shape::Scalar("uuid")
    }
}

impl<T: FieldValue> FieldValue for Option<T> {
    fn to_value(&self) -> Value {
        match self {
            Some(v) => v.to_value(),
            None => Value::Null,
        }
    }

    fn from_value(value: Value) -> GraftResult<Self> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }

    fn shape() -> Shape {
        T::shape()
    }
}

impl<T: Reflect> FieldValue for Arc<T> {
    fn to_value(&self) -> Value {
        Value::Object(self.clone())
    }

    fn from_value(value: Value) -> GraftResult<Self> {
        let expected = T::type_descriptor().name();
        match value {
            Value::Object(object) => {
                let found = object.descriptor().name();
                object
                    .into_any_arc()
                    .downcast::<T>()
                    .map_err(|_| GraftError::type_mismatch(Path::root(), expected, found))
            }
            other => Err(mismatch(expected, &other)),
        }
    }

    fn shape() -> Shape {
        Shape::Object(T::type_descriptor())
    }
}

/// Type-erased access to a list held by a property.
pub trait ListAccess: Any + Send + Sync + fmt::Debug {
    /// Number of elements.
    fn len(&self) -> usize;

    /// Returns true if the list has no elements.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Read the element at `index`.
    fn get(&self, index: usize) -> Option<Value>;

    /// Whether [`ListAccess::set`] writes in place.
    fn is_shared(&self) -> bool;

    /// Check that `value` can be stored at `index` without writing it.
    fn accepts(&self, index: usize, value: &Value) -> GraftResult<()>;

    /// Overwrite the element at `index` in this list instance.
    fn set(&self, index: usize, value: Value) -> GraftResult<()>;

    /// A new list with the element at `index` replaced. Other elements are
    /// shared with this list.
    fn replaced(&self, index: usize, value: Value) -> GraftResult<Arc<dyn ListAccess>>;

    #[doc(hidden)]
    fn into_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

fn convert_element<T: FieldValue>(index: usize, len: usize, value: Value) -> GraftResult<T> {
    if index >= len {
        return Err(GraftError::index_out_of_bounds(Path::root(), index, len));
    }
    T::from_value(value).map_err(|e| e.with_prefix(&Path::root().index(index)))
}

struct SharedStore<T>(RwLock<Vec<T>>);

impl<T> fmt::Debug for SharedStore<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedStore")
            .field("len", &self.0.read().len())
            .finish()
    }
}

/// A list whose slots can be overwritten in place.
///
/// Cloning a `SharedList` clones the handle: every clone, and every object
/// rebuilt around it, observes in-place writes. This is the list type to use
/// when element updates should stay visible through the original graph.
#[derive(Debug)]
pub struct SharedList<T>(Arc<SharedStore<T>>);

impl<T> Clone for SharedList<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T: FieldValue + Clone> SharedList<T> {
    /// Create a list from its elements.
    pub fn new(items: Vec<T>) -> Self {
        Self(Arc::new(SharedStore(RwLock::new(items))))
    }

    /// Clone out the element at `index`.
    pub fn get(&self, index: usize) -> Option<T> {
        self.0 .0.read().get(index).cloned()
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.0 .0.read().len()
    }

    /// Returns true if the list has no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Borrow the elements.
    pub fn read(&self) -> RwLockReadGuard<'_, Vec<T>> {
        self.0 .0.read()
    }

    /// Returns true if both handles refer to the same list.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl<T: FieldValue + Clone> FromIterator<T> for SharedList<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<T: FieldValue + Clone> ListAccess for SharedStore<T> {
    fn len(&self) -> usize {
        self.0.read().len()
    }

    fn get(&self, index: usize) -> Option<Value> {
        self.0.read().get(index).map(FieldValue::to_value)
    }

    fn is_shared(&self) -> bool {
        true
    }

    fn accepts(&self, index: usize, value: &Value) -> GraftResult<()> {
        let len = self.0.read().len();
        convert_element::<T>(index, len, value.clone()).map(drop)
    }

    fn set(&self, index: usize, value: Value) -> GraftResult<()> {
        let mut items = self.0.write();
        let item = convert_element::<T>(index, items.len(), value)?;
        items[index] = item;
        Ok(())
    }

    fn replaced(&self, index: usize, value: Value) -> GraftResult<Arc<dyn ListAccess>> {
        let mut items = self.0.read().clone();
        items[index] = convert_element::<T>(index, items.len(), value)?;
        Ok(Arc::new(SharedStore(RwLock::new(items))))
    }

    fn into_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

impl<T: FieldValue + Clone> FieldValue for SharedList<T> {
    fn to_value(&self) -> Value {
        Value::List(self.0.clone())
    }

    fn from_value(value: Value) -> GraftResult<Self> {
        match value {
            Value::List(list) => list
                .into_any_arc()
                .downcast::<SharedStore<T>>()
                .map(SharedList)
                .map_err(|_| GraftError::type_mismatch(Path::root(), "shared list", "list")),
            other => Err(mismatch("list", &other)),
        }
    }

    fn shape() -> Shape {
        Shape::List(T::shape)
    }
}

struct FrozenStore<T>(Vec<T>);

impl<T> fmt::Debug for FrozenStore<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrozenStore")
            .field("len", &self.0.len())
            .finish()
    }
}

/// An immutable list. Index updates always produce a new list that shares the
/// untouched elements.
#[derive(Debug)]
pub struct FrozenList<T>(Arc<FrozenStore<T>>);

impl<T> Clone for FrozenList<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T: FieldValue + Clone> FrozenList<T> {
    /// Create a list from its elements.
    pub fn new(items: Vec<T>) -> Self {
        Self(Arc::new(FrozenStore(items)))
    }

    /// Returns true if both handles refer to the same list.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl<T> std::ops::Deref for FrozenList<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        &self.0 .0
    }
}

impl<T: FieldValue + Clone> FromIterator<T> for FrozenList<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<T: FieldValue + Clone> ListAccess for FrozenStore<T> {
    fn len(&self) -> usize {
        self.0.len()
    }

    fn get(&self, index: usize) -> Option<Value> {
        self.0.get(index).map(FieldValue::to_value)
    }

    fn is_shared(&self) -> bool {
        false
    }

    fn accepts(&self, index: usize, value: &Value) -> GraftResult<()> {
        convert_element::<T>(index, self.0.len(), value.clone()).map(drop)
    }

    fn set(&self, _index: usize, _value: Value) -> GraftResult<()> {
        Err(GraftError::immutable_list(Path::root()))
    }

    fn replaced(&self, index: usize, value: Value) -> GraftResult<Arc<dyn ListAccess>> {
        let item = convert_element::<T>(index, self.0.len(), value)?;
        let mut items = self.0.clone();
        items[index] = item;
        Ok(Arc::new(FrozenStore(items)))
    }

    fn into_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

impl<T: FieldValue + Clone> FieldValue for FrozenList<T> {
    fn to_value(&self) -> Value {
        Value::List(self.0.clone())
    }

    fn from_value(value: Value) -> GraftResult<Self> {
        match value {
            Value::List(list) => list
                .into_any_arc()
                .downcast::<FrozenStore<T>>()
                .map(FrozenList)
                .map_err(|_| GraftError::type_mismatch(Path::root(), "frozen list", "list")),
            other => Err(mismatch("list", &other)),
        }
    }

    fn shape() -> Shape {
        Shape::List(T::shape)
    }
}
