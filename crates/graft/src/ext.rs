//! Method syntax for [`Engine`] operations on shared objects.

use crate::engine::Engine;
use crate::path::IntoPath;
use crate::reflect::Reflect;
use crate::value::FieldValue;
use crate::GraftResult;
use std::sync::Arc;

/// `root.with_in(&engine, path, value)` instead of `engine.with(&root, path, value)`.
pub trait WithExt<T: Reflect> {
    fn with_in<V: FieldValue>(
        &self,
        engine: &Engine,
        path: impl IntoPath,
        value: V,
    ) -> GraftResult<Arc<T>>;

    fn convert_in<U: Reflect>(&self, engine: &Engine) -> GraftResult<Arc<U>>;
}

impl<T: Reflect> WithExt<T> for Arc<T> {
    fn with_in<V: FieldValue>(
        &self,
        engine: &Engine,
        path: impl IntoPath,
        value: V,
    ) -> GraftResult<Arc<T>> {
        engine.with(self, path, value)
    }

    fn convert_in<U: Reflect>(&self, engine: &Engine) -> GraftResult<Arc<U>> {
        engine.convert_from::<U, T>(self)
    }
}
