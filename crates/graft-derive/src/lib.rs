//! Derive macro for the graft `Reflect` trait.
//!
//! This crate provides the `#[derive(Reflect)]` macro that generates:
//! - `impl Reflect for {Name}`: a lazily built `TypeDescriptor` listing the
//!   struct's properties and constructors
//! - `impl FieldValue for {Name}` when the struct is embedded by value
//!
//! # Usage
//!
//! ```ignore
//! use graft::Reflect;
//! use std::sync::Arc;
//!
//! #[derive(Debug, Reflect)]
//! struct Department {
//!     title: String,
//!     manager: Option<Arc<Employee>>,
//! }
//! ```

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

mod codegen;
mod parse;

/// Derive the `Reflect` trait for a struct with named fields.
///
/// Without attributes the struct gets one property per field and a single
/// memberwise constructor named `"memberwise"` taking every property in field
/// order.
///
/// # Attributes
///
/// ## Struct Attributes
///
/// - `#[graft(rename = "Name")]`: Type name used in descriptors and errors
/// - `#[graft(constructor(name = "new", params = "a, b"))]`: Rebuild through
///   `Self::new(a, b)`. Repeatable; replaces the memberwise constructor.
///   Add `hidden` to make it usable only through a strategy override.
/// - `#[graft(memberwise)]`: Keep the memberwise constructor next to explicit ones
/// - `#[graft(computed(name = "nick_name", ty = "String"))]`: Read-only property
///   backed by `fn nick_name(&self) -> String`. Repeatable.
/// - `#[graft(by_value)]`: The struct is embedded by value in other types
///   (requires `Clone`); also implements `FieldValue`.
///
/// ## Field Attributes
///
/// - `#[graft(rename = "name")]`: Use a different property name
/// - `#[graft(skip)]`: Not a property; the memberwise constructor uses `Default`
/// - `#[graft(flatten)]`: Inherit every property of the field's type. Requires
///   an explicit constructor.
///
/// # Examples
///
/// ```ignore
/// use graft::Reflect;
///
/// #[derive(Debug, Reflect)]
/// #[graft(constructor(name = "new", params = "user_name"))]
/// #[graft(computed(name = "nick_name", ty = "String"))]
/// struct Account {
///     user_name: String,
/// }
///
/// impl Account {
///     fn new(user_name: String) -> Self {
///         Self { user_name }
///     }
///
///     fn nick_name(&self) -> String {
///         format!("~{}~", self.user_name)
///     }
/// }
/// ```
#[proc_macro_derive(Reflect, attributes(graft))]
pub fn derive_reflect(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match codegen::expand(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}
