//! Parsing logic for the Reflect derive macro.

use darling::{ast, FromDeriveInput, FromField, FromMeta};
use syn::{Generics, Ident, Type};

/// Parsed struct-level options.
#[derive(Debug, FromDeriveInput)]
#[darling(attributes(graft), supports(struct_named))]
pub struct ReflectInput {
    /// The struct identifier.
    pub ident: Ident,

    /// Generic parameters (rejected during validation).
    pub generics: Generics,

    /// Struct data (fields).
    pub data: ast::Data<(), FieldInput>,

    /// Type name exposed in descriptors and error messages.
    #[darling(default)]
    pub rename: Option<String>,

    /// Embed the type by value: also implement `FieldValue` for it.
    #[darling(default)]
    pub by_value: bool,

    /// Keep the memberwise constructor next to explicit ones.
    #[darling(default)]
    pub memberwise: bool,

    /// Explicit constructors, in declaration order.
    #[darling(multiple, rename = "constructor")]
    pub constructors: Vec<ConstructorInput>,

    /// Read-only properties backed by `&self` methods.
    #[darling(multiple, rename = "computed")]
    pub computed: Vec<ComputedInput>,
}

impl ReflectInput {
    /// Get the fields as a vector.
    pub fn fields(&self) -> Vec<&FieldInput> {
        self.data
            .as_ref()
            .take_struct()
            .map(|s| s.fields.to_vec())
            .unwrap_or_default()
    }

    /// The type name used in descriptors.
    pub fn type_name(&self) -> String {
        self.rename
            .clone()
            .unwrap_or_else(|| self.ident.to_string())
    }

    /// Whether a memberwise constructor is generated.
    pub fn has_memberwise(&self) -> bool {
        self.constructors.is_empty() || self.memberwise
    }
}

/// `#[graft(constructor(name = "new", params = "a, b", hidden))]`
#[derive(Debug, FromMeta)]
pub struct ConstructorInput {
    /// Associated function to call.
    pub name: String,

    /// Comma-separated parameter names, in call order.
    #[darling(default)]
    pub params: String,

    /// Only usable through a strategy override.
    #[darling(default)]
    pub hidden: bool,
}

impl ConstructorInput {
    pub fn param_names(&self) -> Vec<String> {
        self.params
            .split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// `#[graft(computed(name = "nick_name", ty = "String"))]`
#[derive(Debug, FromMeta)]
pub struct ComputedInput {
    /// Property name and method name.
    pub name: String,

    /// Property type.
    pub ty: String,
}

/// Parsed field-level options.
#[derive(Debug, FromField)]
#[darling(attributes(graft))]
pub struct FieldInput {
    /// Field identifier.
    pub ident: Option<Ident>,

    /// Field type.
    pub ty: Type,

    /// Property name, if different from the field name.
    #[darling(default)]
    pub rename: Option<String>,

    /// Not a property; filled with `Default` by the memberwise constructor.
    #[darling(default)]
    pub skip: bool,

    /// Inherit the properties of the field's type.
    #[darling(default)]
    pub flatten: bool,
}

impl FieldInput {
    /// The property name for this field.
    pub fn property_name(&self) -> String {
        match (&self.rename, &self.ident) {
            (Some(name), _) => name.clone(),
            (None, Some(ident)) => ident.to_string(),
            (None, None) => String::new(),
        }
    }
}
