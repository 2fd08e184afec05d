//! Code generation for the Reflect derive macro.

mod descriptor;

use crate::parse::ReflectInput;
use darling::FromDeriveInput;
use proc_macro2::TokenStream;
use syn::{DeriveInput, Type};

/// Main entry point for code generation.
pub fn expand(input: &DeriveInput) -> syn::Result<TokenStream> {
    let parsed = ReflectInput::from_derive_input(input)
        .map_err(|e| syn::Error::new_spanned(input, e.to_string()))?;

    if !parsed.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &parsed.generics,
            "#[derive(Reflect)] does not support generic types. \
             Each type needs its own descriptor; wrap the concrete instantiation instead.",
        ));
    }

    let mut properties = Vec::new();
    for field in parsed.fields() {
        if field.flatten && field.rename.is_some() {
            return Err(syn::Error::new_spanned(
                &field.ty,
                "#[graft(flatten)] and #[graft(rename)] cannot be used together. \
                 Flattened properties keep the names declared on the inner type.",
            ));
        }

        if field.flatten && field.skip {
            return Err(syn::Error::new_spanned(
                &field.ty,
                "#[graft(flatten)] and #[graft(skip)] cannot be used together.",
            ));
        }

        if field.flatten {
            if !is_plain_type(&field.ty) {
                return Err(syn::Error::new_spanned(
                    &field.ty,
                    "#[graft(flatten)] only supports fields whose type implements Reflect \
                     directly (not Option, Arc or lists).",
                ));
            }
            if parsed.constructors.is_empty() || parsed.memberwise {
                return Err(syn::Error::new_spanned(
                    &field.ty,
                    "#[graft(flatten)] requires an explicit #[graft(constructor(...))]. \
                     A flattened field cannot be rebuilt memberwise.",
                ));
            }
        }

        if !field.skip && !field.flatten {
            properties.push(field.property_name());
        }
    }

    for constructor in &parsed.constructors {
        if syn::parse_str::<syn::Ident>(&constructor.name).is_err() {
            return Err(syn::Error::new_spanned(
                &parsed.ident,
                format!("constructor name '{}' is not an identifier", constructor.name),
            ));
        }
    }

    for computed in &parsed.computed {
        if properties.contains(&computed.name) {
            return Err(syn::Error::new_spanned(
                &parsed.ident,
                format!(
                    "computed property '{}' clashes with a stored property",
                    computed.name
                ),
            ));
        }
    }

    descriptor::generate(&parsed)
}

/// True for a path type with no wrapper such as `Option`, `Arc` or a list.
fn is_plain_type(ty: &Type) -> bool {
    const WRAPPERS: [&str; 5] = ["Option", "Arc", "SharedList", "FrozenList", "Vec"];
    match ty {
        Type::Path(type_path) => type_path
            .path
            .segments
            .last()
            .map(|seg| !WRAPPERS.contains(&seg.ident.to_string().as_str()))
            .unwrap_or(false),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    fn expand_err(input: DeriveInput) -> String {
        expand(&input).unwrap_err().to_string()
    }

    #[test]
    fn test_rejects_generics() {
        let err = expand_err(parse_quote! {
            struct Boxed<T> {
                inner: T,
            }
        });
        assert!(err.contains("generic"));
    }

    #[test]
    fn test_flatten_requires_constructor() {
        let err = expand_err(parse_quote! {
            struct Derived {
                #[graft(flatten)]
                base: Base,
                extra: i64,
            }
        });
        assert!(err.contains("explicit"));
    }

    #[test]
    fn test_flatten_rejects_wrappers() {
        let err = expand_err(parse_quote! {
            #[graft(constructor(name = "new", params = "base"))]
            struct Derived {
                #[graft(flatten)]
                base: Option<Base>,
            }
        });
        assert!(err.contains("flatten"));
    }

    #[test]
    fn test_flatten_rename_conflict() {
        let err = expand_err(parse_quote! {
            #[graft(constructor(name = "new", params = "id"))]
            struct Derived {
                #[graft(flatten, rename = "b")]
                base: Base,
            }
        });
        assert!(err.contains("cannot be used together"));
    }

    #[test]
    fn test_computed_clash() {
        let err = expand_err(parse_quote! {
            #[graft(computed(name = "first", ty = "String"))]
            struct Employee {
                first: String,
            }
        });
        assert!(err.contains("clashes"));
    }

    #[test]
    fn test_expands_plain_struct() {
        let tokens = expand(&parse_quote! {
            struct Employee {
                first: String,
                #[graft(skip)]
                cache: u64,
            }
        })
        .unwrap()
        .to_string();
        assert!(tokens.contains("\"memberwise\""));
        assert!(tokens.contains("\"first\""));
        assert!(!tokens.contains("\"cache\""));
    }
}
