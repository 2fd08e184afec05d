//! Descriptor code generation.
//!
//! Generates the `Reflect` implementation: a lazily built `TypeDescriptor`
//! listing properties and constructors, plus `FieldValue` for by-value types.

use crate::parse::{ComputedInput, ConstructorInput, FieldInput, ReflectInput};
use proc_macro2::TokenStream;
use quote::{format_ident, quote};

/// Generate `impl Reflect` (and `impl FieldValue` for by-value types).
pub fn generate(input: &ReflectInput) -> syn::Result<TokenStream> {
    let struct_name = &input.ident;
    let type_name = input.type_name();
    let fields = input.fields();

    let properties = generate_properties(&fields)?;
    let computed = generate_computed(&input.computed)?;
    let mut constructors = TokenStream::new();
    for constructor in &input.constructors {
        constructors.extend(generate_constructor(constructor)?);
    }
    if input.has_memberwise() {
        constructors.extend(generate_memberwise(&fields)?);
    }
    let field_value = if input.by_value {
        generate_field_value(input)
    } else {
        TokenStream::new()
    };

    Ok(quote! {
        impl ::graft::Reflect for #struct_name {
            fn type_descriptor() -> &'static ::graft::TypeDescriptor {
                static DESCRIPTOR: ::std::sync::OnceLock<::graft::TypeDescriptor> =
                    ::std::sync::OnceLock::new();
                DESCRIPTOR.get_or_init(|| {
                    ::graft::TypeDescriptor::builder::<Self>(#type_name)
                        #properties
                        #computed
                        #constructors
                        .build()
                })
            }

            fn descriptor(&self) -> &'static ::graft::TypeDescriptor {
                <Self as ::graft::Reflect>::type_descriptor()
            }
        }

        #field_value
    })
}

fn ident_of(field: &FieldInput) -> syn::Result<&syn::Ident> {
    field
        .ident
        .as_ref()
        .ok_or_else(|| syn::Error::new_spanned(&field.ty, "named field required"))
}

/// One `.property(..)` or `.flatten(..)` call per included field.
fn generate_properties(fields: &[&FieldInput]) -> syn::Result<TokenStream> {
    let mut calls = TokenStream::new();
    for field in fields.iter().filter(|f| !f.skip) {
        let field_name = ident_of(field)?;
        let field_ty = &field.ty;
        if field.flatten {
            calls.extend(quote! {
                .flatten::<#field_ty>(|this: &Self| &this.#field_name)
            });
        } else {
            let property = field.property_name();
            calls.extend(quote! {
                .property::<#field_ty>(#property, |this: &Self| {
                    ::graft::FieldValue::to_value(&this.#field_name)
                })
            });
        }
    }
    Ok(calls)
}

fn generate_computed(computed: &[ComputedInput]) -> syn::Result<TokenStream> {
    let mut calls = TokenStream::new();
    for property in computed {
        let name = &property.name;
        let method = syn::parse_str::<syn::Ident>(name)?;
        let ty = syn::parse_str::<syn::Type>(&property.ty)?;
        calls.extend(quote! {
            .computed::<#ty>(#name, |this: &Self| {
                let value: #ty = this.#method();
                ::graft::FieldValue::to_value(&value)
            })
        });
    }
    Ok(calls)
}

fn args_ident(unused: bool) -> syn::Ident {
    if unused {
        format_ident!("_args")
    } else {
        format_ident!("args")
    }
}

/// A constructor calling `Self::name(args...)`.
fn generate_constructor(constructor: &ConstructorInput) -> syn::Result<TokenStream> {
    let name = &constructor.name;
    let function = syn::parse_str::<syn::Ident>(name)?;
    let params = constructor.param_names();
    let args = args_ident(params.is_empty());
    let takes = params.iter().map(|_| quote!(#args.take()?));
    let register = if constructor.hidden {
        format_ident!("hidden_constructor")
    } else {
        format_ident!("constructor")
    };

    Ok(quote! {
        .#register(#name, &[#(#params),*], |#args: &mut ::graft::Arguments<'_>| {
            ::std::result::Result::Ok(Self::#function(#(#takes),*))
        })
    })
}

/// A constructor taking every property in field order; skipped fields are
/// filled with `Default`.
fn generate_memberwise(fields: &[&FieldInput]) -> syn::Result<TokenStream> {
    let args = args_ident(fields.iter().all(|f| f.skip));
    let mut params = Vec::new();
    let mut inits = Vec::new();
    for field in fields {
        let field_name = ident_of(field)?;
        if field.skip {
            inits.push(quote!(#field_name: ::std::default::Default::default()));
        } else {
            params.push(field.property_name());
            inits.push(quote!(#field_name: #args.take()?));
        }
    }

    Ok(quote! {
        .constructor("memberwise", &[#(#params),*], |#args: &mut ::graft::Arguments<'_>| {
            ::std::result::Result::Ok(Self { #(#inits),* })
        })
    })
}

/// `FieldValue` for types embedded by value: values are boxed into an `Arc`
/// on read and cloned out on write.
fn generate_field_value(input: &ReflectInput) -> TokenStream {
    let struct_name = &input.ident;
    quote! {
        impl ::graft::FieldValue for #struct_name {
            fn to_value(&self) -> ::graft::Value {
                ::graft::Value::Object(::std::sync::Arc::new(::std::clone::Clone::clone(self)))
            }

            fn from_value(value: ::graft::Value) -> ::graft::GraftResult<Self> {
                <::std::sync::Arc<Self> as ::graft::FieldValue>::from_value(value)
                    .map(|this| ::std::clone::Clone::clone(&*this))
            }

            fn shape() -> ::graft::Shape {
                ::graft::Shape::Object(<Self as ::graft::Reflect>::type_descriptor())
            }
        }
    }
}
