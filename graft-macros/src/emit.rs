//! Code generation for the `Bean` / `Record` derives.

use proc_macro2::TokenStream;
use quote::quote;
use syn::DeriveInput;

use crate::parse::{self, FieldModel, FieldShape, ScalarKind};

/// Which derive is running.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Bean,
    Record,
}

pub fn expand(input: &DeriveInput, kind: Kind) -> syn::Result<TokenStream> {
    let model = parse::parse(input)?;
    let ty = &model.ident;
    let ty_name = ty.to_string();

    let properties: Vec<TokenStream> = model
        .fields
        .iter()
        .map(|field| property_entry(field, ty, &ty_name, kind))
        .collect();

    let patterns: Vec<TokenStream> = model
        .fields
        .iter()
        .flat_map(|field| {
            let name = &field.name;
            let mut calls = Vec::new();
            if let Some(pattern) = &field.date_pattern {
                calls.push(quote! { .date_pattern(#name, #pattern) });
            }
            if let Some(pattern) = &field.number_pattern {
                calls.push(quote! { .number_pattern(#name, #pattern) });
            }
            calls
        })
        .collect();

    let (node_kind, constructor) = match kind {
        Kind::Bean => (
            quote! { ::graft::NodeKind::Mutable },
            quote! {
                .instantiate(|| -> ::std::boxed::Box<dyn ::graft::Node> {
                    ::std::boxed::Box::new(<#ty as ::core::default::Default>::default())
                })
            },
        ),
        Kind::Record => {
            let extracts: Vec<TokenStream> = model
                .fields
                .iter()
                .map(|field| {
                    let ident = &field.ident;
                    let from = from_value_fn(&field.shape);
                    quote! {
                        #ident: #from(args.next().unwrap_or(::graft::Value::Null))?
                    }
                })
                .collect();
            (
                quote! { ::graft::NodeKind::Record },
                quote! {
                    .construct(|args: ::std::vec::Vec<::graft::Value>|
                        -> ::core::result::Result<
                            ::std::boxed::Box<dyn ::graft::Node>,
                            ::graft::BeansError,
                        >
                    {
                        let mut args = args.into_iter();
                        ::core::result::Result::Ok(::std::boxed::Box::new(#ty {
                            #(#extracts,)*
                        }))
                    })
                },
            )
        }
    };

    Ok(quote! {
        #[automatically_derived]
        impl ::graft::Graft for #ty {
            fn descriptor() -> &'static ::graft::TypeDescriptor {
                static DESC: ::std::sync::LazyLock<::graft::TypeDescriptor> =
                    ::std::sync::LazyLock::new(|| {
                        ::graft::TypeDescriptor::builder::<#ty>(#ty_name, #node_kind)
                            #constructor
                            #(#properties)*
                            #(#patterns)*
                            .build()
                    });
                ::std::sync::LazyLock::force(&DESC)
            }
        }

        #[automatically_derived]
        impl ::graft::Node for #ty {
            fn descriptor(&self) -> &'static ::graft::TypeDescriptor {
                <#ty as ::graft::Graft>::descriptor()
            }

            fn as_any(&self) -> &dyn ::core::any::Any {
                self
            }

            fn as_any_mut(&mut self) -> &mut dyn ::core::any::Any {
                self
            }

            fn into_any(self: ::std::boxed::Box<Self>) -> ::std::boxed::Box<dyn ::core::any::Any> {
                self
            }

            fn clone_node(&self) -> ::std::boxed::Box<dyn ::graft::Node> {
                ::std::boxed::Box::new(::core::clone::Clone::clone(self))
            }
        }
    })
}

fn property_entry(
    field: &FieldModel,
    ty: &syn::Ident,
    ty_name: &str,
    kind: Kind,
) -> TokenStream {
    let name = &field.name;
    let ident = &field.ident;
    let prop_ty = property_type(&field.shape);
    let read = read_expr(&field.shape, ident);

    let getter = quote! {
        ::core::option::Option::Some(
            |node: &dyn ::core::any::Any|
                -> ::core::result::Result<::graft::Value, ::graft::BeansError>
            {
                let node = ::graft::__private::downcast_ref::<#ty>(node, #ty_name)?;
                ::core::result::Result::Ok(#read)
            }
        )
    };

    let setter = match kind {
        Kind::Record => quote! { ::core::option::Option::None },
        Kind::Bean => {
            let from = from_value_fn(&field.shape);
            quote! {
                ::core::option::Option::Some(
                    |node: &mut dyn ::core::any::Any, value: ::graft::Value|
                        -> ::core::result::Result<(), ::graft::BeansError>
                    {
                        let node = ::graft::__private::downcast_mut::<#ty>(node, #ty_name)?;
                        node.#ident = #from(value)?;
                        ::core::result::Result::Ok(())
                    }
                )
            }
        }
    };

    quote! {
        .property(::graft::Property::new(#name, #prop_ty, #getter, #setter))
    }
}

fn scalar_type(kind: ScalarKind) -> TokenStream {
    match kind {
        ScalarKind::Bool => quote! { ::graft::ScalarType::Bool },
        ScalarKind::I16 => quote! { ::graft::ScalarType::I16 },
        ScalarKind::I32 => quote! { ::graft::ScalarType::I32 },
        ScalarKind::I64 => quote! { ::graft::ScalarType::I64 },
        ScalarKind::Decimal => quote! { ::graft::ScalarType::Decimal },
        ScalarKind::Str => quote! { ::graft::ScalarType::Str },
        ScalarKind::StrArray => quote! { ::graft::ScalarType::StrArray },
        ScalarKind::Bytes => quote! { ::graft::ScalarType::Bytes },
        ScalarKind::Date => quote! { ::graft::ScalarType::Date },
        ScalarKind::DateTime => quote! { ::graft::ScalarType::DateTime },
    }
}

fn property_type(shape: &FieldShape) -> TokenStream {
    match shape {
        FieldShape::Scalar(kind) => {
            let st = scalar_type(*kind);
            quote! { ::graft::PropertyType::Scalar(#st) }
        }
        FieldShape::Node(ty) => quote! {
            ::graft::PropertyType::Node(::graft::NodeType::of::<#ty>())
        },
        FieldShape::ScalarList(kind) => {
            let st = scalar_type(*kind);
            quote! { ::graft::PropertyType::List(::graft::ElementType::Scalar(#st)) }
        }
        FieldShape::NodeList(ty) => quote! {
            ::graft::PropertyType::List(::graft::ElementType::Node(::graft::NodeType::of::<#ty>()))
        },
    }
}

fn read_expr(shape: &FieldShape, ident: &syn::Ident) -> TokenStream {
    match shape {
        FieldShape::Scalar(_) => quote! {
            ::graft::__private::option_to_value(&node.#ident)
        },
        FieldShape::Node(_) => quote! {
            ::graft::__private::node_to_value(&node.#ident)
        },
        FieldShape::ScalarList(_) => quote! {
            ::graft::__private::scalar_list_to_value(&node.#ident)
        },
        FieldShape::NodeList(_) => quote! {
            ::graft::__private::node_list_to_value(&node.#ident)
        },
    }
}

fn from_value_fn(shape: &FieldShape) -> TokenStream {
    match shape {
        FieldShape::Scalar(_) => quote! { ::graft::__private::option_from_value },
        FieldShape::Node(_) => quote! { ::graft::__private::node_from_value },
        FieldShape::ScalarList(_) => quote! { ::graft::__private::scalar_list_from_value },
        FieldShape::NodeList(_) => quote! { ::graft::__private::node_list_from_value },
    }
}
