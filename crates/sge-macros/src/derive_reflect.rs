//! Implementation of the `#[derive(Reflect)]` macro.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{Data, DeriveInput, Fields, parse_macro_input};

use crate::attrs::{FieldAttrs, MemberKind, TypeAttrs};

pub fn derive_reflect_impl(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match derive_reflect_inner(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn derive_reflect_inner(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let name = &input.ident;

    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "Reflect cannot be derived for generic types",
        ));
    }

    let attrs = TypeAttrs::from_attrs(&input.attrs)?;
    let reflected_name = attrs.name.clone().unwrap_or_else(|| name.to_string());

    let capabilities = generate_capabilities(&attrs);
    let members = collect_members(input)?;

    Ok(quote! {
        impl ::sge::Reflect for #name {
            const NAME: &'static str = #reflected_name;

            fn reflect(
                builder: ::sge::NativeTypeInfoBuilder<Self>,
            ) -> ::core::result::Result<
                ::sge::NativeTypeInfoBuilder<Self>,
                ::sge::RegistrationError,
            > {
                let builder = builder #capabilities;
                #(let builder = #members?;)*
                ::core::result::Result::Ok(builder)
            }
        }
    })
}

/// Lifecycle and flag calls chained onto the builder.
fn generate_capabilities(attrs: &TypeAttrs) -> TokenStream2 {
    let mut calls = TokenStream2::new();
    if attrs.default {
        calls.extend(quote! { .default_init() });
    }
    if attrs.clone {
        calls.extend(quote! { .copyable() });
    }
    if attrs.eq {
        calls.extend(quote! { .equality() });
    }
    if attrs.no_construct {
        calls.extend(quote! { .flags(::sge::TypeFlags::SCRIPT_NOCONSTRUCT) });
    }
    calls
}

/// One registration expression per reflected field.
fn collect_members(input: &DeriveInput) -> syn::Result<Vec<TokenStream2>> {
    let name = &input.ident;
    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            Fields::Unit => return Ok(Vec::new()),
            Fields::Unnamed(_) => {
                return Err(syn::Error::new_spanned(
                    name,
                    "Reflect can only be derived for structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                name,
                "Reflect can only be derived for structs",
            ));
        }
    };

    let mut members = Vec::new();
    for field in fields {
        let field_attrs = FieldAttrs::from_attrs(&field.attrs)?;
        let Some(kind) = field_attrs.kind else {
            continue;
        };

        let Some(field_ident) = field.ident.as_ref() else {
            continue;
        };
        let member_name = field_attrs
            .name
            .clone()
            .unwrap_or_else(|| field_ident.to_string());

        let mut field_flags = vec![quote! { ::sge::FieldFlags::PUBLIC }];
        if field_attrs.readonly {
            field_flags.push(quote! { ::sge::FieldFlags::READONLY });
        }
        if field_attrs.transient {
            field_flags.push(quote! { ::sge::FieldFlags::TRANSIENT });
        }

        members.push(match kind {
            MemberKind::Field => quote! {
                unsafe {
                    builder.field_with_witness(
                        #member_name,
                        ::core::mem::offset_of!(#name, #field_ident),
                        |this: &#name| &this.#field_ident,
                        #(#field_flags)|*,
                    )
                }
            },
            MemberKind::Property => {
                let mut property_flags = vec![quote! { ::sge::PropertyFlags::empty() }];
                if field_attrs.editor_only {
                    property_flags.push(quote! { ::sge::PropertyFlags::EDITOR_ONLY });
                }
                if field_attrs.editor_hidden {
                    property_flags.push(quote! { ::sge::PropertyFlags::EDITOR_HIDDEN });
                }
                if field_attrs.collapsed {
                    property_flags.push(quote! { ::sge::PropertyFlags::EDITOR_DEFAULT_COLLAPSED });
                }
                let register = if field_attrs.readonly {
                    quote! { readonly_field_property_with_witness }
                } else {
                    quote! { field_property_with_witness }
                };
                quote! {
                    unsafe {
                        builder.#register(
                            #member_name,
                            ::core::mem::offset_of!(#name, #field_ident),
                            |this: &#name| &this.#field_ident,
                            #(#field_flags)|*,
                            #(#property_flags)|*,
                        )
                    }
                }
            }
        });
    }

    Ok(members)
}
