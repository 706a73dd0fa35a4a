use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::ext::IdentExt;
use syn::parse::{Parse, ParseStream};
use syn::punctuated::Punctuated;
use syn::{Data, DeriveInput, Fields, LitStr, Token, Visibility, parse_macro_input};

pub(super) fn derive_record(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn expand(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let name = &input.ident;
    let unsupported_error_msg = "`Record` can only be derived for structs with named fields";

    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "`Record` cannot be derived for generic types",
        ));
    }

    let Data::Struct(data_struct) = &input.data else {
        return Err(syn::Error::new_spanned(name, unsupported_error_msg));
    };
    let Fields::Named(named) = &data_struct.fields else {
        return Err(syn::Error::new_spanned(name, unsupported_error_msg));
    };

    let mut accessors = Vec::new();
    let mut fields = Vec::new();
    let mut error: Option<syn::Error> = None;

    for (index, field) in named.named.iter().enumerate() {
        let Some(field_ident) = &field.ident else {
            continue;
        };
        let attrs = match FieldAttrs::from_field(field) {
            Ok(attrs) => attrs,
            Err(e) => {
                if let Some(old) = &mut error {
                    old.combine(e);
                } else {
                    error = Some(e);
                }
                continue;
            }
        };

        let accessor = format_ident!("__instruct_field_{}", index);
        accessors.push(quote! {
            fn #accessor(
                record: &mut dyn ::core::any::Any,
            ) -> ::core::option::Option<&mut dyn ::core::any::Any> {
                match record.downcast_mut::<#name>() {
                    ::core::option::Option::Some(record) => ::core::option::Option::Some(
                        &mut record.#field_ident as &mut dyn ::core::any::Any,
                    ),
                    ::core::option::Option::None => ::core::option::Option::None,
                }
            }
        });

        let field_name = field_ident.unraw().to_string();
        let ty = &field.ty;
        let tag = attrs.tag.map(|tag| quote! { .tag(#tag) });
        let visible = matches!(field.vis, Visibility::Public(_)).then(|| quote! { .visible() });
        let flatten = attrs.flatten.then(|| quote! { .flatten() });
        fields.push(quote! {
            ::instruct::Field::new(#field_name, ::instruct::shape_of::<#ty>, #accessor)
                #tag
                #visible
                #flatten
        });
    }

    if let Some(err) = error {
        return Err(err);
    }

    let type_identifier = name.unraw().to_string();
    Ok(quote! {
        #[automatically_derived]
        impl ::instruct::Reflect for #name {
            const SHAPE: &'static ::instruct::Shape = &const {
                #(#accessors)*

                const FIELDS: &[::instruct::Field] = &[#(#fields),*];

                ::instruct::ShapeBuilder::<#name>::new(#type_identifier)
                    .def(::instruct::Def::Struct(::instruct::StructType::new(FIELDS)))
                    .with_default()
                    .build()
            };
        }

        #[automatically_derived]
        impl ::instruct::Record for #name {}
    })
}

/// What `#[instruct(...)]` attributes say about one field.
#[derive(Default)]
struct FieldAttrs {
    tag: Option<LitStr>,
    flatten: bool,
}

impl FieldAttrs {
    fn from_field(field: &syn::Field) -> syn::Result<Self> {
        let mut attrs = FieldAttrs::default();
        for attr in &field.attrs {
            if !attr.path().is_ident("instruct") {
                continue;
            }
            let args =
                attr.parse_args_with(Punctuated::<FieldArg, Token![,]>::parse_terminated)?;
            for arg in args {
                match arg {
                    FieldArg::Tag(tag) => {
                        if attrs.tag.is_some() {
                            return Err(syn::Error::new_spanned(
                                tag,
                                "a field can only have one directive",
                            ));
                        }
                        attrs.tag = Some(tag);
                    }
                    FieldArg::Flatten => attrs.flatten = true,
                }
            }
        }
        Ok(attrs)
    }
}

/// A single argument of `#[instruct(...)]`.
enum FieldArg {
    /// A directive, e.g. `"header,name=x-id"`.
    Tag(LitStr),
    /// `flatten`
    Flatten,
}

impl Parse for FieldArg {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let lookahead = input.lookahead1();
        if lookahead.peek(LitStr) {
            input.parse().map(FieldArg::Tag)
        } else if lookahead.peek(syn::Ident) {
            let ident: syn::Ident = input.parse()?;
            if ident == "flatten" {
                Ok(FieldArg::Flatten)
            } else {
                Err(syn::Error::new_spanned(
                    ident,
                    "expected a directive string or `flatten`",
                ))
            }
        } else {
            Err(lookahead.error())
        }
    }
}
