//! `#[derive(ApiModel)]` expansion.

use proc_macro2::TokenStream;
use quote::quote;
use syn::{
    ext::IdentExt, parse_quote, spanned::Spanned, Data, DataEnum, DeriveInput, Fields,
    FieldsNamed, Type,
};

use crate::parse::{ElementMeta, SerdeContainer, SerdeField};

/// How the generated `type_info` is produced.
enum Body {
    /// Forward to another type, as serde does for newtypes.
    Delegate(Type),
    /// Build a `TypeInfo` for `Self` with this `TypeKind` expression.
    Kind(TokenStream),
}

pub fn expand_api_model(input: DeriveInput) -> syn::Result<TokenStream> {
    if let Some(lifetime) = input.generics.lifetimes().next() {
        return Err(syn::Error::new(
            lifetime.span(),
            "ApiModel types must be 'static; remove the lifetime parameter",
        ));
    }

    let container = SerdeContainer::from_attrs(&input.attrs)?;
    let meta = ElementMeta::from_attrs(&input.attrs)?;

    let body = match &input.data {
        Data::Struct(data) => struct_body(&data.fields, &container)?,
        Data::Enum(data) => Body::Kind(enum_kind(&input, data, &container)?),
        Data::Union(data) => {
            return Err(syn::Error::new(
                data.union_token.span,
                "ApiModel cannot be derived for unions",
            ))
        }
    };

    let ident = &input.ident;
    let mut generics = input.generics.clone();
    for param in generics.type_params_mut() {
        param.bounds.push(parse_quote!(::slate_core::ApiModel));
    }
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let type_info = match body {
        Body::Delegate(inner) => quote! {
            <#inner as ::slate_core::ApiModel>::type_info()
        },
        Body::Kind(kind) => {
            let name = container
                .rename
                .clone()
                .unwrap_or_else(|| ident.unraw().to_string());
            let type_args: Vec<_> = input.generics.type_params().map(|p| &p.ident).collect();
            let generics = (!type_args.is_empty()).then(|| {
                quote! {
                    .with_generics(::std::vec![#(::slate_core::TypeRef::of::<#type_args>()),*])
                }
            });
            let metadata = (!meta.is_empty()).then(|| quote!(.with_metadata(#meta)));
            quote! {
                ::slate_core::TypeInfo::new::<Self>(#name, #kind)
                    .in_module(::core::module_path!())
                    #generics
                    #metadata
            }
        }
    };

    Ok(quote! {
        impl #impl_generics ::slate_core::ApiModel for #ident #ty_generics #where_clause {
            fn type_info() -> ::slate_core::TypeInfo {
                #type_info
            }
        }
    })
}

fn struct_body(fields: &Fields, container: &SerdeContainer) -> syn::Result<Body> {
    match fields {
        Fields::Named(named) if container.transparent => {
            let mut kept = named
                .named
                .iter()
                .filter(|f| !SerdeField::from_attrs(&f.attrs).is_ok_and(|s| s.skip));
            match (kept.next(), kept.next()) {
                (Some(field), None) => Ok(Body::Delegate(field.ty.clone())),
                _ => Err(syn::Error::new(
                    named.span(),
                    "#[serde(transparent)] needs exactly one serialized field",
                )),
            }
        }
        Fields::Named(named) => Ok(Body::Kind(object_kind(named, container)?)),
        Fields::Unnamed(unnamed) if unnamed.unnamed.len() == 1 => {
            Ok(Body::Delegate(unnamed.unnamed[0].ty.clone()))
        }
        Fields::Unnamed(unnamed) => Err(syn::Error::new(
            unnamed.span(),
            "ApiModel supports tuple structs with exactly one field",
        )),
        Fields::Unit => Ok(Body::Kind(quote!(::slate_core::TypeKind::Unit))),
    }
}

fn object_kind(fields: &FieldsNamed, container: &SerdeContainer) -> syn::Result<TokenStream> {
    let mut infos = Vec::new();

    for field in &fields.named {
        let serde = SerdeField::from_attrs(&field.attrs)?;
        if serde.skip {
            continue;
        }
        if serde.flatten {
            return Err(syn::Error::new(
                field.span(),
                "#[serde(flatten)] is not supported by ApiModel",
            ));
        }

        let Some(ident) = &field.ident else {
            continue;
        };
        let declared = ident.unraw().to_string();
        let wire = serde.rename.unwrap_or_else(|| match container.rename_all {
            Some(rule) => rule.apply_to_field(&declared),
            None => declared,
        });

        let ty = &field.ty;
        let mut info = quote! {
            ::slate_core::FieldInfo::new(#wire, ::slate_core::TypeRef::of::<#ty>())
        };
        if serde.default || container.default {
            info = quote!(#info.with_default());
        }
        let meta = ElementMeta::from_attrs(&field.attrs)?;
        if !meta.is_empty() {
            info = quote!(#info.with_metadata(#meta));
        }
        infos.push(info);
    }

    Ok(quote! {
        ::slate_core::TypeKind::Object(::std::vec![#(#infos),*])
    })
}

fn enum_kind(
    input: &DeriveInput,
    data: &DataEnum,
    container: &SerdeContainer,
) -> syn::Result<TokenStream> {
    let mut variants = Vec::new();
    for variant in &data.variants {
        let serde = SerdeField::from_attrs(&variant.attrs)?;
        if serde.skip {
            continue;
        }
        let wire = serde.rename.unwrap_or_else(|| {
            let declared = variant.ident.unraw().to_string();
            match container.rename_all {
                Some(rule) => rule.apply_to_variant(&declared),
                None => declared,
            }
        });
        variants.push((wire, variant));
    }

    if variants.iter().all(|(_, v)| matches!(v.fields, Fields::Unit)) {
        let names = variants.iter().map(|(wire, _)| wire);
        return Ok(quote! {
            ::slate_core::TypeKind::Enum(::std::vec![#(::std::string::String::from(#names)),*])
        });
    }

    let Some(tag) = &container.tag else {
        return Err(syn::Error::new(
            input.ident.span(),
            "ApiModel enums must be unit-only, or use #[serde(tag = \"...\")] with newtype variants",
        ));
    };

    let mut table = quote!(::slate_core::Polymorphism::new(#tag));
    for (wire, variant) in &variants {
        let ty = match &variant.fields {
            Fields::Unnamed(unnamed) if unnamed.unnamed.len() == 1 => &unnamed.unnamed[0].ty,
            _ => {
                return Err(syn::Error::new(
                    variant.span(),
                    "tagged ApiModel enums need newtype variants, e.g. `Circle(Circle)`",
                ))
            }
        };
        table = quote! {
            #table.variant(#wire, ::slate_core::TypeRef::of::<#ty>())
        };
    }

    Ok(quote!(::slate_core::TypeKind::Polymorphic(#table)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expand(input: DeriveInput) -> String {
        expand_api_model(input).unwrap().to_string()
    }

    #[test]
    fn test_struct_fields_use_wire_names() {
        let out = expand(parse_quote! {
            /// A thing.
            #[serde(rename_all = "camelCase")]
            struct Thing {
                thing_id: u64,
                #[serde(rename = "label")]
                name: Option<String>,
                #[serde(default)]
                tags: Vec<String>,
                #[serde(skip)]
                cache: u64,
            }
        });
        assert!(out.contains("\"thingId\""));
        assert!(out.contains("\"label\""));
        assert!(out.contains("with_default"));
        assert!(!out.contains("cache"));
        assert!(out.contains("Metadata :: doc"));
        assert!(out.contains("module_path"));
    }

    #[test]
    fn test_generic_struct_gets_bounds() {
        let out = expand(parse_quote! {
            struct Page<T> {
                items: Vec<T>,
            }
        });
        assert!(out.contains("T : :: slate_core :: ApiModel"));
        assert!(out.contains("with_generics"));
    }

    #[test]
    fn test_unit_enum() {
        let out = expand(parse_quote! {
            #[serde(rename_all = "lowercase")]
            enum Color { Red, DarkBlue }
        });
        assert!(out.contains("TypeKind :: Enum"));
        assert!(out.contains("\"darkblue\""));
    }

    #[test]
    fn test_tagged_enum_is_polymorphic() {
        let out = expand(parse_quote! {
            #[serde(tag = "className")]
            enum SuperClass {
                SubClass1(SubClass1),
                #[serde(rename = "Second")]
                SubClass2(SubClass2),
            }
        });
        assert!(out.contains("Polymorphism :: new (\"className\")"));
        assert!(out.contains("\"SubClass1\""));
        assert!(out.contains("\"Second\""));
    }

    #[test]
    fn test_newtype_delegates() {
        let out = expand(parse_quote!(struct Id(u64);));
        assert!(out.contains("< u64 as :: slate_core :: ApiModel > :: type_info"));

        let out = expand(parse_quote! {
            #[serde(transparent)]
            struct Wrapper { inner: String }
        });
        assert!(out.contains("< String as :: slate_core :: ApiModel >"));
    }

    #[test]
    fn test_rejected_shapes() {
        let untagged: DeriveInput = parse_quote! {
            enum Mixed { A, B(u64) }
        };
        assert!(expand_api_model(untagged).is_err());

        let struct_variant: DeriveInput = parse_quote! {
            #[serde(tag = "kind")]
            enum Shape { Circle { radius: f64 } }
        };
        assert!(expand_api_model(struct_variant).is_err());

        let borrowed: DeriveInput = parse_quote! {
            struct Name<'a> { value: &'a str }
        };
        assert!(expand_api_model(borrowed).is_err());

        let pair: DeriveInput = parse_quote!(struct Pair(u8, u8););
        assert!(expand_api_model(pair).is_err());

        let flattened: DeriveInput = parse_quote! {
            struct Outer { #[serde(flatten)] inner: Inner }
        };
        assert!(expand_api_model(flattened).is_err());
    }
}
