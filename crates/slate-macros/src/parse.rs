//! Attribute parsing shared by the derive and the service macro.
//!
//! Three attribute families are read:
//! - `#[serde(...)]`, so reflected names match wire names
//! - `#[api(...)]`, the service markers
//! - `#[annotate(...)]` and `///` doc comments, which become metadata

use heck::{
    ToKebabCase, ToLowerCamelCase, ToShoutyKebabCase, ToShoutySnakeCase, ToSnakeCase,
    ToUpperCamelCase,
};
use proc_macro2::TokenStream;
use quote::{quote, ToTokens};
use syn::{
    ext::IdentExt, meta::ParseNestedMeta, punctuated::Punctuated, spanned::Spanned, Attribute,
    Expr, ExprLit, FnArg, GenericArgument, Ident, ImplItem, ItemImpl, Lit, LitStr, Meta, Pat,
    PathArguments, ReturnType, Token, Type, Visibility,
};

/// Case conversion from `#[serde(rename_all = "...")]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenameRule {
    Lower,
    Upper,
    Pascal,
    Camel,
    Snake,
    ScreamingSnake,
    Kebab,
    ScreamingKebab,
}

impl RenameRule {
    fn parse(lit: &str, span: proc_macro2::Span) -> syn::Result<Self> {
        Ok(match lit {
            "lowercase" => Self::Lower,
            "UPPERCASE" => Self::Upper,
            "PascalCase" => Self::Pascal,
            "camelCase" => Self::Camel,
            "snake_case" => Self::Snake,
            "SCREAMING_SNAKE_CASE" => Self::ScreamingSnake,
            "kebab-case" => Self::Kebab,
            "SCREAMING-KEBAB-CASE" => Self::ScreamingKebab,
            other => {
                return Err(syn::Error::new(
                    span,
                    format!("unknown rename rule: {other}"),
                ))
            }
        })
    }

    /// Renames a `snake_case` field.
    pub fn apply_to_field(self, field: &str) -> String {
        match self {
            Self::Lower | Self::Snake => field.to_string(),
            Self::Upper | Self::ScreamingSnake => field.to_ascii_uppercase(),
            Self::Pascal => field.to_upper_camel_case(),
            Self::Camel => field.to_lower_camel_case(),
            Self::Kebab => field.replace('_', "-"),
            Self::ScreamingKebab => field.replace('_', "-").to_ascii_uppercase(),
        }
    }

    /// Renames a `PascalCase` variant.
    pub fn apply_to_variant(self, variant: &str) -> String {
        match self {
            Self::Lower => variant.to_ascii_lowercase(),
            Self::Upper => variant.to_ascii_uppercase(),
            Self::Pascal => variant.to_string(),
            Self::Camel => variant.to_lower_camel_case(),
            Self::Snake => variant.to_snake_case(),
            Self::ScreamingSnake => variant.to_shouty_snake_case(),
            Self::Kebab => variant.to_kebab_case(),
            Self::ScreamingKebab => variant.to_shouty_kebab_case(),
        }
    }
}

/// Container-level serde settings.
#[derive(Debug, Default)]
pub struct SerdeContainer {
    pub rename: Option<String>,
    pub rename_all: Option<RenameRule>,
    pub tag: Option<String>,
    pub default: bool,
    pub transparent: bool,
}

impl SerdeContainer {
    pub fn from_attrs(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut container = Self::default();
        for attr in attrs.iter().filter(|a| a.path().is_ident("serde")) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("rename") {
                    container.rename = serialized_name(&meta)?;
                } else if meta.path.is_ident("rename_all") {
                    if let Some(rule) = serialized_name(&meta)? {
                        container.rename_all = Some(RenameRule::parse(&rule, meta.path.span())?);
                    }
                } else if meta.path.is_ident("tag") {
                    container.tag = Some(meta.value()?.parse::<LitStr>()?.value());
                } else if meta.path.is_ident("default") {
                    skip_meta(&meta)?;
                    container.default = true;
                } else if meta.path.is_ident("transparent") {
                    container.transparent = true;
                } else {
                    skip_meta(&meta)?;
                }
                Ok(())
            })?;
        }
        Ok(container)
    }
}

/// Field or variant serde settings.
#[derive(Debug, Default)]
pub struct SerdeField {
    pub rename: Option<String>,
    pub skip: bool,
    pub default: bool,
    pub flatten: bool,
}

impl SerdeField {
    pub fn from_attrs(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut field = Self::default();
        for attr in attrs.iter().filter(|a| a.path().is_ident("serde")) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("rename") {
                    field.rename = serialized_name(&meta)?;
                } else if meta.path.is_ident("skip") || meta.path.is_ident("skip_serializing") {
                    field.skip = true;
                } else if meta.path.is_ident("default") {
                    skip_meta(&meta)?;
                    field.default = true;
                } else if meta.path.is_ident("flatten") {
                    field.flatten = true;
                } else {
                    skip_meta(&meta)?;
                }
                Ok(())
            })?;
        }
        Ok(field)
    }
}

/// Reads `name = "x"` or `name(serialize = "x", ...)`.
fn serialized_name(meta: &ParseNestedMeta<'_>) -> syn::Result<Option<String>> {
    if meta.input.peek(Token![=]) {
        return Ok(Some(meta.value()?.parse::<LitStr>()?.value()));
    }
    let mut serialize = None;
    meta.parse_nested_meta(|inner| {
        if inner.path.is_ident("serialize") {
            serialize = Some(inner.value()?.parse::<LitStr>()?.value());
        } else {
            skip_meta(&inner)?;
        }
        Ok(())
    })?;
    Ok(serialize)
}

/// Consumes the value of a serde key this crate does not interpret.
fn skip_meta(meta: &ParseNestedMeta<'_>) -> syn::Result<()> {
    if meta.input.peek(Token![=]) {
        meta.value()?.parse::<Expr>()?;
    } else if meta.input.peek(syn::token::Paren) {
        meta.parse_nested_meta(|inner| skip_meta(&inner))?;
    }
    Ok(())
}

/// One `#[annotate(Name, key = "value", ...)]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotate {
    pub name: String,
    pub entries: Vec<(String, String)>,
}

impl Annotate {
    fn from_attr(attr: &Attribute) -> syn::Result<Self> {
        let items = attr.parse_args_with(Punctuated::<Meta, Token![,]>::parse_terminated)?;
        let mut items = items.into_iter();

        let name = match items.next() {
            Some(Meta::Path(path)) => path
                .get_ident()
                .map(Ident::to_string)
                .ok_or_else(|| syn::Error::new(path.span(), "expected annotation name"))?,
            Some(other) => {
                return Err(syn::Error::new(
                    other.span(),
                    "the first argument of #[annotate] is the annotation name",
                ))
            }
            None => return Err(syn::Error::new(attr.span(), "expected annotation name")),
        };

        let mut entries = Vec::new();
        for item in items {
            let Meta::NameValue(nv) = item else {
                return Err(syn::Error::new(item.span(), "expected key = value"));
            };
            let key = nv
                .path
                .get_ident()
                .ok_or_else(|| syn::Error::new(nv.path.span(), "expected identifier"))?
                .to_string();
            let value = match &nv.value {
                Expr::Lit(ExprLit { lit, .. }) => match lit {
                    Lit::Str(s) => s.value(),
                    Lit::Int(i) => i.base10_digits().to_string(),
                    Lit::Bool(b) => b.value.to_string(),
                    _ => return Err(syn::Error::new(lit.span(), "unsupported literal")),
                },
                other => return Err(syn::Error::new(other.span(), "expected literal")),
            };
            entries.push((key, value));
        }

        Ok(Self { name, entries })
    }
}

/// Doc comment and annotations of one element, rendered as a
/// `slate_core::Metadata` expression.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ElementMeta {
    pub doc: Option<String>,
    pub annotations: Vec<Annotate>,
}

impl ElementMeta {
    pub fn from_attrs(attrs: &[Attribute]) -> syn::Result<Self> {
        let annotations = attrs
            .iter()
            .filter(|a| is_annotate(a))
            .map(Annotate::from_attr)
            .collect::<syn::Result<Vec<_>>>()?;
        Ok(Self {
            doc: doc_text(attrs),
            annotations,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.doc.is_none() && self.annotations.is_empty()
    }
}

impl ToTokens for ElementMeta {
    fn to_tokens(&self, tokens: &mut TokenStream) {
        let mut expr = match &self.doc {
            Some(doc) => quote!(::slate_core::Metadata::doc(#doc)),
            None => quote!(::slate_core::Metadata::new()),
        };
        for annotation in &self.annotations {
            let name = &annotation.name;
            let keys = annotation.entries.iter().map(|(k, _)| k);
            let values = annotation.entries.iter().map(|(_, v)| v);
            expr = quote! {
                #expr.with(::slate_core::Annotation::new(#name)#(.with(#keys, #values))*)
            };
        }
        tokens.extend(expr);
    }
}

/// Joins `///` lines, dropping the single leading space rustdoc keeps.
pub fn doc_text(attrs: &[Attribute]) -> Option<String> {
    let lines: Vec<String> = attrs
        .iter()
        .filter(|a| a.path().is_ident("doc"))
        .filter_map(|a| match &a.meta {
            Meta::NameValue(nv) => match &nv.value {
                Expr::Lit(ExprLit {
                    lit: Lit::Str(s), ..
                }) => Some(s.value()),
                _ => None,
            },
            _ => None,
        })
        .map(|line| line.strip_prefix(' ').unwrap_or(&line).trim_end().to_string())
        .collect();

    let text = lines.join("\n");
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

fn is_api(attr: &Attribute) -> bool {
    attr.path().is_ident("api")
}

fn is_annotate(attr: &Attribute) -> bool {
    attr.path().is_ident("annotate")
}

/// Parameter source marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Path,
    Query,
    Body,
}

impl ToTokens for Source {
    fn to_tokens(&self, tokens: &mut TokenStream) {
        tokens.extend(match self {
            Self::Path => quote!(::slate_core::ParamSource::Path),
            Self::Query => quote!(::slate_core::ParamSource::Query),
            Self::Body => quote!(::slate_core::ParamSource::Body),
        });
    }
}

/// `#[api(path = "...")]` and `#[api(skip)]` on a method.
#[derive(Debug, Default)]
pub struct MethodAttrs {
    pub path: Option<String>,
    pub skip: bool,
    pub present: bool,
}

impl MethodAttrs {
    pub fn from_attrs(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut parsed = Self::default();
        for attr in attrs.iter().filter(|a| is_api(a)) {
            parsed.present = true;
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("path") {
                    parsed.path = Some(meta.value()?.parse::<LitStr>()?.value());
                } else if meta.path.is_ident("skip") {
                    parsed.skip = true;
                } else {
                    return Err(meta.error("expected `path = \"...\"` or `skip`"));
                }
                Ok(())
            })?;
        }
        Ok(parsed)
    }
}

/// `#[api(path | query | body, doc = "...")]` on a parameter.
#[derive(Debug, Default)]
pub struct ParamAttrs {
    pub source: Option<Source>,
    pub doc: Option<String>,
}

impl ParamAttrs {
    pub fn from_attrs(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut parsed = Self::default();
        for attr in attrs.iter().filter(|a| is_api(a)) {
            attr.parse_nested_meta(|meta| {
                let source = if meta.path.is_ident("path") {
                    Source::Path
                } else if meta.path.is_ident("query") {
                    Source::Query
                } else if meta.path.is_ident("body") {
                    Source::Body
                } else if meta.path.is_ident("doc") {
                    parsed.doc = Some(meta.value()?.parse::<LitStr>()?.value());
                    return Ok(());
                } else {
                    return Err(meta.error("expected `path`, `query`, `body` or `doc = \"...\"`"));
                };
                if parsed.source.replace(source).is_some() {
                    return Err(meta.error("parameter source given twice"));
                }
                Ok(())
            })?;
        }
        Ok(parsed)
    }
}

/// What a service method returns.
#[derive(Debug, Clone)]
pub enum Output {
    /// Nothing.
    Unit,
    /// A plain value.
    Value(Type),
    /// `Result<T, E>`: `T` is documented, `E` becomes a fault.
    Result(Type),
}

impl Output {
    fn from_return(output: &ReturnType) -> Self {
        let ReturnType::Type(_, ty) = output else {
            return Self::Unit;
        };
        if let Type::Tuple(tuple) = &**ty {
            if tuple.elems.is_empty() {
                return Self::Unit;
            }
        }
        match result_ok_type(ty) {
            Some(ok) => Self::Result(ok.clone()),
            None => Self::Value((**ty).clone()),
        }
    }

    /// The type documented as the response.
    pub fn documented(&self) -> TokenStream {
        match self {
            Self::Unit => quote!(()),
            Self::Value(ty) | Self::Result(ty) => ty.to_token_stream(),
        }
    }
}

/// Returns `T` for `Result<T, E>` and single-argument aliases like
/// `anyhow::Result<T>`.
fn result_ok_type(ty: &Type) -> Option<&Type> {
    let Type::Path(type_path) = ty else {
        return None;
    };
    let segment = type_path.path.segments.last()?;
    if segment.ident != "Result" {
        return None;
    }
    let PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    match args.args.first()? {
        GenericArgument::Type(ok) if args.args.len() <= 2 => Some(ok),
        _ => None,
    }
}

/// A reflected method parameter.
#[derive(Debug)]
pub struct ServiceParam {
    pub name: String,
    pub ty: Type,
    pub source: Option<Source>,
    pub meta: ElementMeta,
}

/// A reflected method.
#[derive(Debug)]
pub struct ServiceMethod {
    pub ident: Ident,
    pub path: Option<String>,
    pub params: Vec<ServiceParam>,
    pub output: Output,
    pub meta: ElementMeta,
}

/// A `#[web_service]` impl block.
#[derive(Debug)]
pub struct ServiceImpl {
    pub name: String,
    pub self_ty: Type,
    pub meta: ElementMeta,
    pub methods: Vec<ServiceMethod>,
}

impl ServiceImpl {
    /// Reads the reflected methods and strips `#[api]` and `#[annotate]`
    /// from the block so it compiles as plain Rust.
    pub fn from_impl(item: &mut ItemImpl) -> syn::Result<Self> {
        if let Some((_, path, _)) = &item.trait_ {
            return Err(syn::Error::new(
                path.span(),
                "#[web_service] goes on an inherent impl block",
            ));
        }
        if !item.generics.params.is_empty() {
            return Err(syn::Error::new(
                item.generics.span(),
                "#[web_service] does not support generic impl blocks",
            ));
        }

        let name = match &*item.self_ty {
            Type::Path(type_path) => type_path
                .path
                .segments
                .last()
                .map(|s| s.ident.unraw().to_string()),
            _ => None,
        }
        .ok_or_else(|| syn::Error::new(item.self_ty.span(), "expected a named service type"))?;

        let meta = ElementMeta::from_attrs(&item.attrs)?;
        item.attrs.retain(|a| !is_annotate(a));

        let mut methods = Vec::new();
        for impl_item in &mut item.items {
            let ImplItem::Fn(method) = impl_item else {
                continue;
            };

            let attrs = MethodAttrs::from_attrs(&method.attrs)?;
            let meta = ElementMeta::from_attrs(&method.attrs)?;
            method.attrs.retain(|a| !is_api(a) && !is_annotate(a));

            let reflected = matches!(method.vis, Visibility::Public(_))
                && method
                    .sig
                    .receiver()
                    .is_some_and(|r| r.reference.is_some() && r.mutability.is_none());

            let mut params = Vec::new();
            for input in &mut method.sig.inputs {
                let FnArg::Typed(pat_type) = input else {
                    continue;
                };
                let param_attrs = ParamAttrs::from_attrs(&pat_type.attrs)?;
                let annotations = ElementMeta::from_attrs(&pat_type.attrs)?.annotations;
                pat_type.attrs.retain(|a| !is_api(a) && !is_annotate(a));

                if !reflected || attrs.skip {
                    continue;
                }

                let Pat::Ident(pat_ident) = &*pat_type.pat else {
                    return Err(syn::Error::new(
                        pat_type.pat.span(),
                        "service parameters must be plain identifiers",
                    ));
                };
                if let Type::Reference(reference) = &*pat_type.ty {
                    return Err(syn::Error::new(
                        reference.span(),
                        "service parameters must be owned types",
                    ));
                }

                params.push(ServiceParam {
                    name: pat_ident.ident.unraw().to_string(),
                    ty: (*pat_type.ty).clone(),
                    source: param_attrs.source,
                    meta: ElementMeta {
                        doc: param_attrs.doc,
                        annotations,
                    },
                });
            }

            if !reflected {
                if attrs.present {
                    return Err(syn::Error::new(
                        method.sig.ident.span(),
                        "#[api] applies only to `pub fn(&self, ..)` methods",
                    ));
                }
                continue;
            }
            if attrs.skip {
                continue;
            }
            if let Some(asyncness) = &method.sig.asyncness {
                return Err(syn::Error::new(
                    asyncness.span(),
                    "service methods must be synchronous",
                ));
            }
            if !method.sig.generics.params.is_empty() {
                return Err(syn::Error::new(
                    method.sig.generics.span(),
                    "service methods cannot be generic",
                ));
            }

            methods.push(ServiceMethod {
                ident: method.sig.ident.clone(),
                path: attrs.path,
                params,
                output: Output::from_return(&method.sig.output),
                meta,
            });
        }

        Ok(Self {
            name,
            self_ty: (*item.self_ty).clone(),
            meta,
            methods,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::{parse_quote, DeriveInput};

    #[test]
    fn test_rename_rules() {
        assert_eq!(RenameRule::Camel.apply_to_field("class_name"), "className");
        assert_eq!(RenameRule::Kebab.apply_to_field("class_name"), "class-name");
        assert_eq!(RenameRule::ScreamingSnake.apply_to_field("id"), "ID");
        assert_eq!(RenameRule::Snake.apply_to_variant("SubClass"), "sub_class");
        assert_eq!(RenameRule::Lower.apply_to_variant("SubClass"), "subclass");
        assert_eq!(RenameRule::Camel.apply_to_variant("SubClass"), "subClass");
    }

    #[test]
    fn test_serde_container() {
        let input: DeriveInput = parse_quote! {
            #[derive(Serialize)]
            #[serde(rename = "Shape", rename_all = "camelCase", tag = "className")]
            #[serde(deny_unknown_fields, bound(serialize = "T: Serialize"))]
            enum Figure {}
        };
        let container = SerdeContainer::from_attrs(&input.attrs).unwrap();
        assert_eq!(container.rename.as_deref(), Some("Shape"));
        assert_eq!(container.rename_all, Some(RenameRule::Camel));
        assert_eq!(container.tag.as_deref(), Some("className"));
        assert!(!container.default);
    }

    #[test]
    fn test_unknown_rename_rule() {
        let input: DeriveInput = parse_quote! {
            #[serde(rename_all = "Title Case")]
            struct Thing {}
        };
        assert!(SerdeContainer::from_attrs(&input.attrs).is_err());
    }

    #[test]
    fn test_serde_field() {
        let input: DeriveInput = parse_quote! {
            struct Thing {
                #[serde(rename(serialize = "ser", deserialize = "de"), default = "default_id")]
                id: u64,
                #[serde(skip, with = "module")]
                cache: u64,
            }
        };
        let syn::Data::Struct(data) = input.data else {
            panic!("expected struct");
        };
        let fields: Vec<_> = data.fields.iter().collect();

        let id = SerdeField::from_attrs(&fields[0].attrs).unwrap();
        assert_eq!(id.rename.as_deref(), Some("ser"));
        assert!(id.default);
        assert!(!id.skip);

        assert!(SerdeField::from_attrs(&fields[1].attrs).unwrap().skip);
    }

    #[test]
    fn test_doc_text() {
        let input: DeriveInput = parse_quote! {
            /// Fetches a thing.
            ///
            /// Second paragraph.
            struct Thing;
        };
        assert_eq!(
            doc_text(&input.attrs).as_deref(),
            Some("Fetches a thing.\n\nSecond paragraph.")
        );

        let input: DeriveInput = parse_quote!(struct Bare;);
        assert_eq!(doc_text(&input.attrs), None);
    }

    #[test]
    fn test_annotate() {
        let input: DeriveInput = parse_quote! {
            #[annotate(Documentation, value = "A thing", returns = "The thing", order = 2)]
            struct Thing;
        };
        let meta = ElementMeta::from_attrs(&input.attrs).unwrap();
        assert_eq!(
            meta.annotations,
            vec![Annotate {
                name: "Documentation".to_string(),
                entries: vec![
                    ("value".to_string(), "A thing".to_string()),
                    ("returns".to_string(), "The thing".to_string()),
                    ("order".to_string(), "2".to_string()),
                ],
            }]
        );
        assert!(!meta.is_empty());
    }

    #[test]
    fn test_annotate_requires_name() {
        let input: DeriveInput = parse_quote! {
            #[annotate(value = "A thing")]
            struct Thing;
        };
        assert!(ElementMeta::from_attrs(&input.attrs).is_err());
    }

    #[test]
    fn test_service_impl() {
        let mut item: ItemImpl = parse_quote! {
            impl Things {
                pub fn new() -> Self { Things }

                /// Fetches a thing.
                #[annotate(Audit, level = "low")]
                pub fn get_thing(&self, #[api(path, doc = "Thing id")] id: u64) -> Thing {
                    todo!()
                }

                #[api(path = "/things/{id}/label")]
                pub fn put_label(&self, id: u64, #[api(body)] label: String) -> Result<(), Error> {
                    todo!()
                }

                #[api(skip)]
                pub fn get_hidden(&self) -> u64 { 0 }

                fn helper(&self) {}
            }
        };

        let service = ServiceImpl::from_impl(&mut item).unwrap();
        assert_eq!(service.name, "Things");
        let names: Vec<_> = service.methods.iter().map(|m| m.ident.to_string()).collect();
        assert_eq!(names, vec!["get_thing", "put_label"]);

        let get = &service.methods[0];
        assert_eq!(get.meta.doc.as_deref(), Some("Fetches a thing."));
        assert_eq!(get.meta.annotations[0].name, "Audit");
        assert_eq!(get.params[0].source, Some(Source::Path));
        assert_eq!(get.params[0].meta.doc.as_deref(), Some("Thing id"));
        assert!(matches!(get.output, Output::Value(_)));

        let put = &service.methods[1];
        assert_eq!(put.path.as_deref(), Some("/things/{id}/label"));
        assert_eq!(put.params[0].source, None);
        assert_eq!(put.params[1].source, Some(Source::Body));
        assert!(matches!(put.output, Output::Result(Type::Tuple(_))));

        let rendered = item.to_token_stream().to_string();
        assert!(!rendered.contains("api"));
        assert!(!rendered.contains("annotate"));
        assert!(rendered.contains("doc"));
    }

    #[test]
    fn test_service_impl_errors() {
        let mut trait_impl: ItemImpl = parse_quote! {
            impl Service for Things {}
        };
        assert!(ServiceImpl::from_impl(&mut trait_impl).is_err());

        let mut async_method: ItemImpl = parse_quote! {
            impl Things {
                pub async fn get_thing(&self) -> u64 { 0 }
            }
        };
        assert!(ServiceImpl::from_impl(&mut async_method).is_err());

        let mut borrowed: ItemImpl = parse_quote! {
            impl Things {
                pub fn get_thing(&self, name: &str) -> u64 { 0 }
            }
        };
        assert!(ServiceImpl::from_impl(&mut borrowed).is_err());

        let mut misplaced: ItemImpl = parse_quote! {
            impl Things {
                #[api(path = "/x")]
                fn get_thing(&self) -> u64 { 0 }
            }
        };
        assert!(ServiceImpl::from_impl(&mut misplaced).is_err());

        let mut twice: ItemImpl = parse_quote! {
            impl Things {
                pub fn get_thing(&self, #[api(path, query)] id: u64) -> u64 { id }
            }
        };
        assert!(ServiceImpl::from_impl(&mut twice).is_err());
    }

    #[test]
    fn test_result_alias() {
        let ty: Type = parse_quote!(anyhow::Result<Thing>);
        assert!(result_ok_type(&ty).is_some());
        let ty: Type = parse_quote!(Vec<Thing>);
        assert!(result_ok_type(&ty).is_none());
        assert!(matches!(
            Output::from_return(&parse_quote!(-> ())),
            Output::Unit
        ));
    }
}
