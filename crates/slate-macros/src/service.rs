//! `#[web_service]` expansion.
//!
//! The impl block is re-emitted unchanged apart from the stripped marker
//! attributes, followed by a `WebService` impl with:
//! 1. `service_info`: the reflected method table
//! 2. `invoke`: a match on the method name that takes each argument by
//!    position and converts the return value

use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::ItemImpl;

use crate::parse::{Output, ServiceImpl, ServiceMethod};

pub fn expand_web_service(attr: TokenStream, item: TokenStream) -> syn::Result<TokenStream> {
    if !attr.is_empty() {
        return Err(syn::Error::new_spanned(
            attr,
            "#[web_service] takes no arguments",
        ));
    }

    let mut item_impl: ItemImpl = syn::parse2(item)?;
    let service = ServiceImpl::from_impl(&mut item_impl)?;
    let generated = generate(&service);

    Ok(quote! {
        #item_impl
        #generated
    })
}

fn generate(service: &ServiceImpl) -> TokenStream {
    let self_ty = &service.self_ty;
    let name = &service.name;
    let meta = &service.meta;
    let service_meta = (!meta.is_empty()).then(|| quote!(.with_metadata(#meta)));
    let methods = service.methods.iter().map(method_info);
    let arms = service.methods.iter().map(invoke_arm);

    quote! {
        impl ::slate_core::WebService for #self_ty {
            fn service_info() -> ::slate_core::ServiceInfo {
                ::slate_core::ServiceInfo::new(#name)
                    #service_meta
                    #(.method(#methods))*
            }

            #[allow(unused_mut, unused_variables)]
            fn invoke(
                &self,
                method: &str,
                mut args: ::slate_core::Arguments,
            ) -> ::core::result::Result<::slate_core::Value, ::slate_core::ServiceError> {
                match method {
                    #(#arms)*
                    _ => ::core::result::Result::Err(
                        ::slate_core::ServiceError::unknown_method(method),
                    ),
                }
            }
        }
    }
}

fn method_info(method: &ServiceMethod) -> TokenStream {
    let name = method.ident.to_string();
    let path = method.path.as_ref().map(|p| quote!(.path(#p)));
    let params = method.params.iter().map(|param| {
        let name = &param.name;
        let ty = &param.ty;
        let source = param.source.map(|s| quote!(.source(#s)));
        let meta = &param.meta;
        let metadata = (!meta.is_empty()).then(|| quote!(.with_metadata(#meta)));
        quote! {
            .param(
                ::slate_core::ParamInfo::new(#name, ::slate_core::TypeRef::of::<#ty>())
                    #source
                    #metadata
            )
        }
    });
    let returns = method.output.documented();
    let meta = &method.meta;
    let metadata = (!meta.is_empty()).then(|| quote!(.with_metadata(#meta)));

    quote! {
        ::slate_core::MethodInfo::new(#name)
            #path
            #(#params)*
            .returns(::slate_core::TypeRef::of::<#returns>())
            #metadata
    }
}

fn invoke_arm(method: &ServiceMethod) -> TokenStream {
    let ident = &method.ident;
    let name = ident.to_string();
    let vars: Vec<_> = (0..method.params.len())
        .map(|i| format_ident!("__arg{}", i))
        .collect();
    let bindings = method.params.iter().enumerate().map(|(index, param)| {
        let var = &vars[index];
        let ty = &param.ty;
        quote!(let #var: #ty = args.take(#index)?;)
    });
    let call = quote!(self.#ident(#(#vars),*));

    let result = match &method.output {
        Output::Unit => quote! {{
            #call;
            ::slate_core::output::from_value(&())
        }},
        Output::Value(_) => quote!(::slate_core::output::from_value(&#call)),
        Output::Result(_) => quote!(::slate_core::output::from_result(#call)),
    };

    quote! {
        #name => {
            #(#bindings)*
            #result
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_service() {
        let item = quote! {
            impl Things {
                pub fn get_thing(&self, #[api(path)] id: u64) -> Thing {
                    Thing { id }
                }

                pub fn delete_thing(&self, id: u64) -> Result<(), Error> {
                    Ok(())
                }

                pub fn ping(&self) {}
            }
        };

        let out = expand_web_service(TokenStream::new(), item).unwrap().to_string();
        assert!(out.contains("impl :: slate_core :: WebService for Things"));
        assert!(out.contains("ServiceInfo :: new (\"Things\")"));
        assert!(out.contains("ParamSource :: Path"));
        assert!(out.contains("args . take (0usize)"));
        assert!(out.contains("output :: from_result (self . delete_thing (__arg0))"));
        assert!(out.contains("output :: from_value (& self . get_thing (__arg0))"));
        assert!(out.contains("TypeRef :: of :: < () >"));
        assert!(!out.contains("# [api"));
    }

    #[test]
    fn test_arguments_rejected() {
        let attr = quote!(name = "Things");
        let item = quote!(impl Things {});
        assert!(expand_web_service(attr, item).is_err());
    }

    #[test]
    fn test_empty_service() {
        let out = expand_web_service(TokenStream::new(), quote!(impl Things {}))
            .unwrap()
            .to_string();
        assert!(out.contains("unknown_method"));
    }
}
