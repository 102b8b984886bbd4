use crate::attrs::{
    FieldType, Kind, KindAttr, is_param_attr, method_kind, param_binding, strip_kind_attrs, strip_param_attrs,
};
use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::spanned::Spanned;
use syn::{FnArg, ImplItem, ImplItemFn, ItemImpl, Path, ReturnType, Type, parse_macro_input, parse_quote};

/// Declaration statements generated for one annotated method
struct MethodDeclaration {
    annotation: TokenStream2,
    params: Vec<TokenStream2>,
    body: TokenStream2,
}

/// Whether the method's return type is spelled `Result<..>`.
///
/// Aliases such as `ResolveResult` need `#[query(result)]`.
fn returns_result(method: &ImplItemFn) -> bool {
    let ReturnType::Type(_, ty) = &method.sig.output else {
        return false;
    };
    match ty.as_ref() {
        Type::Path(type_path) => type_path
            .path
            .segments
            .last()
            .is_some_and(|segment| segment.ident == "Result"),
        _ => false,
    }
}

fn has_ref_self(method: &ImplItemFn) -> bool {
    matches!(
        method.sig.inputs.first(),
        Some(FnArg::Receiver(receiver)) if receiver.reference.is_some() && receiver.mutability.is_none()
    )
}

fn annotation(krate: &Path, method: &str, attr: &KindAttr) -> TokenStream2 {
    let name = attr.name.as_ref();
    match attr.kind {
        Kind::Query => match name {
            Some(name) => quote! { resolver.query_with(#method, #krate::QueryOptions::named(#name)); },
            None => quote! { resolver.query(#method); },
        },
        Kind::Mutation => match name {
            Some(name) => quote! { resolver.mutation_with(#method, #krate::MutationOptions::named(#name)); },
            None => quote! { resolver.mutation(#method); },
        },
        Kind::Subscription => {
            if name.is_none() && attr.filter.is_none() {
                return quote! { resolver.subscription(#method); };
            }
            let mut options = match name {
                Some(name) => quote! { #krate::SubscriptionOptions::named(#name) },
                None => quote! { <#krate::SubscriptionOptions as ::std::default::Default>::default() },
            };
            if let Some(filter) = &attr.filter {
                options = quote! { #options.with_filter(#krate::SubscriptionFilter::new(#filter)) };
            }
            quote! { resolver.subscription_with(#method, #options); }
        }
        Kind::Field => {
            let type_ref = match &attr.field_type {
                Some(FieldType::Named(type_name)) => quote! { #type_name },
                Some(FieldType::Class(ty)) => quote! { #krate::TypeRef::class::<#ty>() },
                None => quote! { "" },
            };
            let mut options = quote! { #krate::FieldOptions::of(#type_ref) };
            if let Some(name) = name {
                options = quote! { #options.with_name(#name) };
            }
            quote! { resolver.field(#method, #options); }
        }
    }
}

/// Build the declaration of one annotated method and strip its attributes
fn declare_method(krate: &Path, method: &mut ImplItemFn, attr: &KindAttr) -> syn::Result<MethodDeclaration> {
    let ident = method.sig.ident.clone();
    let name = ident.to_string();
    let is_async = method.sig.asyncness.is_some();

    if !has_ref_self(method) {
        return Err(syn::Error::new(
            method.sig.span(),
            format!("#[{}] methods must take `&self`", attr.kind.as_str()),
        ));
    }

    let mut params = Vec::new();
    let mut bindings = Vec::new();
    let mut call_args = Vec::new();

    for (index, arg) in method.sig.inputs.iter_mut().skip(1).enumerate() {
        let FnArg::Typed(pat_type) = arg else {
            continue;
        };
        if let Some(binding) = param_binding(&pat_type.attrs)? {
            params.push(binding.declare(&name, index));
        }
        pat_type.attrs = strip_param_attrs(&pat_type.attrs);

        let var = format_ident!("__arg{}", index);
        let ty = &pat_type.ty;
        bindings.push(quote! { let #var: #ty = args.extract(#index)?; });
        call_args.push(var);
    }

    if attr.kind == Kind::Subscription {
        if !call_args.is_empty() {
            return Err(syn::Error::new(
                method.sig.inputs.span(),
                "#[subscription] methods take no parameters besides `&self`",
            ));
        }
        let body = if is_async {
            quote! {
                resolver.async_source(#name, |this: ::std::sync::Arc<Self>| async move {
                    #krate::IntoEventSource::into_event_source(this.#ident().await)
                });
            }
        } else {
            quote! {
                resolver.source(#name, |this: &Self| {
                    #krate::IntoEventSource::into_event_source(this.#ident())
                });
            }
        };
        return Ok(MethodDeclaration {
            annotation: annotation(krate, &name, attr),
            params,
            body,
        });
    }

    let args_ident = if call_args.is_empty() {
        quote! { _args }
    } else {
        quote! { mut args }
    };
    let call = if is_async {
        quote! { this.#ident(#(#call_args),*).await }
    } else {
        quote! { this.#ident(#(#call_args),*) }
    };
    let output = if attr.result || returns_result(method) {
        quote! { #krate::resolve_output(#call) }
    } else {
        quote! { #krate::resolve_output(::std::result::Result::Ok::<_, ::std::convert::Infallible>(#call)) }
    };

    let body = if is_async {
        quote! {
            resolver.async_method(#name, |this: ::std::sync::Arc<Self>, #args_ident: #krate::MethodArgs| async move {
                #(#bindings)*
                #output
            });
        }
    } else {
        quote! {
            resolver.method(#name, |this: &Self, #args_ident: #krate::MethodArgs| -> #krate::ResolveResult {
                #(#bindings)*
                #output
            });
        }
    };

    Ok(MethodDeclaration {
        annotation: annotation(krate, &name, attr),
        params,
        body,
    })
}

/// Reject parameter bindings on methods that are not resolvers
fn check_unannotated(method: &ImplItemFn) -> syn::Result<()> {
    for arg in &method.sig.inputs {
        if let FnArg::Typed(pat_type) = arg {
            if pat_type.attrs.iter().any(is_param_attr) {
                return Err(syn::Error::new(
                    pat_type.span(),
                    "parameter bindings require #[query], #[mutation] or #[field] on the method",
                ));
            }
        }
    }
    Ok(())
}

fn crate_path(attr: TokenStream) -> syn::Result<Path> {
    let mut krate: Path = parse_quote!(::armature_graphql);
    if attr.is_empty() {
        return Ok(krate);
    }

    let parser = syn::meta::parser(|meta| {
        if meta.path.is_ident("crate") {
            krate = meta.value()?.parse()?;
            Ok(())
        } else {
            Err(meta.error("unsupported #[resolver] option; expected `crate = path`"))
        }
    });
    syn::parse::Parser::parse(parser, attr)?;
    Ok(krate)
}

pub fn resolver_impl(attr: TokenStream, item: TokenStream) -> TokenStream {
    let krate = match crate_path(attr) {
        Ok(krate) => krate,
        Err(e) => return e.to_compile_error().into(),
    };
    let input = parse_macro_input!(item as ItemImpl);

    match expand(&krate, input) {
        Ok(expanded) => TokenStream::from(expanded),
        Err(e) => e.to_compile_error().into(),
    }
}

fn expand(krate: &Path, mut input: ItemImpl) -> syn::Result<TokenStream2> {
    if let Some((_, path, _)) = &input.trait_ {
        return Err(syn::Error::new(path.span(), "#[resolver] applies to inherent impl blocks"));
    }

    let mut declarations = Vec::new();
    let mut errors: Option<syn::Error> = None;
    let mut push_error = |error: syn::Error| match &mut errors {
        Some(errors) => errors.combine(error),
        None => errors = Some(error),
    };

    for item in &mut input.items {
        let ImplItem::Fn(method) = item else {
            continue;
        };

        match method_kind(&method.attrs) {
            Ok(Some(attr)) => {
                method.attrs = strip_kind_attrs(&method.attrs);
                match declare_method(krate, method, &attr) {
                    Ok(declaration) => declarations.push(declaration),
                    Err(error) => push_error(error),
                }
            }
            Ok(None) => {
                if let Err(error) = check_unannotated(method) {
                    push_error(error);
                }
            }
            Err(error) => push_error(error),
        }
    }

    if let Some(errors) = errors {
        return Err(errors);
    }

    let self_ty = &input.self_ty;
    let (impl_generics, _, where_clause) = input.generics.split_for_impl();
    let annotations = declarations.iter().map(|d| &d.annotation);
    let params = declarations.iter().flat_map(|d| &d.params);
    let bodies = declarations.iter().map(|d| &d.body);

    Ok(quote! {
        #input

        impl #impl_generics #krate::Resolver for #self_ty #where_clause {
            fn declare(resolver: &mut #krate::Declaration<Self>) {
                #(#annotations)*
                #(#params)*
                #(#bodies)*
            }
        }
    })
}
