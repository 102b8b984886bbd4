use proc_macro2::Span;
use quote::{ToTokens, quote};
use syn::spanned::Spanned;
use syn::{Attribute, Expr, LitStr, Meta, Type};

/// Method annotation kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Kind {
    Query,
    Mutation,
    Subscription,
    Field,
}

impl Kind {
    fn from_attr(attr: &Attribute) -> Option<Self> {
        let ident = attr.path().get_ident()?;
        match ident.to_string().as_str() {
            "query" => Some(Kind::Query),
            "mutation" => Some(Kind::Mutation),
            "subscription" => Some(Kind::Subscription),
            "field" => Some(Kind::Field),
            _ => None,
        }
    }

    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            Kind::Query => "query",
            Kind::Mutation => "mutation",
            Kind::Subscription => "subscription",
            Kind::Field => "field",
        }
    }
}

/// Target type of a `#[field]` method
pub(crate) enum FieldType {
    Named(LitStr),
    Class(Type),
}

/// A parsed `#[query]`, `#[mutation]`, `#[subscription]` or `#[field]`
pub(crate) struct KindAttr {
    pub kind: Kind,
    pub name: Option<LitStr>,
    pub filter: Option<Expr>,
    pub field_type: Option<FieldType>,
    /// The return type is a `Result` under another name
    pub result: bool,
    pub span: Span,
}

impl KindAttr {
    fn parse(attr: &Attribute, kind: Kind) -> syn::Result<Self> {
        let mut parsed = KindAttr {
            kind,
            name: None,
            filter: None,
            field_type: None,
            result: false,
            span: attr.span(),
        };

        if !matches!(attr.meta, Meta::Path(_)) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("name") {
                    parsed.name = Some(meta.value()?.parse()?);
                } else if meta.path.is_ident("filter") && kind == Kind::Subscription {
                    parsed.filter = Some(meta.value()?.parse()?);
                } else if meta.path.is_ident("result") && kind != Kind::Subscription {
                    parsed.result = true;
                } else if meta.path.is_ident("type") && kind == Kind::Field {
                    let value = meta.value()?;
                    parsed.field_type = Some(if value.peek(LitStr) {
                        FieldType::Named(value.parse()?)
                    } else {
                        FieldType::Class(value.parse()?)
                    });
                } else {
                    let option = meta.path.to_token_stream().to_string();
                    return Err(meta.error(format!("unsupported #[{}] option `{}`", kind.as_str(), option)));
                }
                Ok(())
            })?;
        }

        if kind == Kind::Field && parsed.field_type.is_none() {
            return Err(syn::Error::new(
                parsed.span,
                "#[field] requires a target type, e.g. #[field(type = \"User\")]",
            ));
        }

        Ok(parsed)
    }
}

/// Extract the single kind attribute of a method, if any
pub(crate) fn method_kind(attrs: &[Attribute]) -> syn::Result<Option<KindAttr>> {
    let mut found: Option<KindAttr> = None;
    for attr in attrs {
        let Some(kind) = Kind::from_attr(attr) else {
            continue;
        };
        if let Some(previous) = &found {
            return Err(syn::Error::new(
                attr.span(),
                format!(
                    "#[{}] conflicts with #[{}]; a method takes one resolver kind",
                    kind.as_str(),
                    previous.kind.as_str()
                ),
            ));
        }
        found = Some(KindAttr::parse(attr, kind)?);
    }
    Ok(found)
}

/// Remove kind attributes from a method
pub(crate) fn strip_kind_attrs(attrs: &[Attribute]) -> Vec<Attribute> {
    attrs
        .iter()
        .filter(|attr| Kind::from_attr(attr).is_none())
        .cloned()
        .collect()
}

/// Parameter binding attributes
pub(crate) enum ParamAttr {
    Parent,
    Args(Option<LitStr>),
    Ctx(Option<LitStr>),
    Info,
}

impl ParamAttr {
    /// Registration call on the generated declaration
    pub(crate) fn declare(&self, method: &str, index: usize) -> proc_macro2::TokenStream {
        match self {
            ParamAttr::Parent => quote! { resolver.parent(#method, #index); },
            ParamAttr::Args(None) => quote! { resolver.args(#method, #index); },
            ParamAttr::Args(Some(key)) => quote! { resolver.args_key(#method, #index, #key); },
            ParamAttr::Ctx(None) => quote! { resolver.ctx(#method, #index); },
            ParamAttr::Ctx(Some(key)) => quote! { resolver.ctx_key(#method, #index, #key); },
            ParamAttr::Info => quote! { resolver.info(#method, #index); },
        }
    }
}

// Attributes the compiler accepts on parameters
const BUILTIN_PARAM_ATTRS: &[&str] = &["allow", "warn", "deny", "forbid", "expect", "cfg", "cfg_attr"];

pub(crate) fn is_param_attr(attr: &Attribute) -> bool {
    attr.path()
        .get_ident()
        .is_some_and(|ident| matches!(ident.to_string().as_str(), "parent" | "args" | "ctx" | "info"))
}

fn parse_param_attr(attr: &Attribute) -> syn::Result<Option<ParamAttr>> {
    let Some(ident) = attr.path().get_ident() else {
        return Ok(None);
    };
    let name = ident.to_string();

    let key = || -> syn::Result<Option<LitStr>> {
        match &attr.meta {
            Meta::Path(_) => Ok(None),
            _ => attr.parse_args::<LitStr>().map(Some),
        }
    };
    let no_key = || -> syn::Result<()> {
        match &attr.meta {
            Meta::Path(_) => Ok(()),
            _ => Err(syn::Error::new(attr.span(), format!("#[{}] does not take a key", name))),
        }
    };

    match name.as_str() {
        "parent" => no_key().map(|_| Some(ParamAttr::Parent)),
        "info" => no_key().map(|_| Some(ParamAttr::Info)),
        "args" => key().map(|key| Some(ParamAttr::Args(key))),
        "ctx" => key().map(|key| Some(ParamAttr::Ctx(key))),
        other if BUILTIN_PARAM_ATTRS.contains(&other) => Ok(None),
        other => Err(syn::Error::new(
            attr.span(),
            format!(
                "unknown parameter attribute `#[{}]`; expected #[parent], #[args], #[ctx] or #[info]",
                other
            ),
        )),
    }
}

/// Extract the binding attribute of a parameter, if any
pub(crate) fn param_binding(attrs: &[Attribute]) -> syn::Result<Option<ParamAttr>> {
    let mut found = None;
    for attr in attrs {
        let Some(binding) = parse_param_attr(attr)? else {
            continue;
        };
        if found.is_some() {
            return Err(syn::Error::new(
                attr.span(),
                "a parameter takes one of #[parent], #[args], #[ctx] or #[info]",
            ));
        }
        found = Some(binding);
    }
    Ok(found)
}

/// Remove binding attributes from a parameter
pub(crate) fn strip_param_attrs(attrs: &[Attribute]) -> Vec<Attribute> {
    attrs.iter().filter(|attr| !is_param_attr(attr)).cloned().collect()
}
