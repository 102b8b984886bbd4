//! Resolver metadata records and the keyed stores that hold them.
//!
//! Every annotation kind has its own [`MetadataStore`], keyed by the class
//! that declared it. Records are kept in declaration order; that order is
//! the order in which resolvers appear in the built map.

use crate::class::{ClassRef, TypeRef};
use crate::error::GraphQLError;
use crate::subscription::SubscriptionFilter;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Options accepted by a query annotation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryOptions {
    /// Exposed field name (defaults to the method name)
    pub name: Option<String>,
}

impl QueryOptions {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
        }
    }
}

/// Options accepted by a mutation annotation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MutationOptions {
    /// Exposed field name (defaults to the method name)
    pub name: Option<String>,
}

impl MutationOptions {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
        }
    }
}

/// Options accepted by a subscription annotation
#[derive(Debug, Clone, Default)]
pub struct SubscriptionOptions {
    /// Exposed field name (defaults to the method name)
    pub name: Option<String>,
    /// Predicate deciding which events reach a subscriber
    pub filter: Option<SubscriptionFilter>,
}

impl SubscriptionOptions {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            filter: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_filter(mut self, filter: SubscriptionFilter) -> Self {
        self.filter = Some(filter);
        self
    }
}

/// Options accepted by a field annotation. The owning type is mandatory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldOptions {
    /// Exposed field name (defaults to the method name)
    pub name: Option<String>,
    /// GraphQL object type owning the field
    pub type_ref: TypeRef,
}

impl FieldOptions {
    pub fn of(type_ref: impl Into<TypeRef>) -> Self {
        Self {
            name: None,
            type_ref: type_ref.into(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// A method annotation with its optional options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodMetadata<O> {
    pub method: String,
    pub options: Option<O>,
}

impl<O> MethodMetadata<O> {
    pub fn new(method: impl Into<String>, options: Option<O>) -> Self {
        Self {
            method: method.into(),
            options,
        }
    }
}

pub type QueryMetadata = MethodMetadata<QueryOptions>;
pub type MutationMetadata = MethodMetadata<MutationOptions>;
pub type SubscriptionMetadata = MethodMetadata<SubscriptionOptions>;

impl QueryMetadata {
    /// Name under which the query is exposed
    pub fn exposed_name(&self) -> &str {
        self.options
            .as_ref()
            .and_then(|o| o.name.as_deref())
            .unwrap_or(&self.method)
    }
}

impl MutationMetadata {
    /// Name under which the mutation is exposed
    pub fn exposed_name(&self) -> &str {
        self.options
            .as_ref()
            .and_then(|o| o.name.as_deref())
            .unwrap_or(&self.method)
    }
}

impl SubscriptionMetadata {
    /// Name under which the subscription is exposed
    pub fn exposed_name(&self) -> &str {
        self.options
            .as_ref()
            .and_then(|o| o.name.as_deref())
            .unwrap_or(&self.method)
    }

    pub fn filter(&self) -> Option<&SubscriptionFilter> {
        self.options.as_ref().and_then(|o| o.filter.as_ref())
    }
}

/// A field annotation; unlike the other kinds its options are required.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMetadata {
    pub method: String,
    pub options: FieldOptions,
}

impl FieldMetadata {
    pub fn new(method: impl Into<String>, options: FieldOptions) -> Self {
        Self {
            method: method.into(),
            options,
        }
    }

    /// Name under which the field is exposed on its type
    pub fn exposed_name(&self) -> &str {
        self.options.name.as_deref().unwrap_or(&self.method)
    }

    /// GraphQL type owning the field
    pub fn type_name(&self) -> &str {
        self.options.type_ref.type_name()
    }
}

/// Which resolver argument a method parameter is bound to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamKind {
    Parent,
    Args,
    Ctx,
    Info,
}

impl ParamKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParamKind::Parent => "parent",
            ParamKind::Args => "args",
            ParamKind::Ctx => "ctx",
            ParamKind::Info => "info",
        }
    }

    /// Whether a property key may narrow the bound value
    pub fn accepts_key(&self) -> bool {
        matches!(self, ParamKind::Args | ParamKind::Ctx)
    }
}

impl FromStr for ParamKind {
    type Err = GraphQLError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "parent" => Ok(ParamKind::Parent),
            "args" => Ok(ParamKind::Args),
            "ctx" => Ok(ParamKind::Ctx),
            "info" => Ok(ParamKind::Info),
            other => Err(GraphQLError::UnknownParameterType(other.to_string())),
        }
    }
}

impl fmt::Display for ParamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Number of positional slots a resolver method can bind
pub const MAX_PARAMETERS: usize = 256;

/// Binding of one method parameter to a resolver argument
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterMetadata {
    pub method: String,
    pub kind: ParamKind,
    /// Positional slot in the target method
    pub index: usize,
    /// Sub-property of `args`/`ctx` to bind instead of the whole value
    pub key: Option<String>,
}

impl ParameterMetadata {
    pub fn new(method: impl Into<String>, kind: ParamKind, index: usize) -> Self {
        Self {
            method: method.into(),
            kind,
            index,
            key: None,
        }
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }
}

/// Ordered metadata records of one annotation kind, keyed by class
#[derive(Debug, Clone)]
pub struct MetadataStore<T> {
    kind: &'static str,
    entries: HashMap<ClassRef, Vec<T>>,
}

impl<T> MetadataStore<T> {
    pub fn new(kind: &'static str) -> Self {
        Self {
            kind,
            entries: HashMap::new(),
        }
    }

    /// Annotation kind this store holds, e.g. `resolver:queries`
    pub fn kind(&self) -> &'static str {
        self.kind
    }

    /// Replace the records stored for `class`
    pub fn set(&mut self, class: ClassRef, records: Vec<T>) {
        self.entries.insert(class, records);
    }

    /// Records stored for `class`, or `None` if it declared none of this kind
    pub fn get(&self, class: &ClassRef) -> Option<&[T]> {
        self.entries.get(class).map(Vec::as_slice)
    }

    /// Append `record` to the records of `class`, keeping insertion order
    pub fn merge(&mut self, class: ClassRef, record: T) {
        self.entries.entry(class).or_default().push(record);
    }

    pub fn contains(&self, class: &ClassRef) -> bool {
        self.entries.contains_key(class)
    }

    /// Number of classes with at least one record
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// All metadata stores of a registry
#[derive(Debug, Clone)]
pub struct ResolverMetadata {
    pub queries: MetadataStore<QueryMetadata>,
    pub mutations: MetadataStore<MutationMetadata>,
    pub subscriptions: MetadataStore<SubscriptionMetadata>,
    pub fields: MetadataStore<FieldMetadata>,
    pub parameters: MetadataStore<ParameterMetadata>,
}

impl ResolverMetadata {
    pub fn new() -> Self {
        Self {
            queries: MetadataStore::new("resolver:queries"),
            mutations: MetadataStore::new("resolver:mutations"),
            subscriptions: MetadataStore::new("resolver:subscriptions"),
            fields: MetadataStore::new("resolver:fields"),
            parameters: MetadataStore::new("resolver:parameters"),
        }
    }

    /// Parameter bindings of one method
    pub fn parameters_for(&self, class: &ClassRef, method: &str) -> Vec<ParameterMetadata> {
        self.parameters
            .get(class)
            .unwrap_or_default()
            .iter()
            .filter(|param| param.method == method)
            .cloned()
            .collect()
    }

    pub fn clear(&mut self) {
        self.queries.clear();
        self.mutations.clear();
        self.subscriptions.clear();
        self.fields.clear();
        self.parameters.clear();
    }
}

impl Default for ResolverMetadata {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct ResolverTest;
    struct OtherResolver;

    #[test]
    fn test_merge_preserves_order() {
        let class = ClassRef::of::<ResolverTest>();
        let mut store = MetadataStore::new("resolver:subscriptions");

        store.merge(class, SubscriptionMetadata::new("methodOne", None));
        store.merge(
            class,
            SubscriptionMetadata::new("methodTwo", Some(SubscriptionOptions::named("location"))),
        );

        let records = store.get(&class).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].method, "methodOne");
        assert_eq!(records[0].exposed_name(), "methodOne");
        assert_eq!(records[1].exposed_name(), "location");
    }

    #[test]
    fn test_get_absent_class() {
        let store: MetadataStore<QueryMetadata> = MetadataStore::new("resolver:queries");
        assert!(store.get(&ClassRef::of::<ResolverTest>()).is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_set_overwrites_only_target_class() {
        let one = ClassRef::of::<ResolverTest>();
        let two = ClassRef::of::<OtherResolver>();
        let mut store = MetadataStore::new("resolver:queries");

        store.merge(one, QueryMetadata::new("user", None));
        store.merge(two, QueryMetadata::new("countries", None));
        store.set(one, vec![QueryMetadata::new("me", None)]);

        assert_eq!(store.get(&one).unwrap()[0].method, "me");
        assert_eq!(store.get(&two).unwrap()[0].method, "countries");
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_parameters_for_filters_by_method() {
        let class = ClassRef::of::<ResolverTest>();
        let mut metadata = ResolverMetadata::new();

        metadata
            .parameters
            .merge(class, ParameterMetadata::new("user", ParamKind::Args, 0).with_key("id"));
        metadata
            .parameters
            .merge(class, ParameterMetadata::new("location", ParamKind::Parent, 0));
        metadata
            .parameters
            .merge(class, ParameterMetadata::new("user", ParamKind::Ctx, 1));

        let params = metadata.parameters_for(&class, "user");
        assert_eq!(params.len(), 2);
        assert_eq!(params[0].key.as_deref(), Some("id"));
        assert_eq!(params[1].kind, ParamKind::Ctx);

        metadata.clear();
        assert!(metadata.parameters_for(&class, "user").is_empty());
    }

    #[test]
    fn test_param_kind_parsing() {
        assert_eq!("args".parse::<ParamKind>().unwrap(), ParamKind::Args);
        assert_eq!("info".parse::<ParamKind>().unwrap(), ParamKind::Info);
        assert_eq!(
            "request".parse::<ParamKind>(),
            Err(GraphQLError::UnknownParameterType("request".to_string()))
        );
        assert!(ParamKind::Ctx.accepts_key());
        assert!(!ParamKind::Parent.accepts_key());
    }

    #[test]
    fn test_field_metadata_names() {
        let field = FieldMetadata::new("locationProperties", FieldOptions::of("Location").with_name("properties"));
        assert_eq!(field.exposed_name(), "properties");
        assert_eq!(field.type_name(), "Location");
    }
}
