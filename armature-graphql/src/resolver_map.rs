//! Resolver map types handed to the GraphQL engine.
//!
//! A [`ResolverMap`] maps a top-level [`RootKind`] to the resolvers of that
//! type's fields. Query, mutation and object-type fields resolve through a
//! [`FieldResolver`]; subscription fields expose a `subscribe` callable.

use crate::error::ResolverError;
use crate::subscription::EventStream;
use futures::FutureExt;
use futures::future::BoxFuture;
use indexmap::IndexMap;
use indexmap::map::Entry;
use serde_json::Value;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// Outcome of one resolver invocation
pub type ResolveResult = Result<Value, ResolverError>;

type ResolveFn = dyn Fn(Value, Value, Value, Value) -> BoxFuture<'static, ResolveResult> + Send + Sync;
type SubscribeCallFn =
    dyn Fn(Value, Value, Value, Value) -> BoxFuture<'static, Result<EventStream, ResolverError>> + Send + Sync;

/// Resolver for a single field, invoked as `(parent, args, ctx, info)`
#[derive(Clone)]
pub struct FieldResolver {
    inner: Arc<ResolveFn>,
}

impl FieldResolver {
    /// Create a resolver from an asynchronous function
    pub fn new<F, Fut>(f: F) -> Self
    where
        F: Fn(Value, Value, Value, Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ResolveResult> + Send + 'static,
    {
        Self {
            inner: Arc::new(move |parent, args, ctx, info| f(parent, args, ctx, info).boxed()),
        }
    }

    /// Create a resolver from a synchronous function
    ///
    /// # Example
    ///
    /// ```
    /// use armature_graphql::FieldResolver;
    /// use serde_json::{Value, json};
    ///
    /// let resolver = FieldResolver::from_fn(|_, _, _, _| Ok(json!("testOne")));
    /// let value = futures::executor::block_on(resolver.call(Value::Null, Value::Null, Value::Null, Value::Null));
    /// assert_eq!(value.unwrap(), json!("testOne"));
    /// ```
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(Value, Value, Value, Value) -> ResolveResult + Send + Sync + 'static,
    {
        Self::new(move |parent, args, ctx, info| futures::future::ready(f(parent, args, ctx, info)))
    }

    pub fn call(&self, parent: Value, args: Value, ctx: Value, info: Value) -> BoxFuture<'static, ResolveResult> {
        (self.inner)(parent, args, ctx, info)
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for FieldResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FieldResolver")
    }
}

/// `subscribe` callable of a subscription field
#[derive(Clone)]
pub struct SubscribeFn {
    inner: Arc<SubscribeCallFn>,
}

impl SubscribeFn {
    pub fn new<F, Fut>(f: F) -> Self
    where
        F: Fn(Value, Value, Value, Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<EventStream, ResolverError>> + Send + 'static,
    {
        Self {
            inner: Arc::new(move |parent, args, ctx, info| f(parent, args, ctx, info).boxed()),
        }
    }

    pub fn call(
        &self,
        parent: Value,
        args: Value,
        ctx: Value,
        info: Value,
    ) -> BoxFuture<'static, Result<EventStream, ResolverError>> {
        (self.inner)(parent, args, ctx, info)
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for SubscribeFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SubscribeFn")
    }
}

/// Descriptor of a subscription field: `{ subscribe }`
#[derive(Debug, Clone)]
pub struct SubscriptionResolver {
    pub subscribe: SubscribeFn,
}

/// Resolver registered under one field name
#[derive(Debug, Clone)]
pub enum ResolverEntry {
    Resolve(FieldResolver),
    Subscribe(SubscriptionResolver),
}

impl ResolverEntry {
    pub fn as_resolver(&self) -> Option<&FieldResolver> {
        match self {
            ResolverEntry::Resolve(resolver) => Some(resolver),
            ResolverEntry::Subscribe(_) => None,
        }
    }

    pub fn as_subscription(&self) -> Option<&SubscriptionResolver> {
        match self {
            ResolverEntry::Subscribe(subscription) => Some(subscription),
            ResolverEntry::Resolve(_) => None,
        }
    }
}

impl From<FieldResolver> for ResolverEntry {
    fn from(resolver: FieldResolver) -> Self {
        ResolverEntry::Resolve(resolver)
    }
}

impl From<SubscriptionResolver> for ResolverEntry {
    fn from(subscription: SubscriptionResolver) -> Self {
        ResolverEntry::Subscribe(subscription)
    }
}

/// Top-level key of a resolver map
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RootKind {
    Query,
    Mutation,
    Subscription,
    /// A GraphQL object type, by name
    Object(String),
}

impl RootKind {
    pub const RESERVED: [&'static str; 3] = ["Query", "Mutation", "Subscription"];

    /// Key for a type name; the reserved root names map to their variants
    pub fn from_type_name(name: &str) -> Self {
        match name {
            "Query" => RootKind::Query,
            "Mutation" => RootKind::Mutation,
            "Subscription" => RootKind::Subscription,
            other => RootKind::Object(other.to_string()),
        }
    }

    pub fn is_reserved(name: &str) -> bool {
        Self::RESERVED.contains(&name)
    }

    pub fn type_name(&self) -> &str {
        match self {
            RootKind::Query => "Query",
            RootKind::Mutation => "Mutation",
            RootKind::Subscription => "Subscription",
            RootKind::Object(name) => name,
        }
    }
}

impl fmt::Display for RootKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// Field resolvers of one type, in registration order
pub type TypeResolvers = IndexMap<String, ResolverEntry>;

/// Nested `type -> field -> resolver` structure
#[derive(Debug, Clone, Default)]
pub struct ResolverMap {
    types: IndexMap<RootKind, TypeResolvers>,
}

impl ResolverMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `entry` as `kind.field`, replacing any previous entry
    pub fn insert(&mut self, kind: RootKind, field: impl Into<String>, entry: impl Into<ResolverEntry>) {
        self.types.entry(kind).or_default().insert(field.into(), entry.into());
    }

    /// Builder-style [`insert`](Self::insert) of a plain resolver
    pub fn with_resolver(mut self, kind: RootKind, field: impl Into<String>, resolver: FieldResolver) -> Self {
        self.insert(kind, field, resolver);
        self
    }

    /// Make sure `kind` is present, even without fields
    pub fn ensure_type(&mut self, kind: RootKind) {
        self.types.entry(kind).or_default();
    }

    pub fn get(&self, kind: &RootKind) -> Option<&TypeResolvers> {
        self.types.get(kind)
    }

    pub fn field(&self, kind: &RootKind, field: &str) -> Option<&ResolverEntry> {
        self.types.get(kind).and_then(|fields| fields.get(field))
    }

    pub fn resolver(&self, kind: &RootKind, field: &str) -> Option<&FieldResolver> {
        self.field(kind, field).and_then(ResolverEntry::as_resolver)
    }

    pub fn subscription(&self, field: &str) -> Option<&SubscriptionResolver> {
        self.field(&RootKind::Subscription, field)
            .and_then(ResolverEntry::as_subscription)
    }

    pub fn contains_type(&self, kind: &RootKind) -> bool {
        self.types.contains_key(kind)
    }

    pub fn types(&self) -> impl Iterator<Item = (&RootKind, &TypeResolvers)> {
        self.types.iter()
    }

    pub fn type_count(&self) -> usize {
        self.types.len()
    }

    /// Total number of field entries across all types
    pub fn field_count(&self) -> usize {
        self.types.values().map(IndexMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Deep-merge `other` into `self`: fields are added per type and
    /// colliding field names take `other`'s entry.
    pub fn merge(&mut self, other: &ResolverMap) {
        for (kind, fields) in &other.types {
            match self.types.entry(kind.clone()) {
                Entry::Occupied(mut existing) => {
                    for (name, entry) in fields {
                        existing.get_mut().insert(name.clone(), entry.clone());
                    }
                }
                Entry::Vacant(slot) => {
                    slot.insert(fields.clone());
                }
            }
        }
    }
}

/// Combine a resolver list the way GraphQL engines do before execution.
///
/// Later maps win on colliding `type.field` pairs.
pub fn merge_resolver_maps(maps: &[Arc<ResolverMap>]) -> ResolverMap {
    let mut merged = ResolverMap::new();
    for map in maps {
        merged.merge(map);
    }
    merged
}
