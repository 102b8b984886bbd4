//! Resolver declarations: the annotation layer.
//!
//! A resolver type describes itself in [`Resolver::declare`]. The
//! [`Declaration`] it receives only records: method annotations, parameter
//! bindings and method bodies are queued until the type is registered into a
//! [`RegistryContext`](crate::RegistryContext), which validates and stores them.
//!
//! ```
//! use armature_graphql::*;
//! use serde_json::json;
//!
//! #[derive(Default)]
//! struct CountryResolver;
//!
//! impl Resolver for CountryResolver {
//!     fn declare(resolver: &mut Declaration<Self>) {
//!         resolver
//!             .query("countries")
//!             .args_key("countries", 0, "continent")
//!             .method("countries", |_, mut args| {
//!                 let continent: String = args.extract(0)?;
//!                 Ok(json!([{ "name": "spain", "continent": continent }]))
//!             });
//!     }
//! }
//!
//! let mut context = RegistryContext::new();
//! context.register::<CountryResolver>().unwrap();
//! assert!(context.is_registered::<CountryResolver>());
//! ```

use crate::class::ClassRef;
use crate::error::ResolverError;
use crate::marshal::MethodArgs;
use crate::metadata::{
    FieldMetadata, FieldOptions, MutationMetadata, MutationOptions, ParamKind, ParameterMetadata,
    QueryMetadata, QueryOptions, SubscriptionMetadata, SubscriptionOptions,
};
use crate::resolver_map::ResolveResult;
use crate::subscription::EventStream;
use futures::FutureExt;
use futures::future::{self, BoxFuture};
use serde::Serialize;
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// A type exposing GraphQL resolvers.
///
/// Implement by hand with the [`Declaration`] API or generate it with the
/// `#[resolver]` attribute.
pub trait Resolver: Send + Sync + Sized + 'static {
    fn declare(resolver: &mut Declaration<Self>);
}

/// Type-erased resolver object
pub type AnyInstance = Arc<dyn Any + Send + Sync>;

pub(crate) type ResolveBody = Arc<dyn Fn(AnyInstance, MethodArgs) -> BoxFuture<'static, ResolveResult> + Send + Sync>;
pub(crate) type SourceBody =
    Arc<dyn Fn(AnyInstance) -> BoxFuture<'static, Result<EventStream, ResolverError>> + Send + Sync>;

/// Body of a declared method
#[derive(Clone)]
pub(crate) enum MethodBody {
    /// Query, mutation or field method taking marshaled arguments
    Resolve(ResolveBody),
    /// Subscription method returning an event stream
    Source(SourceBody),
}

impl MethodBody {
    pub(crate) fn describe(&self) -> &'static str {
        match self {
            MethodBody::Resolve(_) => "resolver method",
            MethodBody::Source(_) => "subscription source",
        }
    }
}

pub(crate) type MethodTable = HashMap<String, MethodBody>;

/// One queued annotation
#[derive(Debug, Clone)]
pub enum Annotation {
    Query(QueryMetadata),
    Mutation(MutationMetadata),
    Subscription(SubscriptionMetadata),
    Field(FieldMetadata),
    Parameter(ParameterMetadata),
}

impl Annotation {
    /// Method the annotation is attached to
    pub fn method(&self) -> &str {
        match self {
            Annotation::Query(record) => &record.method,
            Annotation::Mutation(record) => &record.method,
            Annotation::Subscription(record) => &record.method,
            Annotation::Field(record) => &record.method,
            Annotation::Parameter(record) => &record.method,
        }
    }
}

/// Registration queue of a resolver type
pub struct Declaration<R> {
    class: ClassRef,
    annotations: Vec<Annotation>,
    methods: MethodTable,
    _resolver: std::marker::PhantomData<fn() -> R>,
}

impl<R: Resolver> Declaration<R> {
    pub(crate) fn new() -> Self {
        Self {
            class: ClassRef::of::<R>(),
            annotations: Vec::new(),
            methods: HashMap::new(),
            _resolver: std::marker::PhantomData,
        }
    }

    /// Collect the declaration of `R`
    pub(crate) fn collect() -> Self {
        let mut declaration = Self::new();
        R::declare(&mut declaration);
        declaration
    }

    pub fn class(&self) -> ClassRef {
        self.class
    }

    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    pub fn has_method(&self, name: &str) -> bool {
        self.methods.contains_key(name)
    }

    pub(crate) fn into_parts(self) -> (ClassRef, Vec<Annotation>, MethodTable) {
        (self.class, self.annotations, self.methods)
    }

    fn annotate(&mut self, annotation: Annotation) -> &mut Self {
        self.annotations.push(annotation);
        self
    }

    // ---------------------------------------------------------------------
    // Method annotations
    // ---------------------------------------------------------------------

    /// Expose `method` as a query under its own name
    pub fn query(&mut self, method: &str) -> &mut Self {
        self.annotate(Annotation::Query(QueryMetadata::new(method, None)))
    }

    pub fn query_with(&mut self, method: &str, options: QueryOptions) -> &mut Self {
        self.annotate(Annotation::Query(QueryMetadata::new(method, Some(options))))
    }

    /// Expose `method` as a mutation under its own name
    pub fn mutation(&mut self, method: &str) -> &mut Self {
        self.annotate(Annotation::Mutation(MutationMetadata::new(method, None)))
    }

    pub fn mutation_with(&mut self, method: &str, options: MutationOptions) -> &mut Self {
        self.annotate(Annotation::Mutation(MutationMetadata::new(method, Some(options))))
    }

    /// Expose `method` as a subscription under its own name
    pub fn subscription(&mut self, method: &str) -> &mut Self {
        self.annotate(Annotation::Subscription(SubscriptionMetadata::new(method, None)))
    }

    pub fn subscription_with(&mut self, method: &str, options: SubscriptionOptions) -> &mut Self {
        self.annotate(Annotation::Subscription(SubscriptionMetadata::new(method, Some(options))))
    }

    /// Expose `method` as a field of the object type named in `options`
    pub fn field(&mut self, method: &str, options: FieldOptions) -> &mut Self {
        self.annotate(Annotation::Field(FieldMetadata::new(method, options)))
    }

    // ---------------------------------------------------------------------
    // Parameter annotations
    // ---------------------------------------------------------------------

    /// Bind a parameter record as given
    pub fn param(&mut self, param: ParameterMetadata) -> &mut Self {
        self.annotate(Annotation::Parameter(param))
    }

    /// Bind the parent value to position `index` of `method`
    pub fn parent(&mut self, method: &str, index: usize) -> &mut Self {
        self.param(ParameterMetadata::new(method, ParamKind::Parent, index))
    }

    /// Bind the whole `args` object to position `index` of `method`
    pub fn args(&mut self, method: &str, index: usize) -> &mut Self {
        self.param(ParameterMetadata::new(method, ParamKind::Args, index))
    }

    /// Bind `args[key]` to position `index` of `method`
    pub fn args_key(&mut self, method: &str, index: usize, key: &str) -> &mut Self {
        self.param(ParameterMetadata::new(method, ParamKind::Args, index).with_key(key))
    }

    /// Bind the whole context to position `index` of `method`
    pub fn ctx(&mut self, method: &str, index: usize) -> &mut Self {
        self.param(ParameterMetadata::new(method, ParamKind::Ctx, index))
    }

    /// Bind `ctx[key]` to position `index` of `method`
    pub fn ctx_key(&mut self, method: &str, index: usize, key: &str) -> &mut Self {
        self.param(ParameterMetadata::new(method, ParamKind::Ctx, index).with_key(key))
    }

    /// Bind the execution info to position `index` of `method`
    pub fn info(&mut self, method: &str, index: usize) -> &mut Self {
        self.param(ParameterMetadata::new(method, ParamKind::Info, index))
    }

    // ---------------------------------------------------------------------
    // Method bodies
    // ---------------------------------------------------------------------

    /// Define a synchronous resolver method
    pub fn method<F>(&mut self, name: &str, f: F) -> &mut Self
    where
        F: Fn(&R, MethodArgs) -> ResolveResult + Send + Sync + 'static,
    {
        let class = self.class;
        let body: ResolveBody = Arc::new(move |instance: AnyInstance, args: MethodArgs| {
            let result = match instance.downcast_ref::<R>() {
                Some(this) => f(this, args),
                None => Err(instance_mismatch(class)),
            };
            future::ready(result).boxed()
        });
        self.methods.insert(name.to_string(), MethodBody::Resolve(body));
        self
    }

    /// Define an asynchronous resolver method
    pub fn async_method<F, Fut>(&mut self, name: &str, f: F) -> &mut Self
    where
        F: Fn(Arc<R>, MethodArgs) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ResolveResult> + Send + 'static,
    {
        let class = self.class;
        let body: ResolveBody = Arc::new(move |instance: AnyInstance, args: MethodArgs| {
            match instance.downcast::<R>() {
                Ok(this) => f(this, args).boxed(),
                Err(_) => future::ready(Err(instance_mismatch(class))).boxed(),
            }
        });
        self.methods.insert(name.to_string(), MethodBody::Resolve(body));
        self
    }

    /// Define a synchronous subscription source
    pub fn source<F>(&mut self, name: &str, f: F) -> &mut Self
    where
        F: Fn(&R) -> Result<EventStream, ResolverError> + Send + Sync + 'static,
    {
        let class = self.class;
        let body: SourceBody = Arc::new(move |instance: AnyInstance| {
            let result = match instance.downcast_ref::<R>() {
                Some(this) => f(this),
                None => Err(instance_mismatch(class)),
            };
            future::ready(result).boxed()
        });
        self.methods.insert(name.to_string(), MethodBody::Source(body));
        self
    }

    /// Define an asynchronous subscription source
    pub fn async_source<F, Fut>(&mut self, name: &str, f: F) -> &mut Self
    where
        F: Fn(Arc<R>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<EventStream, ResolverError>> + Send + 'static,
    {
        let class = self.class;
        let body: SourceBody = Arc::new(move |instance: AnyInstance| match instance.downcast::<R>() {
            Ok(this) => f(this).boxed(),
            Err(_) => future::ready(Err(instance_mismatch(class))).boxed(),
        });
        self.methods.insert(name.to_string(), MethodBody::Source(body));
        self
    }
}

fn instance_mismatch(class: ClassRef) -> ResolverError {
    ResolverError::new(format!("resolver instance is not a `{}`", class.name()))
}

impl<R> fmt::Debug for Declaration<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut methods: Vec<&String> = self.methods.keys().collect();
        methods.sort();
        f.debug_struct("Declaration")
            .field("class", &self.class)
            .field("annotations", &self.annotations)
            .field("methods", &methods)
            .finish()
    }
}

/// A live resolver object together with its class
#[derive(Clone)]
pub struct ResolverInstance {
    class: ClassRef,
    value: AnyInstance,
}

impl ResolverInstance {
    pub fn new<R: Resolver>(resolver: R) -> Self {
        Self::from_arc(Arc::new(resolver))
    }

    pub fn from_arc<R: Resolver>(resolver: Arc<R>) -> Self {
        Self {
            class: ClassRef::of::<R>(),
            value: resolver,
        }
    }

    pub fn class(&self) -> ClassRef {
        self.class
    }

    pub fn downcast_ref<R: Resolver>(&self) -> Option<&R> {
        self.value.downcast_ref::<R>()
    }

    pub(crate) fn value(&self) -> &AnyInstance {
        &self.value
    }
}

impl fmt::Debug for ResolverInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolverInstance")
            .field("class", &self.class)
            .finish_non_exhaustive()
    }
}

/// Creates resolver instances for a registered class
pub type InstanceFactory = Arc<dyn Fn() -> ResolverInstance + Send + Sync>;

/// Convert a method's return value into a resolver result.
///
/// Used by the bodies generated by `#[resolver]`.
pub fn resolve_output<T, E>(result: Result<T, E>) -> ResolveResult
where
    T: Serialize,
    E: Into<BoxError>,
{
    let value = result.map_err(|error| ResolverError::from(error.into()))?;
    serde_json::to_value(value).map_err(ResolverError::Output)
}

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Return types accepted from subscription source methods
pub trait IntoEventSource {
    fn into_event_source(self) -> Result<EventStream, ResolverError>;
}

impl IntoEventSource for EventStream {
    fn into_event_source(self) -> Result<EventStream, ResolverError> {
        Ok(self)
    }
}

impl<E: Into<BoxError>> IntoEventSource for Result<EventStream, E> {
    fn into_event_source(self) -> Result<EventStream, ResolverError> {
        self.map_err(|error| ResolverError::from(error.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    #[derive(Default)]
    struct ResolverSchemaOne {
        greeting: String,
    }

    impl Resolver for ResolverSchemaOne {
        fn declare(resolver: &mut Declaration<Self>) {
            resolver
                .query("user")
                .mutation_with("insertUser", MutationOptions::named("addUser"))
                .args_key("insertUser", 0, "id")
                .method("user", |this, _| Ok(json!(this.greeting)))
                .async_method("insertUser", |_, mut args| async move {
                    let id: String = args.extract(0)?;
                    Ok::<_, ResolverError>(json!(id))
                });
        }
    }

    #[test]
    fn test_collect_records_in_order() {
        let declaration = Declaration::<ResolverSchemaOne>::collect();
        let methods: Vec<&str> = declaration.annotations().iter().map(Annotation::method).collect();

        assert_eq!(declaration.class().name(), "ResolverSchemaOne");
        assert_eq!(methods, vec!["user", "insertUser", "insertUser"]);
        assert!(matches!(declaration.annotations()[2], Annotation::Parameter(_)));
        assert!(declaration.has_method("user"));
        assert!(declaration.has_method("insertUser"));
        assert!(!declaration.has_method("missing"));
    }

    #[tokio::test]
    async fn test_method_bodies_invoke_instance() {
        let (_, _, methods) = Declaration::<ResolverSchemaOne>::collect().into_parts();
        let instance = ResolverInstance::new(ResolverSchemaOne {
            greeting: "hello".to_string(),
        });

        let Some(MethodBody::Resolve(user)) = methods.get("user") else {
            panic!("user should be a resolver method");
        };
        let value = user(instance.value().clone(), MethodArgs::new()).await.unwrap();
        assert_eq!(value, json!("hello"));

        let Some(MethodBody::Resolve(insert)) = methods.get("insertUser") else {
            panic!("insertUser should be a resolver method");
        };
        let args = MethodArgs::from(vec![Some(json!("7"))]);
        assert_eq!(insert(instance.value().clone(), args).await.unwrap(), json!("7"));
    }

    #[tokio::test]
    async fn test_mismatched_instance_is_an_error() {
        struct Other;
        impl Resolver for Other {
            fn declare(_: &mut Declaration<Self>) {}
        }

        let (_, _, methods) = Declaration::<ResolverSchemaOne>::collect().into_parts();
        let Some(MethodBody::Resolve(user)) = methods.get("user") else {
            panic!("user should be a resolver method");
        };
        let error = user(ResolverInstance::new(Other).value().clone(), MethodArgs::new())
            .await
            .unwrap_err();
        assert_eq!(error.to_string(), "resolver instance is not a `ResolverSchemaOne`");
    }

    #[test]
    fn test_resolve_output() {
        #[derive(Serialize)]
        struct Country {
            name: &'static str,
        }

        let ok: Result<Country, ResolverError> = Ok(Country { name: "italy" });
        assert_eq!(resolve_output(ok).unwrap(), json!({"name": "italy"}));

        let err: Result<Value, &str> = Err("not found");
        assert_eq!(resolve_output(err).unwrap_err().to_string(), "not found");

        let err: Result<Value, ResolverError> = Err(ResolverError::new("offline"));
        assert!(matches!(resolve_output(err), Err(ResolverError::Message(message)) if message == "offline"));

        let err: Result<Value, std::fmt::Error> = Err(std::fmt::Error);
        assert!(resolve_output(err).unwrap_err().downcast_ref::<std::fmt::Error>().is_some());
    }

    #[test]
    fn test_instance_downcast() {
        let instance = ResolverInstance::new(ResolverSchemaOne::default());
        assert!(instance.downcast_ref::<ResolverSchemaOne>().is_some());
        assert_eq!(instance.class(), ClassRef::of::<ResolverSchemaOne>());
    }
}
