//! Resolver method builder: turns one resolver instance into its resolver
//! map segment.

use crate::class::ClassRef;
use crate::context::RegistryContext;
use crate::declaration::{MethodBody, ResolverInstance};
use crate::error::{GraphQLError, ResolverError, Result};
use crate::marshal::{ResolverInput, marshal};
use crate::metadata::{ParameterMetadata, SubscriptionMetadata};
use crate::resolver_map::{FieldResolver, ResolverMap, RootKind, SubscribeFn, SubscriptionResolver};
use crate::subscription::with_filter;
use std::sync::Arc;
use tracing::{debug, trace};

/// Builds the resolver map segment of a single resolver instance
pub struct ResolverMethodBuilder<'a> {
    context: &'a RegistryContext,
    instance: &'a ResolverInstance,
}

impl<'a> ResolverMethodBuilder<'a> {
    pub fn new(context: &'a RegistryContext, instance: &'a ResolverInstance) -> Self {
        Self { context, instance }
    }

    pub fn class(&self) -> ClassRef {
        self.instance.class()
    }

    /// Build the segment: queries, mutations, object-type fields, then
    /// subscriptions. Kinds without records are left out unless the
    /// context is configured to emit empty roots.
    pub fn build(&self) -> Result<ResolverMap> {
        let class = self.class();
        if !self.context.contains(&class) {
            return Err(GraphQLError::ClassNotRegistered(class.name()));
        }

        let metadata = self.context.metadata();
        let mut map = ResolverMap::new();

        if self.context.config().emit_empty_roots {
            map.ensure_type(RootKind::Query);
            map.ensure_type(RootKind::Mutation);
            map.ensure_type(RootKind::Subscription);
        }

        for record in metadata.queries.get(&class).unwrap_or_default() {
            map.insert(RootKind::Query, record.exposed_name(), self.resolver(&record.method)?);
        }

        for record in metadata.mutations.get(&class).unwrap_or_default() {
            map.insert(RootKind::Mutation, record.exposed_name(), self.resolver(&record.method)?);
        }

        for record in metadata.fields.get(&class).unwrap_or_default() {
            let kind = RootKind::Object(record.type_name().to_string());
            map.insert(kind, record.exposed_name(), self.resolver(&record.method)?);
        }

        for record in metadata.subscriptions.get(&class).unwrap_or_default() {
            let subscription = SubscriptionResolver {
                subscribe: self.subscriber(record)?,
            };
            map.insert(RootKind::Subscription, record.exposed_name(), subscription);
        }

        if self.context.config().enable_logging {
            debug!(
                resolver = class.name(),
                types = map.type_count(),
                fields = map.field_count(),
                "Built resolver map segment"
            );
        }

        Ok(map)
    }

    /// Resolver marshaling `(parent, args, ctx, info)` onto `method`
    fn resolver(&self, method: &str) -> Result<FieldResolver> {
        let class = self.class();
        let body = match self.context.method(&class, method) {
            Some(MethodBody::Resolve(body)) => body.clone(),
            _ => return Err(GraphQLError::undefined_method(class, method)),
        };
        let params: Arc<[ParameterMetadata]> = self.context.metadata().parameters_for(&class, method).into();
        let instance = self.instance.value().clone();
        let method = method.to_string();
        let logging = self.context.config().enable_logging;

        Ok(FieldResolver::new(move |parent, args, ctx, info| {
            if logging {
                trace!(resolver = class.name(), method = %method, "Invoking resolver method");
            }
            let input = ResolverInput::new(parent, args, ctx, info);
            body(instance.clone(), marshal(&params, &input))
        }))
    }

    /// `subscribe` callable invoking the source method, filtered if requested
    fn subscriber(&self, record: &SubscriptionMetadata) -> Result<SubscribeFn> {
        let class = self.class();
        let source = match self.context.method(&class, &record.method) {
            Some(MethodBody::Source(source)) => source.clone(),
            _ => return Err(GraphQLError::undefined_method(class, &record.method)),
        };
        let filter = record.filter().cloned();
        let instance = self.instance.value().clone();

        Ok(SubscribeFn::new(move |_parent, args, _ctx, _info| {
            let events = source(instance.clone());
            let filter = filter.clone();
            async move {
                let events = events.await?;
                Ok::<_, ResolverError>(match filter {
                    Some(filter) => with_filter(events, filter, args),
                    None => events,
                })
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ResolverConfig;
    use crate::declaration::{Declaration, Resolver};
    use crate::metadata::{FieldOptions, MutationOptions, SubscriptionOptions};
    use crate::subscription::SubscriptionFilter;
    use futures::StreamExt;
    use futures::stream;
    use serde_json::{Value, json};
    use std::sync::Mutex;

    #[derive(Default)]
    struct ResolverSchemaOne {
        calls: Mutex<Vec<Vec<Option<Value>>>>,
    }

    impl Resolver for ResolverSchemaOne {
        fn declare(resolver: &mut Declaration<Self>) {
            resolver
                .query("query")
                .field("location", FieldOptions::of("User"))
                .field("family", FieldOptions::of("User"))
                .field("locationProperties", FieldOptions::of("Location").with_name("properties"))
                .mutation("mutation")
                .mutation_with("insertUser", MutationOptions::named("addUser"))
                .args_key("insertUser", 0, "id")
                .subscription("subscription")
                .subscription_with(
                    "messages",
                    SubscriptionOptions::named("roomMessages").with_filter(SubscriptionFilter::new(
                        |payload, variables| payload["room"] == variables["room"],
                    )),
                );

            for name in ["query", "location", "family", "locationProperties", "mutation"] {
                resolver.method(name, |_, _| Ok(json!(null)));
            }
            resolver
                .method("insertUser", |this, args| {
                    this.calls.lock().unwrap().push(args.clone().into_vec());
                    Ok(args.get(0).cloned().unwrap_or_default())
                })
                .source("subscription", |_| Ok(stream::iter(vec![json!(1)]).boxed()))
                .source("messages", |_| {
                    Ok(stream::iter(vec![
                        json!({"room": "a", "text": "hi"}),
                        json!({"room": "b", "text": "hidden"}),
                        json!({"room": "a", "text": "bye"}),
                    ])
                    .boxed())
                });
        }
    }

    #[derive(Default)]
    struct QueriesOnly;

    impl Resolver for QueriesOnly {
        fn declare(resolver: &mut Declaration<Self>) {
            resolver
                .query("countries")
                .async_method("countries", |_, _| async { Err::<Value, _>(ResolverError::new("offline")) });
        }
    }

    fn context() -> RegistryContext {
        let mut context = RegistryContext::new();
        context.register::<ResolverSchemaOne>().unwrap();
        context.register::<QueriesOnly>().unwrap();
        context
    }

    #[test]
    fn test_build_resolver_methods() {
        let context = context();
        let instance = ResolverInstance::new(ResolverSchemaOne::default());
        let methods = ResolverMethodBuilder::new(&context, &instance).build().unwrap();

        assert!(methods.resolver(&RootKind::Query, "query").is_some());
        assert!(methods.resolver(&RootKind::Mutation, "mutation").is_some());
        assert!(methods.resolver(&RootKind::Mutation, "addUser").is_some());
        assert!(methods.subscription("subscription").is_some());
        assert!(methods.subscription("roomMessages").is_some());

        let user = RootKind::Object("User".to_string());
        assert!(methods.resolver(&user, "location").is_some());
        assert!(methods.resolver(&user, "family").is_some());
        assert_eq!(methods.get(&user).unwrap().len(), 2);
        assert!(methods
            .resolver(&RootKind::Object("Location".to_string()), "properties")
            .is_some());

        assert_eq!(methods.get(&RootKind::Query).unwrap().len(), 1);
        assert_eq!(methods.get(&RootKind::Mutation).unwrap().len(), 2);
    }

    #[test]
    fn test_type_order_follows_kinds() {
        let context = context();
        let instance = ResolverInstance::new(ResolverSchemaOne::default());
        let methods = ResolverMethodBuilder::new(&context, &instance).build().unwrap();

        let kinds: Vec<String> = methods.types().map(|(kind, _)| kind.to_string()).collect();
        assert_eq!(kinds, vec!["Query", "Mutation", "User", "Location", "Subscription"]);
    }

    #[test]
    fn test_empty_kinds_are_omitted() {
        let context = context();
        let instance = ResolverInstance::new(QueriesOnly);
        let methods = ResolverMethodBuilder::new(&context, &instance).build().unwrap();

        assert_eq!(methods.type_count(), 1);
        assert!(methods.contains_type(&RootKind::Query));
        assert!(!methods.contains_type(&RootKind::Mutation));
        assert!(!methods.contains_type(&RootKind::Subscription));
    }

    #[test]
    fn test_empty_roots_when_configured() {
        let mut context = RegistryContext::with_config(ResolverConfig::new().with_empty_roots(true));
        context.register::<QueriesOnly>().unwrap();
        let instance = ResolverInstance::new(QueriesOnly);
        let methods = ResolverMethodBuilder::new(&context, &instance).build().unwrap();

        assert!(methods.contains_type(&RootKind::Mutation));
        assert!(methods.contains_type(&RootKind::Subscription));
        assert_eq!(methods.field_count(), 1);
    }

    #[test]
    fn test_unregistered_class() {
        let context = RegistryContext::new();
        let instance = ResolverInstance::new(QueriesOnly);
        assert_eq!(
            ResolverMethodBuilder::new(&context, &instance).build().unwrap_err(),
            GraphQLError::ClassNotRegistered("QueriesOnly")
        );
    }

    #[tokio::test]
    async fn test_resolver_marshals_args_key() {
        let context = context();
        let resolver = Arc::new(ResolverSchemaOne::default());
        let instance = ResolverInstance::from_arc(resolver.clone());
        let methods = ResolverMethodBuilder::new(&context, &instance).build().unwrap();

        let add_user = methods.resolver(&RootKind::Mutation, "addUser").unwrap();
        let value = add_user
            .call(Value::Null, json!({"id": "7", "other": "x"}), json!({}), Value::Null)
            .await
            .unwrap();

        assert_eq!(value, json!("7"));
        assert_eq!(*resolver.calls.lock().unwrap(), vec![vec![Some(json!("7"))]]);
    }

    #[tokio::test]
    async fn test_method_errors_propagate() {
        let context = context();
        let instance = ResolverInstance::new(QueriesOnly);
        let methods = ResolverMethodBuilder::new(&context, &instance).build().unwrap();

        let error = methods
            .resolver(&RootKind::Query, "countries")
            .unwrap()
            .call(Value::Null, json!({}), Value::Null, Value::Null)
            .await
            .unwrap_err();
        assert_eq!(error.to_string(), "offline");
    }

    #[tokio::test]
    async fn test_subscription_filter() {
        let context = context();
        let instance = ResolverInstance::new(ResolverSchemaOne::default());
        let methods = ResolverMethodBuilder::new(&context, &instance).build().unwrap();

        let subscription = methods.subscription("roomMessages").unwrap();
        let events: Vec<Value> = subscription
            .subscribe
            .call(Value::Null, json!({"room": "a"}), Value::Null, Value::Null)
            .await
            .unwrap()
            .collect()
            .await;

        let texts: Vec<&Value> = events.iter().map(|event| &event["text"]).collect();
        assert_eq!(texts, vec!["hi", "bye"]);

        let unfiltered: Vec<Value> = methods
            .subscription("subscription")
            .unwrap()
            .subscribe
            .call(Value::Null, Value::Null, Value::Null, Value::Null)
            .await
            .unwrap()
            .collect()
            .await;
        assert_eq!(unfiltered, vec![json!(1)]);
    }
}
