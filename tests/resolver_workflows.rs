//! Integration tests for common resolver workflows.
//!
//! These tests go through the facade crate the way applications do.

use armature_resolvers::prelude::*;
use futures::StreamExt;
use serde::Serialize;
use serde_json::{Value, json};
use std::sync::Arc;

#[derive(Debug, Clone, Serialize)]
struct Country {
    id: u32,
    name: &'static str,
    continent: &'static str,
}

const COUNTRIES: [Country; 3] = [
    Country { id: 1, name: "italy", continent: "europe" },
    Country { id: 2, name: "spain", continent: "europe" },
    Country { id: 3, name: "china", continent: "asia" },
];

#[derive(Default)]
struct CountryResolver;

#[resolver(crate = armature_resolvers)]
impl CountryResolver {
    #[query]
    fn countries(&self, #[args("continent")] continent: String) -> Vec<Country> {
        COUNTRIES.into_iter().filter(|country| country.continent == continent).collect()
    }

    #[field(type = Country, name = "neighbours")]
    async fn neighbours(&self, #[parent] country: Value) -> Vec<&'static str> {
        COUNTRIES
            .iter()
            .filter(|other| other.continent == country["continent"] && other.name != country["name"])
            .map(|other| other.name)
            .collect()
    }

    #[subscription(name = "countryAdded", filter = same_continent)]
    fn country_added(&self) -> EventStream {
        futures::stream::iter(COUNTRIES.into_iter().map(|country| json!(country))).boxed()
    }
}

fn same_continent(payload: &Value, variables: &Value) -> bool {
    payload["continent"] == variables["continent"]
}

async fn call(resolver: &FieldResolver, parent: Value, args: Value) -> Value {
    resolver.call(parent, args, json!({}), Value::Null).await.unwrap()
}

// =============================================================================
// Registration and build
// =============================================================================

#[test]
fn test_register_and_build() {
    let mut context = RegistryContext::new();
    context.register::<CountryResolver>().unwrap();
    context.register::<CountryResolver>().unwrap();

    assert_eq!(context.classes().len(), 1);

    let declarations = GraphQLResolvers::new(&context).declarations();
    assert_eq!(declarations.len(), 1);
    assert_eq!(declarations[0].class(), ClassRef::of::<CountryResolver>());
    assert!(declarations[0].has_factory());

    let resolvers = GraphQLResolvers::new(&context)
        .build_registered(ExternalResolvers::None)
        .unwrap();
    assert_eq!(resolvers.len(), 1);

    let kinds: Vec<String> = resolvers[0].types().map(|(kind, _)| kind.to_string()).collect();
    assert_eq!(kinds, vec!["Query", "Country", "Subscription"]);
}

#[test]
fn test_legacy_empty_roots() {
    let config = ResolverConfig::new().with_empty_roots(true).with_logging(false);
    let mut context = RegistryContext::with_config(config);
    context.register::<CountryResolver>().unwrap();

    let resolvers = GraphQLResolvers::new(&context)
        .build_registered(ExternalResolvers::None)
        .unwrap();
    assert!(resolvers[0].contains_type(&RootKind::Mutation));
    assert!(resolvers[0].get(&RootKind::Mutation).unwrap().is_empty());
}

// =============================================================================
// Execution
// =============================================================================

#[tokio::test]
async fn test_external_and_declared_resolvers_merge() {
    let mut context = RegistryContext::new();
    context.register::<CountryResolver>().unwrap();

    let existing = Arc::new(ResolverMap::new().with_resolver(
        RootKind::Query,
        "testOne",
        FieldResolver::from_fn(|_, _, _, _| Ok(json!("testOne"))),
    ));
    let resolvers = GraphQLResolvers::new(&context)
        .build_registered(vec![existing.clone(), existing])
        .unwrap();
    assert_eq!(resolvers.len(), 2);

    let merged = merge_resolver_maps(&resolvers);
    let test_one = merged.resolver(&RootKind::Query, "testOne").unwrap();
    assert_eq!(call(test_one, Value::Null, json!({})).await, "testOne");

    let countries = merged.resolver(&RootKind::Query, "countries").unwrap();
    let europe = call(countries, Value::Null, json!({ "continent": "europe" })).await;
    assert_eq!(
        europe,
        json!([
            { "id": 1, "name": "italy", "continent": "europe" },
            { "id": 2, "name": "spain", "continent": "europe" },
        ])
    );

    let neighbours = merged
        .resolver(&RootKind::Object("Country".into()), "neighbours")
        .unwrap();
    assert_eq!(call(neighbours, europe[0].clone(), json!({})).await, json!(["spain"]));
}

#[tokio::test]
async fn test_filtered_subscription() {
    let mut context = RegistryContext::new();
    context.register::<CountryResolver>().unwrap();
    let resolvers = build_with_instance(&context);

    let subscription = resolvers[0].subscription("countryAdded").unwrap();
    let names: Vec<Value> = subscription
        .subscribe
        .call(Value::Null, json!({ "continent": "asia" }), Value::Null, Value::Null)
        .await
        .unwrap()
        .map(|country| country["name"].clone())
        .collect()
        .await;
    assert_eq!(names, vec![json!("china")]);
}

fn build_with_instance(context: &RegistryContext) -> Vec<Arc<ResolverMap>> {
    GraphQLResolvers::new(context)
        .build(&[ResolverInstance::new(CountryResolver)], None::<ResolverMap>)
        .unwrap()
}

#[test]
fn test_marshal_args_key() {
    let params = [ParameterMetadata::new("insertUser", ParamKind::Args, 0).with_key("id")];
    let input = armature_resolvers::ResolverInput::new(
        Value::Null,
        json!({ "id": "7", "other": "x" }),
        Value::Null,
        Value::Null,
    );

    let args = armature_resolvers::marshal(&params, &input);
    assert_eq!(args.into_vec(), vec![Some(json!("7"))]);
}
