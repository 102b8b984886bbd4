//! Decorator-driven GraphQL resolver maps for Armature
//!
//! This crate turns annotated resolver types into the resolver maps a
//! GraphQL execution engine consumes.
//!
//! ## Features
//!
//! - **Annotations** - `#[resolver]` with `#[query]`, `#[mutation]`,
//!   `#[subscription]`, `#[field]` and parameter attributes, or the
//!   equivalent [`Declaration`] API
//! - **Registry contexts** - explicit, independent registries, plus an
//!   optional process-wide one in [`global`]
//! - **Subscriptions** - event streams with per-subscriber filters
//! - **Async** - every resolver is exposed as a future
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use armature_graphql::prelude::*;
//!
//! #[derive(Default)]
//! struct UserResolver;
//!
//! #[resolver]
//! impl UserResolver {
//!     #[query(name = "user")]
//!     fn find_user(&self, #[args("id")] id: String) -> Result<User, ResolverError> {
//!         Ok(User { id, name: "Ada".into() })
//!     }
//!
//!     #[field(type = User)]
//!     async fn friends(&self, #[parent] user: User) -> Vec<User> {
//!         Vec::new()
//!     }
//! }
//!
//! let mut context = RegistryContext::new();
//! context.register::<UserResolver>()?;
//!
//! let resolvers = GraphQLResolvers::new(&context).build_registered(ExternalResolvers::None)?;
//! ```

extern crate self as armature_graphql;

pub mod aggregator;
pub mod builder;
pub mod class;
pub mod class_registry;
pub mod config;
pub mod context;
pub mod declaration;
pub mod error;
pub mod global;
#[cfg(feature = "subscriber")]
pub mod logging;
pub mod marshal;
pub mod metadata;
pub mod resolver_map;
pub mod subscription;

pub use aggregator::{ExternalResolvers, GraphQLResolvers};
pub use armature_graphql_macros::resolver;
pub use builder::ResolverMethodBuilder;
pub use class::{ClassRef, TypeRef};
pub use class_registry::ClassRegistry;
pub use config::{LogLevel, ResolverConfig};
pub use context::{RegistryContext, ResolverDeclaration};
pub use declaration::{
    Annotation, AnyInstance, Declaration, InstanceFactory, IntoEventSource, Resolver, ResolverInstance,
    resolve_output,
};
pub use error::{GraphQLError, ResolverError, Result};
pub use marshal::{MethodArgs, ResolverInput, marshal};
pub use metadata::{
    FieldMetadata, FieldOptions, MAX_PARAMETERS, MetadataStore, MethodMetadata, MutationMetadata, MutationOptions, ParamKind,
    ParameterMetadata, QueryMetadata, QueryOptions, ResolverMetadata, SubscriptionMetadata, SubscriptionOptions,
};
pub use resolver_map::{
    FieldResolver, ResolveResult, ResolverEntry, ResolverMap, RootKind, SubscribeFn, SubscriptionResolver,
    TypeResolvers, merge_resolver_maps,
};
pub use subscription::{EventStream, SubscriptionFilter, with_filter};

/// Items needed to declare, register and build resolvers
pub mod prelude {
    pub use crate::aggregator::{ExternalResolvers, GraphQLResolvers};
    pub use crate::class::TypeRef;
    pub use crate::config::ResolverConfig;
    pub use crate::context::RegistryContext;
    pub use crate::declaration::{Declaration, Resolver, ResolverInstance};
    pub use crate::error::{GraphQLError, ResolverError};
    pub use crate::marshal::MethodArgs;
    pub use crate::metadata::{FieldOptions, MutationOptions, QueryOptions, SubscriptionOptions};
    pub use crate::resolver_map::{FieldResolver, ResolverMap, RootKind, merge_resolver_maps};
    pub use crate::subscription::{EventStream, SubscriptionFilter};
    pub use armature_graphql_macros::resolver;
}
