// Armature Resolvers - decorator-driven GraphQL resolver maps for Rust
//
// Resolver types are annotated with #[resolver], registered into a registry
// context and turned into the resolver list a GraphQL engine executes.

// Re-export core functionality
pub use armature_graphql::*;

// Re-export the procedural macros crate
pub use armature_graphql_macros;

// Prelude for common imports
//
// Through this crate, `#[resolver]` needs the crate path:
// `#[resolver(crate = armature_resolvers)]`.
pub mod prelude {
    pub use armature_graphql::prelude::*;
    pub use armature_graphql::{
        ClassRef, FieldMetadata, GraphQLError, LogLevel, ParamKind, ParameterMetadata, QueryMetadata,
        ResolverDeclaration, ResolverEntry, SubscribeFn, SubscriptionResolver, global,
    };
}
