//! Aggregation of resolver map segments into the list handed to the engine.

use crate::builder::ResolverMethodBuilder;
use crate::context::{RegistryContext, ResolverDeclaration};
use crate::declaration::ResolverInstance;
use crate::error::Result;
use crate::resolver_map::ResolverMap;
use std::sync::Arc;
use tracing::debug;

/// Resolver maps supplied by the application alongside its resolver classes
#[derive(Debug, Clone, Default)]
pub enum ExternalResolvers {
    #[default]
    None,
    One(Arc<ResolverMap>),
    Many(Vec<Arc<ResolverMap>>),
}

impl ExternalResolvers {
    /// Maps in supplied order, without repeated references
    pub fn into_unique(self) -> Vec<Arc<ResolverMap>> {
        let maps = match self {
            ExternalResolvers::None => return Vec::new(),
            ExternalResolvers::One(map) => return vec![map],
            ExternalResolvers::Many(maps) => maps,
        };

        let mut unique: Vec<Arc<ResolverMap>> = Vec::with_capacity(maps.len());
        for map in maps {
            if !unique.iter().any(|seen| Arc::ptr_eq(seen, &map)) {
                unique.push(map);
            }
        }
        unique
    }
}

impl From<ResolverMap> for ExternalResolvers {
    fn from(map: ResolverMap) -> Self {
        ExternalResolvers::One(Arc::new(map))
    }
}

impl From<Arc<ResolverMap>> for ExternalResolvers {
    fn from(map: Arc<ResolverMap>) -> Self {
        ExternalResolvers::One(map)
    }
}

impl From<Vec<Arc<ResolverMap>>> for ExternalResolvers {
    fn from(maps: Vec<Arc<ResolverMap>>) -> Self {
        ExternalResolvers::Many(maps)
    }
}

impl From<Vec<ResolverMap>> for ExternalResolvers {
    fn from(maps: Vec<ResolverMap>) -> Self {
        ExternalResolvers::Many(maps.into_iter().map(Arc::new).collect())
    }
}

impl<T: Into<ExternalResolvers>> From<Option<T>> for ExternalResolvers {
    fn from(maps: Option<T>) -> Self {
        maps.map(Into::into).unwrap_or_default()
    }
}

/// Builds the final resolver list from a registry context
#[derive(Debug, Clone, Copy)]
pub struct GraphQLResolvers<'a> {
    context: &'a RegistryContext,
}

impl<'a> GraphQLResolvers<'a> {
    pub fn new(context: &'a RegistryContext) -> Self {
        Self { context }
    }

    /// Registered resolver classes with their factories
    pub fn declarations(&self) -> Vec<ResolverDeclaration> {
        self.context.declarations()
    }

    /// Build the resolver list: external maps first, then one segment per
    /// instance in class registration order. Segments are not merged.
    ///
    /// # Errors
    ///
    /// Fails with [`GraphQLError::ClassNotRegistered`](crate::GraphQLError::ClassNotRegistered)
    /// when an instance's class was never registered.
    pub fn build(
        &self,
        instances: &[ResolverInstance],
        external: impl Into<ExternalResolvers>,
    ) -> Result<Vec<Arc<ResolverMap>>> {
        let mut resolvers = external.into().into_unique();
        let external_count = resolvers.len();

        let classes = self.context.classes();
        let mut ordered: Vec<&ResolverInstance> = instances.iter().collect();
        ordered.sort_by_key(|instance| classes.position(&instance.class()).unwrap_or(usize::MAX));

        for instance in ordered {
            let segment = ResolverMethodBuilder::new(self.context, instance).build()?;
            resolvers.push(Arc::new(segment));
        }

        if self.context.config().enable_logging {
            debug!(
                external = external_count,
                segments = resolvers.len() - external_count,
                "Aggregated GraphQL resolvers"
            );
        }

        Ok(resolvers)
    }

    /// Instantiate every registered class through its factory, then [`build`](Self::build)
    pub fn build_registered(&self, external: impl Into<ExternalResolvers>) -> Result<Vec<Arc<ResolverMap>>> {
        let instances = self.context.instantiate_all()?;
        self.build(&instances, external)
    }
}
