//! Process-wide resolver registry.
//!
//! Applications that prefer implicit registration can register their
//! resolver classes here and build the resolver list without threading a
//! [`RegistryContext`] through their code. The context is configured from
//! the environment on first use.
//!
//! [`clear`] must not run concurrently with registration or building.

use crate::aggregator::{ExternalResolvers, GraphQLResolvers};
use crate::config::ResolverConfig;
use crate::context::{RegistryContext, ResolverDeclaration};
use crate::declaration::{Resolver, ResolverInstance};
use crate::error::Result;
use crate::resolver_map::ResolverMap;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::sync::Arc;

static REGISTRY: Lazy<RwLock<RegistryContext>> =
    Lazy::new(|| RwLock::new(RegistryContext::with_config(ResolverConfig::from_env())));

/// Register `R` in the process-wide registry
pub fn register<R: Resolver + Default>() -> Result<()> {
    REGISTRY.write().register::<R>()
}

pub fn register_with<R, F>(factory: F) -> Result<()>
where
    R: Resolver,
    F: Fn() -> R + Send + Sync + 'static,
{
    REGISTRY.write().register_with(factory)
}

pub fn register_shared<R: Resolver>(instance: Arc<R>) -> Result<()> {
    REGISTRY.write().register_shared(instance)
}

pub fn is_registered<R: Resolver>() -> bool {
    REGISTRY.read().is_registered::<R>()
}

pub fn declarations() -> Vec<ResolverDeclaration> {
    REGISTRY.read().declarations()
}

/// Build the resolver list from every registered class
pub fn build(external: impl Into<ExternalResolvers>) -> Result<Vec<Arc<ResolverMap>>> {
    let registry = REGISTRY.read();
    GraphQLResolvers::new(&registry).build_registered(external)
}

/// Build the resolver list from caller-supplied instances
pub fn build_from(
    instances: &[ResolverInstance],
    external: impl Into<ExternalResolvers>,
) -> Result<Vec<Arc<ResolverMap>>> {
    let registry = REGISTRY.read();
    GraphQLResolvers::new(&registry).build(instances, external)
}

/// Run `f` with shared access to the registry
pub fn with_registry<T>(f: impl FnOnce(&RegistryContext) -> T) -> T {
    f(&REGISTRY.read())
}

/// Forget every registration
pub fn clear() {
    REGISTRY.write().clear();
}
