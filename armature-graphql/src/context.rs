//! Registry context: the explicit home of all resolver registrations.

use crate::class::ClassRef;
use crate::class_registry::ClassRegistry;
use crate::config::ResolverConfig;
use crate::declaration::{
    Annotation, Declaration, InstanceFactory, MethodBody, MethodTable, Resolver, ResolverInstance,
};
use crate::error::{GraphQLError, Result};
use crate::metadata::{MAX_PARAMETERS, ResolverMetadata};
use crate::resolver_map::RootKind;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// A registered resolver class and the factory creating its instances
#[derive(Clone)]
pub struct ResolverDeclaration {
    class: ClassRef,
    factory: Option<InstanceFactory>,
}

impl ResolverDeclaration {
    pub fn class(&self) -> ClassRef {
        self.class
    }

    pub fn has_factory(&self) -> bool {
        self.factory.is_some()
    }

    /// Create a new instance of the class
    pub fn instantiate(&self) -> Result<ResolverInstance> {
        self.factory
            .as_ref()
            .map(|factory| factory())
            .ok_or(GraphQLError::MissingFactory(self.class.name()))
    }
}

impl fmt::Debug for ResolverDeclaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolverDeclaration")
            .field("class", &self.class)
            .field("has_factory", &self.factory.is_some())
            .finish()
    }
}

/// Holds the class registry, metadata stores and method tables of one
/// independent build cycle.
pub struct RegistryContext {
    config: ResolverConfig,
    classes: ClassRegistry,
    metadata: ResolverMetadata,
    methods: HashMap<ClassRef, MethodTable>,
    factories: HashMap<ClassRef, InstanceFactory>,
}

impl RegistryContext {
    pub fn new() -> Self {
        Self::with_config(ResolverConfig::default())
    }

    pub fn with_config(config: ResolverConfig) -> Self {
        Self {
            config,
            classes: ClassRegistry::new(),
            metadata: ResolverMetadata::new(),
            methods: HashMap::new(),
            factories: HashMap::new(),
        }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Register `R`, instantiated through `Default`
    pub fn register<R: Resolver + Default>(&mut self) -> Result<()> {
        self.register_with(R::default)
    }

    /// Register `R` with a factory, e.g. one resolving dependencies
    pub fn register_with<R, F>(&mut self, factory: F) -> Result<()>
    where
        R: Resolver,
        F: Fn() -> R + Send + Sync + 'static,
    {
        let factory: InstanceFactory = Arc::new(move || ResolverInstance::new(factory()));
        self.flush(Declaration::<R>::collect(), Some(factory))
    }

    /// Register `R` with one shared instance handed out on every instantiation
    pub fn register_shared<R: Resolver>(&mut self, instance: Arc<R>) -> Result<()> {
        let factory: InstanceFactory = Arc::new(move || ResolverInstance::from_arc(instance.clone()));
        self.flush(Declaration::<R>::collect(), Some(factory))
    }

    /// Register the metadata of `R` only; instances must be supplied to the build
    pub fn register_class<R: Resolver>(&mut self) -> Result<()> {
        self.flush(Declaration::<R>::collect(), None)
    }

    fn flush<R: Resolver>(&mut self, declaration: Declaration<R>, factory: Option<InstanceFactory>) -> Result<()> {
        let class = declaration.class();
        if self.classes.contains(&class) {
            if self.config.enable_logging {
                warn!(resolver = class.name(), "Resolver already registered, ignoring");
            }
            return Ok(());
        }

        let (class, annotations, methods) = declaration.into_parts();
        validate(class, &annotations, &methods)?;

        self.classes.register(class);
        let annotation_count = annotations.len();
        for annotation in annotations {
            match annotation {
                Annotation::Query(record) => self.metadata.queries.merge(class, record),
                Annotation::Mutation(record) => self.metadata.mutations.merge(class, record),
                Annotation::Subscription(record) => self.metadata.subscriptions.merge(class, record),
                Annotation::Field(record) => self.metadata.fields.merge(class, record),
                Annotation::Parameter(record) => self.metadata.parameters.merge(class, record),
            }
        }
        self.methods.insert(class, methods);
        if let Some(factory) = factory {
            self.factories.insert(class, factory);
        }

        if self.config.enable_logging {
            debug!(
                resolver = class.name(),
                annotations = annotation_count,
                "Resolver registered"
            );
        }
        Ok(())
    }

    pub fn is_registered<R: Resolver>(&self) -> bool {
        self.classes.contains(&ClassRef::of::<R>())
    }

    pub fn contains(&self, class: &ClassRef) -> bool {
        self.classes.contains(class)
    }

    pub fn classes(&self) -> &ClassRegistry {
        &self.classes
    }

    pub fn metadata(&self) -> &ResolverMetadata {
        &self.metadata
    }

    pub(crate) fn method(&self, class: &ClassRef, name: &str) -> Option<&MethodBody> {
        self.methods.get(class).and_then(|table| table.get(name))
    }

    /// Registered classes in registration order
    pub fn declarations(&self) -> Vec<ResolverDeclaration> {
        self.classes
            .get_all()
            .iter()
            .map(|class| ResolverDeclaration {
                class: *class,
                factory: self.factories.get(class).cloned(),
            })
            .collect()
    }

    /// One fresh instance per registered class, in registration order
    pub fn instantiate_all(&self) -> Result<Vec<ResolverInstance>> {
        self.declarations()
            .iter()
            .map(ResolverDeclaration::instantiate)
            .collect()
    }

    /// Forget every registration
    pub fn clear(&mut self) {
        let count = self.classes.len();
        self.classes.clear();
        self.metadata.clear();
        self.methods.clear();
        self.factories.clear();

        if self.config.enable_logging {
            debug!(resolver_count = count, "Cleared resolver registry");
        }
    }
}

impl Default for RegistryContext {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RegistryContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryContext")
            .field("config", &self.config)
            .field("classes", &self.classes.get_all())
            .finish_non_exhaustive()
    }
}

/// Check a declaration before anything of it is stored
fn validate(class: ClassRef, annotations: &[Annotation], methods: &MethodTable) -> Result<()> {
    let expect_body = |method: &str, subscription: bool| -> Result<()> {
        let body = methods
            .get(method)
            .ok_or_else(|| GraphQLError::undefined_method(class, method))?;
        let (expected, matches) = match (subscription, body) {
            (true, MethodBody::Source(_)) | (false, MethodBody::Resolve(_)) => ("", true),
            (true, MethodBody::Resolve(_)) => ("subscription source", false),
            (false, MethodBody::Source(_)) => ("resolver method", false),
        };
        if matches {
            Ok(())
        } else {
            Err(GraphQLError::MethodKindMismatch {
                class: class.name(),
                method: method.to_string(),
                expected,
                found: body.describe(),
            })
        }
    };

    let mut resolvable: HashSet<&str> = HashSet::new();
    for annotation in annotations {
        match annotation {
            Annotation::Query(record) => {
                expect_body(&record.method, false)?;
                resolvable.insert(&record.method);
            }
            Annotation::Mutation(record) => {
                expect_body(&record.method, false)?;
                resolvable.insert(&record.method);
            }
            Annotation::Field(record) => {
                expect_body(&record.method, false)?;
                let type_name = record.type_name();
                if type_name.trim().is_empty() {
                    return Err(GraphQLError::EmptyTypeName {
                        class: class.name(),
                        method: record.method.clone(),
                    });
                }
                if RootKind::is_reserved(type_name) {
                    return Err(GraphQLError::ReservedTypeName {
                        class: class.name(),
                        method: record.method.clone(),
                        type_name: type_name.to_string(),
                    });
                }
                resolvable.insert(&record.method);
            }
            Annotation::Subscription(record) => expect_body(&record.method, true)?,
            Annotation::Parameter(_) => {}
        }
    }

    // Parameter annotations may precede the method annotation they belong to.
    for annotation in annotations {
        if let Annotation::Parameter(param) = annotation {
            if param.index >= MAX_PARAMETERS {
                return Err(GraphQLError::ParameterIndexOutOfRange {
                    class: class.name(),
                    method: param.method.clone(),
                    index: param.index,
                    limit: MAX_PARAMETERS,
                });
            }
            if !resolvable.contains(param.method.as_str()) {
                return Err(GraphQLError::OrphanParameter {
                    class: class.name(),
                    method: param.method.clone(),
                    index: param.index,
                });
            }
        }
    }

    Ok(())
}
