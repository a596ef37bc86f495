use std::{
    any::type_name,
    collections::HashSet,
    fmt::Debug,
    sync::{Arc, Weak},
};

use parking_lot::RwLock;

use crate::{
    builder::ContainerBuilder,
    config::ContainerConfig,
    errors::{ProviderError, ResolveError},
    metadata::Metadata,
    provider::{Provider, ProviderSpec},
    registry::{Declaration, Export, Registry},
    resolver::{Arguments, Resolve},
    types::{Injectable, Instance, Token, TypeInfo},
};

/// Registry plus resolution engine
///
/// Cloning is cheap and clones share the same registry. Nothing is cached: every resolution
/// walks the graph from the top and constructs new instances.
#[derive(Clone)]
pub struct Container(Arc<ContainerInner>);
pub struct ContainerInner {
    metadata: MetadataHandle,
    registry: RwLock<Registry>,
    config: ContainerConfig,
}
impl Debug for Container {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let registry = self.0.registry.read();
        let mut map = f.debug_struct("Container");
        for service in registry.services() {
            map.field(service.type_name, &"service");
        }
        for provider in registry.providers() {
            map.field(&provider.name().to_string(), &provider.kind());
        }
        map.finish()
    }
}

/// How a container reaches its metadata
///
/// Module containers only hold a weak reference, as the metadata owns the module once it is
/// tagged.
enum MetadataHandle {
    Shared(Arc<dyn Metadata>),
    Owner(Weak<dyn Metadata>),
}

impl Container {
    pub fn new(metadata: Arc<dyn Metadata>) -> Self {
        Self::with_config(metadata, ContainerConfig::default())
    }

    pub fn with_config(metadata: Arc<dyn Metadata>, config: ContainerConfig) -> Self {
        Self::with_handle(MetadataHandle::Shared(metadata), config)
    }

    /// A container for a module that will be tagged in `metadata`
    pub(crate) fn owned_by(metadata: &Arc<dyn Metadata>, config: ContainerConfig) -> Self {
        Self::with_handle(MetadataHandle::Owner(Arc::downgrade(metadata)), config)
    }

    fn with_handle(metadata: MetadataHandle, config: ContainerConfig) -> Self {
        Self(Arc::new(ContainerInner {
            metadata,
            registry: RwLock::new(Registry::default()),
            config,
        }))
    }

    pub fn builder(metadata: Arc<dyn Metadata>) -> ContainerBuilder {
        ContainerBuilder::new(metadata)
    }

    /// The metadata this container was built with
    ///
    /// Fails for a module container whose metadata has been dropped.
    pub fn metadata(&self) -> Result<Arc<dyn Metadata>, ResolveError> {
        match &self.0.metadata {
            MetadataHandle::Shared(metadata) => Ok(metadata.clone()),
            MetadataHandle::Owner(metadata) => {
                metadata.upgrade().ok_or(ResolveError::MetadataDropped)
            }
        }
    }

    pub fn config(&self) -> &ContainerConfig {
        &self.0.config
    }
}

// Registration
impl Container {
    pub fn add_service(&self, service: TypeInfo) {
        self.0.registry.write().add_service(service);
    }

    pub fn add_provider(&self, provider: impl Into<Arc<Provider>>) {
        self.0.registry.write().add_provider(provider.into());
    }

    /// Builds a provider from `spec` and registers it
    pub fn add_token(&self, spec: ProviderSpec) -> Result<(), ProviderError> {
        let provider = Provider::new(spec)?;
        self.add_provider(provider);
        Ok(())
    }

    pub fn add_service_or_token(
        &self,
        declaration: impl Into<Declaration>,
    ) -> Result<(), ProviderError> {
        self.0.registry.write().add_service_or_token(declaration)
    }

    pub fn has_service(&self, service: &TypeInfo) -> bool {
        self.0.registry.read().has_service(service)
    }

    pub fn provider(&self, token: &Token) -> Option<Arc<Provider>> {
        self.0.registry.read().provider(token)
    }

    /// True if the token is served by a provider or a service
    pub fn contains(&self, token: &Token) -> bool {
        self.0.registry.read().contains(token)
    }
}

// Resolution
impl Container {
    /// Constructs a new `T` with all of its dependencies
    pub fn resolve<T: Injectable>(&self) -> Result<Arc<T>, ResolveError> {
        self.resolve_instance(TypeInfo::of::<T>())?
            .downcast::<T>()
            .map_err(|actual_type| ResolveError::DowncastFailed {
                required_type: type_name::<T>(),
                actual_type,
            })
    }

    /// Resolves a token the same way a constructor parameter is resolved
    pub fn resolve_token(&self, token: impl Into<Token>) -> Result<Instance, ResolveError> {
        self.resolve_argument(&token.into(), 0)
    }

    /// Maps the parameters of `target` to the tokens they are resolved through
    ///
    /// An explicit injection token wins, otherwise the parameter type is the token.
    pub fn inject_parameters(
        &self,
        target: TypeInfo,
    ) -> Result<impl Fn(TypeInfo, usize) -> Token, ResolveError> {
        let metadata = self.metadata()?;
        Ok(move |parameter, index| {
            metadata
                .explicit_injection_token(&target, index)
                .unwrap_or(Token::Type(parameter))
        })
    }

    /// Tokens of the constructor parameters of `target`, in order
    pub fn parameter_tokens(&self, target: TypeInfo) -> Result<Vec<Token>, ResolveError> {
        let to_token = self.inject_parameters(target)?;
        Ok(self
            .metadata()?
            .constructor_parameter_types(&target)
            .into_iter()
            .enumerate()
            .map(|(index, parameter)| to_token(parameter, index))
            .collect())
    }

    /// Computes the transitive dependencies of `token` without constructing anything
    ///
    /// The result holds the node of `token` itself plus every provider and service it depends
    /// on, each exactly once.
    pub fn resolve_deps(&self, token: &Token) -> Result<Vec<Export>, ResolveError> {
        let mut visited = HashSet::new();
        let mut closure = Vec::new();
        self.collect_deps(token, &mut visited, &mut closure)?;
        Ok(closure)
    }

    fn collect_deps(
        &self,
        token: &Token,
        visited: &mut HashSet<Token>,
        closure: &mut Vec<Export>,
    ) -> Result<(), ResolveError> {
        if !visited.insert(token.clone()) {
            return Ok(());
        }

        let dependencies = if let Some(provider) = self.provider(token) {
            // Class providers declare nothing, their class's parameters are what they need
            let dependencies = match provider.class() {
                Some(class) => self.parameter_tokens(class)?,
                None => provider.deps().to_vec(),
            };
            closure.push(Export::Provider(provider));
            dependencies
        } else {
            match token {
                Token::Type(service) if self.has_service(service) => {
                    closure.push(Export::Service(*service));
                    self.parameter_tokens(*service)?
                }
                _ => return Err(ResolveError::UnresolvedToken(token.clone())),
            }
        };

        for dependency in &dependencies {
            self.collect_deps(dependency, visited, closure)?;
        }
        Ok(())
    }
}

impl Resolve for Container {
    fn resolve_instance(&self, target: TypeInfo) -> Result<Instance, ResolveError> {
        Frame::root(self).resolve_instance(target)
    }

    fn resolve_argument(&self, token: &Token, index: usize) -> Result<Instance, ResolveError> {
        Frame::root(self).resolve_argument(token, index)
    }
}

/// One level of a running resolution
struct Frame<'c> {
    container: &'c Container,
    depth: usize,
}

impl<'c> Frame<'c> {
    fn root(container: &'c Container) -> Self {
        Frame {
            container,
            depth: 0,
        }
    }

    fn descend(&self, token: &Token) -> Result<Frame<'c>, ResolveError> {
        let depth = self.depth + 1;
        let max_depth = self.container.config().max_depth;
        if depth > max_depth {
            tracing::error!("Resolving '{token}' exceeded the maximum depth of {max_depth}");
            return Err(ResolveError::DepthExceeded {
                token: token.clone(),
                max_depth,
            });
        }

        Ok(Frame {
            container: self.container,
            depth,
        })
    }
}

impl Resolve for Frame<'_> {
    fn resolve_instance(&self, target: TypeInfo) -> Result<Instance, ResolveError> {
        let constructor = self
            .container
            .metadata()?
            .constructor(&target)
            .ok_or(ResolveError::NotConstructible(target))?;

        tracing::trace!(depth = self.depth, "Resolving {}", target.type_name);

        let values = self
            .container
            .parameter_tokens(target)?
            .iter()
            .enumerate()
            .map(|(index, token)| self.resolve_argument(token, index))
            .collect::<Result<Vec<_>, _>>()?;

        let owner = Token::Type(target);
        let mut arguments = Arguments::new(owner.clone(), values);
        constructor(&mut arguments).map_err(|error| ResolveError::construction(owner, error))
    }

    fn resolve_argument(&self, token: &Token, index: usize) -> Result<Instance, ResolveError> {
        let frame = self.descend(token)?;

        if let Some(provider) = self.container.provider(token) {
            return provider.get_value(&frame);
        }

        match token {
            Token::Type(service) if self.container.has_service(service) => {
                frame.resolve_instance(*service)
            }
            _ => Err(ResolveError::UnresolvedParameter {
                index,
                type_name: token.to_string(),
            }),
        }
    }
}
