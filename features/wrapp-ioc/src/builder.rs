use std::sync::Arc;

use crate::{
    config::ContainerConfig,
    container::Container,
    errors::ProviderError,
    metadata::Metadata,
    provider::ProviderSpec,
    registry::Declaration,
};

/// Collects services and providers, then builds a [Container] from them
pub struct ContainerBuilder {
    metadata: Arc<dyn Metadata>,
    config: ContainerConfig,
    /// Registered in order on build
    declarations: Vec<Declaration>,
}

impl ContainerBuilder {
    pub fn new(metadata: Arc<dyn Metadata>) -> Self {
        ContainerBuilder {
            metadata,
            config: ContainerConfig::default(),
            declarations: Vec::new(),
        }
    }
}
impl ContainerBuilder {
    pub fn config(mut self, config: ContainerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn add_service<T: 'static>(mut self) -> Self {
        self.declarations.push(Declaration::of::<T>());
        self
    }

    pub fn add_provider(mut self, spec: ProviderSpec) -> Self {
        self.declarations.push(Declaration::Spec(spec));
        self
    }

    pub fn add(mut self, declaration: impl Into<Declaration>) -> Self {
        self.declarations.push(declaration.into());
        self
    }

    pub fn build(self) -> Result<Container, ProviderError> {
        let container = Container::with_config(self.metadata, self.config);
        let count = self.declarations.len();
        for declaration in self.declarations {
            container.add_service_or_token(declaration)?;
        }

        tracing::debug!("Built container with {count} declarations");
        Ok(container)
    }
}
