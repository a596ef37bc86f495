use std::{collections::HashMap, sync::Arc};

use wrapp_ioc::{
    Injectable, Instance, Metadata, Module, ModuleDefinition, ModuleError,
    ProviderSpec, TypeInfo,
};

use crate::errors::ConfigError;

/// A registry of all configs, keyed by type
///
/// Each config becomes a value provider for its own type, so a constructor parameter of that
/// type receives the registered config.
#[derive(Debug, Default, Clone)]
pub struct ConfigProvider {
    configs: HashMap<TypeInfo, Instance>,
    /// Registration order, kept so the generated providers are stable
    order: Vec<TypeInfo>,
}

impl ConfigProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Retrieves the config of type `T`
    pub fn get_config<T: Injectable>(&self) -> Result<Arc<T>, ConfigError> {
        let info = TypeInfo::of::<T>();

        self.configs
            .get(&info)
            .and_then(|instance| instance.downcast::<T>().ok())
            .ok_or(ConfigError::Missing(info))
    }

    /// Adds a config to the registry
    ///
    /// Every type can only be registered once.
    pub fn add_config<T: Injectable>(&mut self, config: T) -> Result<&mut Self, ConfigError> {
        let info = TypeInfo::of::<T>();
        if self.configs.contains_key(&info) {
            return Err(ConfigError::AlreadyRegistered(info));
        }

        tracing::debug!("Registered config {}", info.type_name);
        self.configs.insert(info, Instance::new(config));
        self.order.push(info);
        Ok(self)
    }

    /// Same as [ConfigProvider::add_config] for `Some`, a no-op for `None`
    pub fn maybe_add_config<T: Injectable>(
        &mut self,
        config: Option<T>,
    ) -> Result<&mut Self, ConfigError> {
        match config {
            Some(c) => self.add_config(c),
            None => Ok(self),
        }
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// One value provider per config, provided under the config's type
    pub fn provider_specs(&self) -> Vec<ProviderSpec> {
        self.order
            .iter()
            .filter_map(|info| self.configs.get(info))
            .map(|instance| ProviderSpec::new(instance.info).use_instance(instance.clone()))
            .collect()
    }

    /// Defines the module `M` which provides and exports every config
    pub fn into_module<M: 'static>(
        &self,
        metadata: Arc<dyn Metadata>,
    ) -> Result<Arc<Module>, ModuleError> {
        self.provider_specs()
            .into_iter()
            .fold(ModuleDefinition::new::<M>(), |definition, spec| {
                definition.provider(spec.clone()).export(spec)
            })
            .define(metadata)
    }
}
