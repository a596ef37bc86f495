//! Modules group services behind a private container
//!
//! A module is declared with a [ModuleDefinition] and validated once by
//! [ModuleDefinition::define]. The resulting [Module] can only be asked for its controllers and
//! for its exports. Importing a module copies its exports - the exported tokens plus everything
//! they depend on - into the importing module's container.

use std::{any::type_name, collections::HashSet, fmt, sync::Arc};

use crate::{
    config::ContainerConfig,
    container::Container,
    errors::{ModuleError, ResolveError},
    metadata::Metadata,
    registry::{Declaration, Export},
    resolver::Resolve,
    types::{Injectable, Instance, Token, TypeInfo},
};

/// A module that is still being declared
#[derive(Debug, Clone)]
pub struct ModuleDefinition {
    info: TypeInfo,
    imports: Vec<TypeInfo>,
    providers: Vec<Declaration>,
    controllers: Vec<TypeInfo>,
    exports: Vec<Declaration>,
    config: ContainerConfig,
}

impl ModuleDefinition {
    /// Declares a module identified by the type `M`
    pub fn new<M: 'static>() -> Self {
        Self::for_type(TypeInfo::of::<M>())
    }

    pub fn for_type(info: TypeInfo) -> Self {
        ModuleDefinition {
            info,
            imports: Vec::new(),
            providers: Vec::new(),
            controllers: Vec::new(),
            exports: Vec::new(),
            config: ContainerConfig::default(),
        }
    }

    /// Imports the exports of the module defined for `M`
    pub fn import<M: 'static>(self) -> Self {
        self.import_type(TypeInfo::of::<M>())
    }

    pub fn import_type(mut self, module: TypeInfo) -> Self {
        self.imports.push(module);
        self
    }

    /// Adds a service type or a provider
    pub fn provider(mut self, declaration: impl Into<Declaration>) -> Self {
        self.providers.push(declaration.into());
        self
    }

    pub fn service<T: 'static>(self) -> Self {
        self.provider(Declaration::of::<T>())
    }

    pub fn controller<C: 'static>(self) -> Self {
        self.controller_type(TypeInfo::of::<C>())
    }

    pub fn controller_type(mut self, controller: TypeInfo) -> Self {
        self.controllers.push(controller);
        self
    }

    pub fn export(mut self, declaration: impl Into<Declaration>) -> Self {
        self.exports.push(declaration.into());
        self
    }

    pub fn export_service<T: 'static>(self) -> Self {
        self.export(Declaration::of::<T>())
    }

    pub fn config(mut self, config: ContainerConfig) -> Self {
        self.config = config;
        self
    }

    /// Validates the declaration and builds the module
    ///
    /// On success the module is tagged in `metadata`, so other modules can import it.
    /// The module only refers back to `metadata` weakly: it resolves for as long as the metadata
    /// is alive, and is dropped together with it.
    pub fn define(self, metadata: Arc<dyn Metadata>) -> Result<Arc<Module>, ModuleError> {
        let module = self.info.type_name;
        let container = Container::owned_by(&metadata, self.config);

        for import in &self.imports {
            let imported = metadata
                .module(import)
                .ok_or_else(|| ModuleError::InvalidImport {
                    entry: import.to_string(),
                    module,
                })?;

            for export in imported.get_exports() {
                container
                    .add_service_or_token(export.clone())
                    .map_err(|_| ModuleError::InvalidImport {
                        entry: import.to_string(),
                        module,
                    })?;
            }
        }

        for provider in self.providers {
            let entry = provider.to_string();
            if let Declaration::Type(service) = &provider {
                if !metadata.is_service(service) {
                    return Err(ModuleError::InvalidProvider { entry, module });
                }
            }

            container
                .add_service_or_token(provider)
                .map_err(|_| ModuleError::InvalidProvider { entry, module })?;
        }

        if let Some(controller) = self
            .controllers
            .iter()
            .find(|controller| !metadata.is_controller(controller))
        {
            return Err(ModuleError::InvalidController {
                entry: controller.to_string(),
                module,
            });
        }

        let mut seen = HashSet::new();
        let mut exports = Vec::new();
        for export in &self.exports {
            let token = export.token();
            let valid = match export {
                Declaration::Type(service) => {
                    metadata.is_service(service) || container.provider(&token).is_some()
                }
                // Providers are exported as registered, a differing payload is rejected
                Declaration::Spec(spec) => container
                    .provider(&token)
                    .is_some_and(|provider| provider.is_declared_by(spec)),
                Declaration::Provider(provider) => container
                    .provider(&token)
                    .is_some_and(|registered| Arc::ptr_eq(&registered, provider)),
            };

            // Only what the module provides or imports can be exported
            if !valid || !container.contains(&token) {
                return Err(ModuleError::InvalidExport {
                    entry: export.to_string(),
                    module,
                });
            }

            for node in container.resolve_deps(&token)? {
                if seen.insert(node.clone()) {
                    exports.push(node);
                }
            }
        }

        let module = Arc::new(Module {
            info: self.info,
            container,
            controllers: self.controllers,
            exports: exports.into_boxed_slice(),
        });
        metadata.tag_module(module.clone());

        tracing::debug!(
            "Defined module {} with {} controllers and {} exports",
            module.name(),
            module.controllers.len(),
            module.exports.len()
        );
        Ok(module)
    }
}

/// A defined module
pub struct Module {
    info: TypeInfo,
    container: Container,
    controllers: Vec<TypeInfo>,
    exports: Box<[Export]>,
}
impl fmt::Debug for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Module")
            .field("name", &self.info.type_name)
            .field("controllers", &self.controllers)
            .field("exports", &self.exports)
            .finish()
    }
}

impl Module {
    pub fn name(&self) -> &'static str {
        self.info.type_name
    }

    pub fn info(&self) -> TypeInfo {
        self.info
    }

    pub fn container(&self) -> &Container {
        &self.container
    }

    pub fn controllers(&self) -> &[TypeInfo] {
        &self.controllers
    }

    /// Constructs a new instance of a controller declared by this module
    pub fn get_controller<C: Injectable>(&self) -> Result<Arc<C>, ModuleError> {
        self.get_controller_instance(TypeInfo::of::<C>())?
            .downcast::<C>()
            .map_err(|actual_type| {
                ResolveError::DowncastFailed {
                    required_type: type_name::<C>(),
                    actual_type,
                }
                .into()
            })
    }

    pub fn get_controller_instance(&self, controller: TypeInfo) -> Result<Instance, ModuleError> {
        if !self.controllers.contains(&controller) {
            return Err(ModuleError::UnknownController {
                controller: controller.type_name,
                module: self.name(),
            });
        }

        Ok(self.container.resolve_instance(controller)?)
    }

    /// Exported providers and services, including everything they depend on
    pub fn get_exports(&self) -> &[Export] {
        &self.exports
    }

    /// True if `token` is part of the exports
    pub fn exports_token(&self, token: &Token) -> bool {
        self.exports.iter().any(|export| export.token() == *token)
    }
}

pub fn get_controller<C: Injectable>(module: &Module) -> Result<Arc<C>, ModuleError> {
    module.get_controller()
}

pub fn get_exports(module: &Module) -> &[Export] {
    module.get_exports()
}

/// Looks up the module defined for `module` and constructs one of its controllers
pub fn load_controller<C: Injectable>(
    metadata: &dyn Metadata,
    module: TypeInfo,
) -> Result<Arc<C>, ModuleError> {
    metadata
        .module(&module)
        .ok_or(ModuleError::InvalidModule(module.type_name))?
        .get_controller()
}
