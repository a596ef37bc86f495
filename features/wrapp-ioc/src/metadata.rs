//! Explicit registration of type metadata
//!
//! Services, controllers and modules are ordinary Rust types. What the container needs to know
//! about them - constructor parameters, explicit injection tokens, capability flags and how to
//! construct them - is declared once through a [TypeDescriptor] and looked up by type identity
//! through the [Metadata] trait.

use std::{
    any::TypeId,
    collections::{BTreeMap, HashMap},
    fmt,
    sync::Arc,
};

use parking_lot::RwLock;

use crate::{
    errors::MetadataError,
    module::Module,
    provider::{erase, Factory},
    resolver::Arguments,
    types::{DynError, Injectable, Token, TypeInfo},
};

/// Declares how a type is constructed and what it is
#[derive(Clone)]
pub struct TypeDescriptor {
    info: TypeInfo,
    parameters: Vec<TypeInfo>,
    inject: BTreeMap<usize, Token>,
    service: bool,
    controller: bool,
    constructor: Factory,
}
impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("info", &self.info)
            .field("parameters", &self.parameters)
            .field("inject", &self.inject)
            .field("service", &self.service)
            .field("controller", &self.controller)
            .finish_non_exhaustive()
    }
}

impl TypeDescriptor {
    /// Describes `T`, constructed by `constructor` from its resolved parameters
    pub fn new<T, E, F>(constructor: F) -> Self
    where
        T: Injectable,
        E: Into<DynError>,
        F: Fn(&mut Arguments) -> Result<T, E> + Send + Sync + 'static,
    {
        TypeDescriptor {
            info: TypeInfo::of::<T>(),
            parameters: Vec::new(),
            inject: BTreeMap::new(),
            service: false,
            controller: false,
            constructor: erase(constructor),
        }
    }

    /// Flags the type as a service
    pub fn service(mut self) -> Self {
        self.service = true;
        self
    }

    /// Flags the type as a controller
    pub fn controller(mut self) -> Self {
        self.controller = true;
        self
    }

    /// Appends a constructor parameter of type `P`
    pub fn param<P: 'static + ?Sized>(self) -> Self {
        self.param_type(TypeInfo::of::<P>())
    }

    pub fn param_type(mut self, parameter: TypeInfo) -> Self {
        self.parameters.push(parameter);
        self
    }

    /// Resolves the parameter at `index` through `token` instead of its type
    pub fn inject(mut self, index: usize, token: impl Into<Token>) -> Self {
        self.inject.insert(index, token.into());
        self
    }

    pub fn info(&self) -> TypeInfo {
        self.info
    }

    pub fn parameters(&self) -> &[TypeInfo] {
        &self.parameters
    }

    pub fn injection_token(&self, index: usize) -> Option<&Token> {
        self.inject.get(&index)
    }

    pub fn is_service(&self) -> bool {
        self.service
    }

    pub fn is_controller(&self) -> bool {
        self.controller
    }

    pub fn constructor(&self) -> &Factory {
        &self.constructor
    }

    /// Checks that every explicit token targets an existing constructor parameter
    pub fn validate(&self) -> Result<(), MetadataError> {
        match self.inject.keys().find(|index| **index >= self.parameters.len()) {
            Some(index) => Err(MetadataError::ExplicitInjectionMisuse {
                target: self.info,
                index: *index,
                parameters: self.parameters.len(),
            }),
            None => Ok(()),
        }
    }
}

/// Types that describe themselves
pub trait Describe: Injectable + Sized {
    fn describe() -> TypeDescriptor;
}

/// Lookup of type metadata, keyed by type identity
pub trait Metadata: Send + Sync {
    fn descriptor(&self, ty: &TypeInfo) -> Option<Arc<TypeDescriptor>>;

    /// The module defined for the given type
    fn module(&self, ty: &TypeInfo) -> Option<Arc<Module>>;

    /// Records a defined module under its type
    fn tag_module(&self, module: Arc<Module>);

    fn is_service(&self, ty: &TypeInfo) -> bool {
        self.descriptor(ty).is_some_and(|descriptor| descriptor.is_service())
    }

    fn is_controller(&self, ty: &TypeInfo) -> bool {
        self.descriptor(ty).is_some_and(|descriptor| descriptor.is_controller())
    }

    fn is_module(&self, ty: &TypeInfo) -> bool {
        self.module(ty).is_some()
    }

    /// Constructor parameter types in declaration order - empty if none are declared
    fn constructor_parameter_types(&self, ty: &TypeInfo) -> Vec<TypeInfo> {
        self.descriptor(ty)
            .map(|descriptor| descriptor.parameters().to_vec())
            .unwrap_or_default()
    }

    fn explicit_injection_token(&self, ty: &TypeInfo, index: usize) -> Option<Token> {
        self.descriptor(ty)
            .and_then(|descriptor| descriptor.injection_token(index).cloned())
    }

    fn constructor(&self, ty: &TypeInfo) -> Option<Factory> {
        self.descriptor(ty)
            .map(|descriptor| descriptor.constructor().clone())
    }
}

/// In-memory [Metadata] filled through explicit registration
#[derive(Default)]
pub struct MetadataRegistry {
    descriptors: RwLock<HashMap<TypeId, Arc<TypeDescriptor>>>,
    modules: RwLock<HashMap<TypeId, Arc<Module>>>,
}
impl fmt::Debug for MetadataRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let descriptors = self.descriptors.read();
        let modules = self.modules.read();
        let mut map = f.debug_struct("MetadataRegistry");
        for descriptor in descriptors.values() {
            let val = match (descriptor.is_service(), descriptor.is_controller()) {
                (true, true) => "service+controller",
                (true, false) => "service",
                (false, true) => "controller",
                (false, false) => "constructible",
            };
            map.field(descriptor.info().type_name, &val);
        }
        for module in modules.values() {
            map.field(module.name(), &"module");
        }
        map.finish()
    }
}

impl MetadataRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a descriptor, replacing any earlier one for the same type
    pub fn describe(&self, descriptor: TypeDescriptor) -> Result<(), MetadataError> {
        descriptor.validate()?;

        let info = descriptor.info();
        if self
            .descriptors
            .write()
            .insert(info.type_id, Arc::new(descriptor))
            .is_some()
        {
            tracing::debug!("Replaced the descriptor of {}", info.type_name);
        }
        Ok(())
    }

    pub fn register<T: Describe>(&self) -> Result<(), MetadataError> {
        self.describe(T::describe())
    }
}

impl Metadata for MetadataRegistry {
    fn descriptor(&self, ty: &TypeInfo) -> Option<Arc<TypeDescriptor>> {
        self.descriptors.read().get(&ty.type_id).cloned()
    }

    fn module(&self, ty: &TypeInfo) -> Option<Arc<Module>> {
        self.modules.read().get(&ty.type_id).cloned()
    }

    fn tag_module(&self, module: Arc<Module>) {
        self.modules.write().insert(module.info().type_id, module);
    }
}

#[cfg(test)]
mod tests {
    use std::convert::Infallible;

    use super::*;

    struct OtherClass;

    struct ValidClass;
    impl Describe for ValidClass {
        fn describe() -> TypeDescriptor {
            TypeDescriptor::new(|_| Ok::<_, Infallible>(ValidClass))
                .param::<String>()
                .param::<OtherClass>()
                .param::<bool>()
                .inject(0, "Item")
                .inject(2, "item3")
                .service()
        }
    }

    #[test]
    fn records_explicit_tokens_by_parameter_index() {
        let metadata = MetadataRegistry::new();
        metadata.register::<ValidClass>().unwrap();
        let info = TypeInfo::of::<ValidClass>();

        assert_eq!(metadata.explicit_injection_token(&info, 0), Some(Token::from("Item")));
        assert_eq!(metadata.explicit_injection_token(&info, 1), None);
        assert_eq!(metadata.explicit_injection_token(&info, 2), Some(Token::from("item3")));
        assert_eq!(
            metadata.constructor_parameter_types(&info),
            vec![TypeInfo::of::<String>(), TypeInfo::of::<OtherClass>(), TypeInfo::of::<bool>()]
        );
    }

    #[test]
    fn token_outside_the_constructor_is_rejected() {
        let metadata = MetadataRegistry::new();
        let descriptor = TypeDescriptor::new(|_| Ok::<_, Infallible>(OtherClass))
            .param::<String>()
            .inject(1, "NotAParameter");

        let error = metadata.describe(descriptor).unwrap_err();

        assert!(matches!(
            error,
            MetadataError::ExplicitInjectionMisuse { index: 1, parameters: 1, .. }
        ));
        assert!(metadata.descriptor(&TypeInfo::of::<OtherClass>()).is_none());
    }

    #[test]
    fn capability_flags_follow_the_descriptor() {
        let metadata = MetadataRegistry::new();
        metadata.register::<ValidClass>().unwrap();
        metadata
            .describe(TypeDescriptor::new(|_| Ok::<_, Infallible>(OtherClass)).controller())
            .unwrap();

        assert!(metadata.is_service(&TypeInfo::of::<ValidClass>()));
        assert!(!metadata.is_controller(&TypeInfo::of::<ValidClass>()));
        assert!(metadata.is_controller(&TypeInfo::of::<OtherClass>()));
        assert!(!metadata.is_service(&TypeInfo::of::<OtherClass>()));
        assert!(!metadata.is_module(&TypeInfo::of::<ValidClass>()));
    }

    #[test]
    fn unknown_types_have_no_metadata() {
        let metadata = MetadataRegistry::new();
        let info = TypeInfo::of::<OtherClass>();

        assert!(!metadata.is_service(&info));
        assert!(metadata.constructor_parameter_types(&info).is_empty());
        assert!(metadata.explicit_injection_token(&info, 0).is_none());
        assert!(metadata.constructor(&info).is_none());
    }
}
