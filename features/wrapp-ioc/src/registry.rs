use std::{
    collections::HashMap,
    fmt,
    hash::{Hash, Hasher},
    sync::Arc,
};

use crate::{
    errors::ProviderError,
    provider::{Provider, ProviderSpec},
    types::{Token, TypeInfo},
};

/// Anything that can be registered into a container
#[derive(Debug, Clone)]
pub enum Declaration {
    /// A service type
    Type(TypeInfo),
    /// A provider that still has to be built
    Spec(ProviderSpec),
    /// An already built provider, e.g. copied from another module's exports
    Provider(Arc<Provider>),
}
impl Declaration {
    pub fn of<T: 'static>() -> Self {
        Declaration::Type(TypeInfo::of::<T>())
    }

    /// The token this declaration is registered under
    pub fn token(&self) -> Token {
        match self {
            Declaration::Type(info) => Token::Type(*info),
            Declaration::Spec(spec) => spec.provide.clone(),
            Declaration::Provider(provider) => provider.name().clone(),
        }
    }
}
impl fmt::Display for Declaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.token().fmt(f)
    }
}
impl From<TypeInfo> for Declaration {
    fn from(info: TypeInfo) -> Self {
        Declaration::Type(info)
    }
}
impl From<ProviderSpec> for Declaration {
    fn from(spec: ProviderSpec) -> Self {
        Declaration::Spec(spec)
    }
}
impl From<Provider> for Declaration {
    fn from(provider: Provider) -> Self {
        Declaration::Provider(Arc::new(provider))
    }
}
impl From<Arc<Provider>> for Declaration {
    fn from(provider: Arc<Provider>) -> Self {
        Declaration::Provider(provider)
    }
}
impl From<Export> for Declaration {
    fn from(export: Export) -> Self {
        match export {
            Export::Service(info) => Declaration::Type(info),
            Export::Provider(provider) => Declaration::Provider(provider),
        }
    }
}

/// A node of a dependency closure, as exported by a module
///
/// Services compare by type, providers by identity.
#[derive(Debug, Clone)]
pub enum Export {
    Service(TypeInfo),
    Provider(Arc<Provider>),
}
impl Export {
    pub fn token(&self) -> Token {
        match self {
            Export::Service(info) => Token::Type(*info),
            Export::Provider(provider) => provider.name().clone(),
        }
    }
}
impl PartialEq for Export {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Export::Service(a), Export::Service(b)) => a == b,
            (Export::Provider(a), Export::Provider(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}
impl Eq for Export {}
impl Hash for Export {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Export::Service(info) => {
                0_u8.hash(state);
                info.type_id.hash(state);
            }
            Export::Provider(provider) => {
                1_u8.hash(state);
                Arc::as_ptr(provider).hash(state);
            }
        }
    }
}

/// Known service types and token providers of one container
#[derive(Debug, Default)]
pub struct Registry {
    services: Vec<TypeInfo>,
    token_providers: HashMap<Token, Arc<Provider>>,
    /// Tokens in the order they were first registered
    tokens: Vec<Token>,
}

impl Registry {
    /// Adds a service type - registering it twice is a no-op
    pub fn add_service(&mut self, service: TypeInfo) {
        if !self.services.contains(&service) {
            self.services.push(service);
        }
    }

    /// Adds a provider, replacing any provider with the same token
    pub fn add_provider(&mut self, provider: Arc<Provider>) {
        let token = provider.name().clone();
        match self.token_providers.insert(token.clone(), provider) {
            Some(previous) => tracing::debug!("Replaced the provider for '{}'", previous.name()),
            None => self.tokens.push(token),
        }
    }

    pub fn add_service_or_token(
        &mut self,
        declaration: impl Into<Declaration>,
    ) -> Result<(), ProviderError> {
        match declaration.into() {
            Declaration::Provider(provider) => self.add_provider(provider),
            Declaration::Spec(spec) => self.add_provider(Arc::new(Provider::new(spec)?)),
            Declaration::Type(service) => self.add_service(service),
        }
        Ok(())
    }

    pub fn has_service(&self, service: &TypeInfo) -> bool {
        self.services.contains(service)
    }

    pub fn provider(&self, token: &Token) -> Option<Arc<Provider>> {
        self.token_providers.get(token).cloned()
    }

    /// True if the token is served by a provider or a service
    pub fn contains(&self, token: &Token) -> bool {
        self.token_providers.contains_key(token)
            || token
                .type_info()
                .is_some_and(|service| self.has_service(&service))
    }

    /// Registered services, in registration order
    pub fn services(&self) -> &[TypeInfo] {
        &self.services
    }

    /// Registered providers, in the order their tokens were first registered
    pub fn providers(&self) -> impl Iterator<Item = &Arc<Provider>> {
        self.tokens
            .iter()
            .filter_map(|token| self.token_providers.get(token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct AService;
    struct BService;

    #[test]
    fn services_are_unique_and_keep_order() {
        let mut registry = Registry::default();
        registry.add_service(TypeInfo::of::<BService>());
        registry.add_service(TypeInfo::of::<AService>());
        registry.add_service(TypeInfo::of::<BService>());

        assert_eq!(
            registry.services(),
            &[TypeInfo::of::<BService>(), TypeInfo::of::<AService>()]
        );
    }

    #[test]
    fn later_providers_overwrite_earlier_ones() {
        let mut registry = Registry::default();
        let first = Arc::new(Provider::new(ProviderSpec::new("hello").use_value(1_u8)).unwrap());
        let second = Arc::new(Provider::new(ProviderSpec::new("hello").use_value(2_u8)).unwrap());

        registry.add_provider(first);
        registry.add_provider(second.clone());

        assert_eq!(registry.providers().count(), 1);
        assert!(Arc::ptr_eq(&registry.provider(&Token::from("hello")).unwrap(), &second));
    }

    #[test]
    fn dispatches_each_declaration_kind() {
        let mut registry = Registry::default();
        let built = Arc::new(Provider::new(ProviderSpec::new("built").use_value(1_u8)).unwrap());

        registry.add_service_or_token(built.clone()).unwrap();
        registry
            .add_service_or_token(ProviderSpec::new("spec").use_class::<AService>())
            .unwrap();
        registry.add_service_or_token(TypeInfo::of::<AService>()).unwrap();

        assert!(Arc::ptr_eq(&registry.provider(&Token::from("built")).unwrap(), &built));
        assert!(registry.contains(&Token::from("spec")));
        assert!(registry.has_service(&TypeInfo::of::<AService>()));
        assert!(!registry.contains(&Token::of::<BService>()));
    }

    #[test]
    fn invalid_spec_is_not_registered() {
        let mut registry = Registry::default();

        let error = registry
            .add_service_or_token(ProviderSpec::new("nothing"))
            .unwrap_err();

        assert!(matches!(error, ProviderError::UnknownProviderKind(_)));
        assert!(!registry.contains(&Token::from("nothing")));
    }

    #[test]
    fn exports_compare_providers_by_identity() {
        let provider = Arc::new(Provider::new(ProviderSpec::new("a").use_value(1_u8)).unwrap());
        let twin = Arc::new(Provider::new(ProviderSpec::new("a").use_value(1_u8)).unwrap());

        assert_eq!(Export::Provider(provider.clone()), Export::Provider(provider.clone()));
        assert_ne!(Export::Provider(provider), Export::Provider(twin));
        assert_eq!(
            Export::Service(TypeInfo::of::<AService>()),
            Export::Service(TypeInfo::of::<AService>())
        );
    }

    #[test]
    fn providers_keep_registration_order() {
        let mut registry = Registry::default();
        for name in ["zeta", "alpha", "mid", "alpha"] {
            registry.add_provider(Arc::new(
                Provider::new(ProviderSpec::new(name).use_value(1_u8)).unwrap(),
            ));
        }

        let tokens: Vec<_> = registry.providers().map(|p| p.name().clone()).collect();

        assert_eq!(
            tokens,
            vec![Token::from("zeta"), Token::from("alpha"), Token::from("mid")]
        );
    }
}
