use std::{fmt, sync::Arc};

use crate::{
    errors::{ProviderError, ResolveError},
    resolver::{Arguments, Resolve},
    types::{DynError, Injectable, Instance, Token, TypeInfo},
};

/// A type-erased function producing an instance from resolved arguments
///
/// Used for provider factories and for type constructors alike.
pub type Factory = Arc<dyn Fn(&mut Arguments) -> Result<Instance, DynError> + Send + Sync>;

/// Erases a typed constructor into a [Factory]
pub(crate) fn erase<T, E, F>(factory: F) -> Factory
where
    T: Injectable,
    E: Into<DynError>,
    F: Fn(&mut Arguments) -> Result<T, E> + Send + Sync + 'static,
{
    Arc::new(move |args| factory(args).map(Instance::new).map_err(Into::into))
}

/// How a [Provider] produces its value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Value,
    Class,
    Factory,
}

/// Raw description of a provider, as it is declared
///
/// The shape decides the kind: a value wins over a class, which wins over a factory.
#[derive(Clone)]
pub struct ProviderSpec {
    pub provide: Token,
    pub use_value: Option<Instance>,
    pub use_class: Option<TypeInfo>,
    pub use_factory: Option<Factory>,
    /// Only used by factories
    pub deps: Vec<Token>,
}
impl fmt::Debug for ProviderSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderSpec")
            .field("provide", &self.provide)
            .field("use_value", &self.use_value)
            .field("use_class", &self.use_class)
            .field("use_factory", &self.use_factory.as_ref().map(|_| "<fn>"))
            .field("deps", &self.deps)
            .finish()
    }
}

impl ProviderSpec {
    pub fn new(provide: impl Into<Token>) -> Self {
        ProviderSpec {
            provide: provide.into(),
            use_value: None,
            use_class: None,
            use_factory: None,
            deps: Vec::new(),
        }
    }

    pub fn use_value<T: Injectable>(self, value: T) -> Self {
        self.use_instance(Instance::new(value))
    }

    pub fn use_instance(mut self, value: Instance) -> Self {
        self.use_value = Some(value);
        self
    }

    pub fn use_class<T: 'static>(self) -> Self {
        self.use_class_type(TypeInfo::of::<T>())
    }

    pub fn use_class_type(mut self, class: TypeInfo) -> Self {
        self.use_class = Some(class);
        self
    }

    pub fn use_factory<T, E, F>(mut self, factory: F) -> Self
    where
        T: Injectable,
        E: Into<DynError>,
        F: Fn(&mut Arguments) -> Result<T, E> + Send + Sync + 'static,
    {
        self.use_factory = Some(erase(factory));
        self
    }

    pub fn deps<D: Into<Token>>(mut self, deps: impl IntoIterator<Item = D>) -> Self {
        self.deps = deps.into_iter().map(Into::into).collect();
        self
    }

    pub fn classify(&self) -> Result<ProviderKind, ProviderError> {
        classify_provider_spec(self)
    }
}

/// Decides which kind of provider a spec describes
pub fn classify_provider_spec(spec: &ProviderSpec) -> Result<ProviderKind, ProviderError> {
    if spec.use_value.is_some() {
        Ok(ProviderKind::Value)
    } else if spec.use_class.is_some() {
        Ok(ProviderKind::Class)
    } else if spec.use_factory.is_some() {
        Ok(ProviderKind::Factory)
    } else {
        Err(ProviderError::UnknownProviderKind(spec.provide.clone()))
    }
}

enum Recipe {
    Value(Instance),
    Class(TypeInfo),
    Factory(Factory),
}

/// Immutable recipe producing the value behind one token
///
/// Nothing is cached: every [Provider::get_value] call of a class or factory provider
/// resolves and constructs again.
pub struct Provider {
    name: Token,
    deps: Vec<Token>,
    recipe: Recipe,
}
impl fmt::Debug for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Provider")
            .field("name", &self.name)
            .field("kind", &self.kind())
            .field("deps", &self.deps)
            .finish()
    }
}

impl Provider {
    pub fn new(spec: ProviderSpec) -> Result<Self, ProviderError> {
        let ProviderSpec {
            provide,
            use_value,
            use_class,
            use_factory,
            deps,
        } = spec;

        let (recipe, deps) = match (use_value, use_class, use_factory) {
            (Some(value), _, _) => (Recipe::Value(value), Vec::new()),
            (None, Some(class), _) => (Recipe::Class(class), Vec::new()),
            (None, None, Some(factory)) => (Recipe::Factory(factory), deps),
            (None, None, None) => return Err(ProviderError::UnknownProviderKind(provide)),
        };

        Ok(Provider {
            name: provide,
            deps,
            recipe,
        })
    }

    pub fn name(&self) -> &Token {
        &self.name
    }

    pub fn kind(&self) -> ProviderKind {
        match self.recipe {
            Recipe::Value(_) => ProviderKind::Value,
            Recipe::Class(_) => ProviderKind::Class,
            Recipe::Factory(_) => ProviderKind::Factory,
        }
    }

    /// Declared dependencies - always empty for value and class providers
    pub fn deps(&self) -> &[Token] {
        &self.deps
    }

    /// The type a class provider instantiates
    pub fn class(&self) -> Option<TypeInfo> {
        match self.recipe {
            Recipe::Class(class) => Some(class),
            _ => None,
        }
    }

    /// True if `spec` declares this provider: same token and the very same value, class or
    /// factory
    pub fn is_declared_by(&self, spec: &ProviderSpec) -> bool {
        if self.name != spec.provide {
            return false;
        }

        match (&self.recipe, &spec.use_value, &spec.use_class, &spec.use_factory) {
            (Recipe::Value(value), Some(other), _, _) => value.ptr_eq(other),
            (Recipe::Class(class), None, Some(other), _) => class == other,
            (Recipe::Factory(factory), None, None, Some(other)) => {
                Arc::ptr_eq(factory, other) && self.deps == spec.deps
            }
            _ => false,
        }
    }

    pub fn get_value(&self, resolver: &dyn Resolve) -> Result<Instance, ResolveError> {
        match &self.recipe {
            Recipe::Value(value) => Ok(value.clone()),
            Recipe::Class(class) => resolver.resolve_instance(*class),
            Recipe::Factory(factory) => {
                let values = self
                    .deps
                    .iter()
                    .enumerate()
                    .map(|(index, dep)| resolver.resolve_argument(dep, index))
                    .collect::<Result<Vec<_>, _>>()?;

                let mut arguments = Arguments::new(self.name.clone(), values);
                factory(&mut arguments)
                    .map_err(|error| ResolveError::construction(self.name.clone(), error))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, convert::Infallible};

    use super::*;

    struct User;
    impl User {
        fn name(&self) -> &'static str {
            "kyle"
        }
    }
    struct NewUser;

    /// Records every call and answers with canned values
    #[derive(Default)]
    struct MockResolver {
        instances: RefCell<Vec<TypeInfo>>,
        arguments: RefCell<Vec<(Token, usize)>>,
    }
    impl Resolve for MockResolver {
        fn resolve_instance(&self, target: TypeInfo) -> Result<Instance, ResolveError> {
            self.instances.borrow_mut().push(target);
            Ok(Instance::new(User))
        }

        fn resolve_argument(&self, token: &Token, index: usize) -> Result<Instance, ResolveError> {
            self.arguments.borrow_mut().push((token.clone(), index));
            match token {
                Token::Named(name) if name == "Adj" => Ok(Instance::new(String::from("cool"))),
                Token::Type(info) if *info == TypeInfo::of::<User>() => Ok(Instance::new(User)),
                _ => Err(ResolveError::UnresolvedParameter {
                    index,
                    type_name: token.to_string(),
                }),
            }
        }
    }

    #[test]
    fn spec_without_recipe_is_unknown() {
        let error = Provider::new(ProviderSpec::new("hello")).unwrap_err();

        assert!(matches!(error, ProviderError::UnknownProviderKind(token) if token == Token::from("hello")));
    }

    #[test]
    fn classification_prefers_value_then_class_then_factory() {
        let all = ProviderSpec::new("all")
            .use_factory(|_| Ok::<_, Infallible>(1_u8))
            .use_class::<User>()
            .use_value(2_u8);
        let class_and_factory = ProviderSpec::new("both")
            .use_factory(|_| Ok::<_, Infallible>(1_u8))
            .use_class::<User>();
        let factory = ProviderSpec::new("factory").use_factory(|_| Ok::<_, Infallible>(1_u8));

        assert_eq!(all.classify().unwrap(), ProviderKind::Value);
        assert_eq!(class_and_factory.classify().unwrap(), ProviderKind::Class);
        assert_eq!(factory.classify().unwrap(), ProviderKind::Factory);
    }

    #[test]
    fn deps_are_dropped_unless_factory() {
        let provider = Provider::new(ProviderSpec::new("Token").use_value(1_u8).deps(["Adj"])).unwrap();

        assert!(provider.deps().is_empty());
    }

    #[test]
    fn value_provider_returns_the_stored_constant() {
        let resolver = MockResolver::default();
        let provider =
            Provider::new(ProviderSpec::new("Token").use_value(String::from("Cool new Token!"))).unwrap();

        let first = provider.get_value(&resolver).unwrap();
        let second = provider.get_value(&resolver).unwrap();

        assert_eq!(*first.downcast::<String>().unwrap(), "Cool new Token!");
        assert!(first.ptr_eq(&second));
        assert!(resolver.instances.borrow().is_empty());
    }

    #[test]
    fn class_provider_resolves_the_class() {
        let resolver = MockResolver::default();
        let provider = Provider::new(ProviderSpec::new(Token::of::<NewUser>()).use_class::<User>()).unwrap();

        let value = provider.get_value(&resolver).unwrap();

        assert_eq!(*resolver.instances.borrow(), vec![TypeInfo::of::<User>()]);
        assert!(value.downcast::<User>().is_ok());
        assert_eq!(provider.class(), Some(TypeInfo::of::<User>()));
    }

    #[test]
    fn factory_receives_deps_in_declaration_order() {
        let resolver = MockResolver::default();
        let provider = Provider::new(
            ProviderSpec::new("Factory")
                .use_factory(|args| {
                    let adj = args.take::<String>()?;
                    let user = args.take::<User>()?;
                    Ok::<_, ResolveError>(format!("{} is {}", user.name(), adj))
                })
                .deps([Token::from("Adj"), Token::of::<User>()]),
        )
        .unwrap();

        let value = provider.get_value(&resolver).unwrap();

        assert_eq!(*value.downcast::<String>().unwrap(), "kyle is cool");
        assert_eq!(
            *resolver.arguments.borrow(),
            vec![(Token::from("Adj"), 0), (Token::of::<User>(), 1)]
        );
    }

    #[test]
    fn factory_without_deps_never_touches_the_resolver() {
        let resolver = MockResolver::default();
        let provider = Provider::new(
            ProviderSpec::new("LameFactory")
                .use_factory(|_| Ok::<_, Infallible>(String::from("hello, world!")))
                .deps(Vec::<Token>::new()),
        )
        .unwrap();

        let value = provider.get_value(&resolver).unwrap();

        assert_eq!(*value.downcast::<String>().unwrap(), "hello, world!");
        assert!(resolver.arguments.borrow().is_empty());
        assert!(resolver.instances.borrow().is_empty());
    }

    #[test]
    fn factory_dependency_failure_is_returned_unchanged() {
        let resolver = MockResolver::default();
        let provider = Provider::new(
            ProviderSpec::new("Broken")
                .use_factory(|_| Ok::<_, Infallible>(1_u8))
                .deps(["Adj", "Missing"]),
        )
        .unwrap();

        let error = provider.get_value(&resolver).unwrap_err();

        assert!(matches!(
            error,
            ResolveError::UnresolvedParameter { index: 1, ref type_name } if type_name == "Missing"
        ));
    }

    #[test]
    fn only_the_declaring_spec_matches_a_provider() {
        let spec = ProviderSpec::new("Token").use_value(1_u8);
        let provider = Provider::new(spec.clone()).unwrap();

        assert!(provider.is_declared_by(&spec));
        assert!(!provider.is_declared_by(&ProviderSpec::new("Token").use_value(1_u8)));
        assert!(!provider.is_declared_by(&ProviderSpec::new("Other").use_value(1_u8)));

        let class = ProviderSpec::new("Class").use_class::<User>();
        let provider = Provider::new(class.clone()).unwrap();
        assert!(provider.is_declared_by(&class));
        assert!(!provider.is_declared_by(&ProviderSpec::new("Class").use_class::<NewUser>()));
    }
}
