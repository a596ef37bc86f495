//! Wrapp IoC builds object graphs from explicitly described types.
//!
//! The crate consists of four layers:
//! 1. Tokens and providers - [Token] names a dependency, a [Provider] knows how to produce it
//!    (a constant value, a class to construct, or a factory with declared dependencies)
//! 2. The [Registry] of a container - which services and token providers it knows
//! 3. The [Container] - resolves a type by resolving each constructor parameter, either through
//!    a provider or by constructing a registered service, and computes dependency closures
//! 4. Modules - a [Module] owns a private container, exposes its controllers and exports the
//!    closure of what it declares as exported
//!
//! Types are described once in a [MetadataRegistry] which the containers consult for
//! constructor parameters, explicit injection tokens and capability flags.
//!
//! # Example
//!
//! ```rust
//! use std::{convert::Infallible, sync::Arc};
//! use wrapp_ioc::{Describe, MetadataRegistry, ModuleDefinition, ProviderSpec, ResolveError, TypeDescriptor};
//!
//! struct Greeter {
//!     greeting: Arc<String>,
//! }
//! impl Describe for Greeter {
//!     fn describe() -> TypeDescriptor {
//!         TypeDescriptor::new(|args| Ok::<_, ResolveError>(Greeter { greeting: args.take()? }))
//!             .param::<String>()
//!             .inject(0, "greeting")
//!             .controller()
//!     }
//! }
//!
//! let metadata = Arc::new(MetadataRegistry::new());
//! metadata.register::<Greeter>().unwrap();
//!
//! struct AppModule;
//! let module = ModuleDefinition::new::<AppModule>()
//!     .provider(ProviderSpec::new("greeting").use_value(String::from("hello")))
//!     .controller::<Greeter>()
//!     .define(metadata.clone())
//!     .unwrap();
//!
//! let greeter = module.get_controller::<Greeter>().unwrap();
//! assert_eq!(*greeter.greeting, "hello");
//! ```

pub mod builder;
pub mod config;
pub mod container;
pub mod errors;
pub mod metadata;
pub mod module;
pub mod provider;
pub mod registry;
pub mod resolver;
pub mod types;

pub use builder::ContainerBuilder;
pub use config::ContainerConfig;
pub use container::Container;
pub use errors::{MetadataError, ModuleError, ProviderError, ResolveError};
pub use metadata::{Describe, Metadata, MetadataRegistry, TypeDescriptor};
pub use module::{get_controller, get_exports, load_controller, Module, ModuleDefinition};
pub use provider::{classify_provider_spec, Factory, Provider, ProviderKind, ProviderSpec};
pub use registry::{Declaration, Export, Registry};
pub use resolver::{Arguments, Resolve};
pub use types::{DynError, Injectable, Instance, Token, TypeInfo};
