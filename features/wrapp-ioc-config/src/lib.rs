//! Wrapp IoC Config provides a registry of configs that can be injected into the rest of the
//! modules.
//!
//! Wrapp IoC Config is split into two major parts:
//! 1. ConfigProvider: Used to create the registry of all configs and to turn it into a module
//! 2. Config<T>: A wrapper type a constructor takes its config argument as
//!
//! # Examples
//!
//! ```rust
//! use std::sync::Arc;
//! use wrapp_ioc::{Describe, MetadataRegistry, ModuleDefinition, ResolveError, TypeDescriptor};
//! use wrapp_ioc_config::{config::Config, provider::ConfigProvider};
//!
//! struct AppConfig {
//!     app_name: String,
//! }
//!
//! struct App {
//!     config: Config<AppConfig>,
//! }
//! impl Describe for App {
//!     fn describe() -> TypeDescriptor {
//!         TypeDescriptor::new(|args| Ok::<_, ResolveError>(App { config: Config::take(args)? }))
//!             .param::<AppConfig>()
//!             .controller()
//!     }
//! }
//!
//! struct ConfigModule;
//! struct AppModule;
//!
//! let metadata = Arc::new(MetadataRegistry::new());
//! metadata.register::<App>().unwrap();
//!
//! let mut configs = ConfigProvider::new();
//! configs
//!     .add_config(AppConfig { app_name: "My Awesome App".to_string() })
//!     .unwrap();
//! configs.into_module::<ConfigModule>(metadata.clone()).unwrap();
//!
//! let app = ModuleDefinition::new::<AppModule>()
//!     .import::<ConfigModule>()
//!     .controller::<App>()
//!     .define(metadata.clone())
//!     .unwrap();
//!
//! assert_eq!(app.get_controller::<App>().unwrap().config.app_name, "My Awesome App");
//! ```

pub mod config;
pub mod errors;
pub mod provider;
