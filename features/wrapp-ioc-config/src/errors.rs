use wrapp_ioc::TypeInfo;

/// Errors of the config registry
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// No config of the required type was registered
    #[error("Config {0} is not registered")]
    Missing(TypeInfo),
    /// A config of this type is already registered
    #[error("Config {0} is already registered")]
    AlreadyRegistered(TypeInfo),
}
