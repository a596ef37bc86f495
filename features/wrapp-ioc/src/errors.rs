use std::sync::Arc;

use thiserror::Error;

use crate::types::{DynError, Token, TypeInfo};

/// Errors when building a [Provider](crate::provider::Provider) from a spec
#[derive(Error, Debug, Clone)]
pub enum ProviderError {
    /// The spec carries neither a value, a class nor a factory
    #[error("Unknown provider kind for '{0}' - expected a value, a class or a factory")]
    UnknownProviderKind(Token),
}

/// Errors while resolving an instance or a dependency closure
#[derive(Error, Debug, Clone)]
pub enum ResolveError {
    /// A constructor parameter is neither a known provider nor a known service
    #[error("[{index}] Unresolved parameter of type: {type_name}")]
    UnresolvedParameter { index: usize, type_name: String },
    /// A token reached while computing a dependency closure is not registered
    #[error("Unresolved token: {0}")]
    UnresolvedToken(Token),
    /// No constructor is known for the type
    #[error("'{0}' has no registered constructor")]
    NotConstructible(TypeInfo),
    /// A constructor asked for more arguments than were resolved
    #[error("'{owner}' requested argument [{index}] but only {available} were resolved")]
    MissingArgument {
        owner: Token,
        index: usize,
        available: usize,
    },

    #[error("Failed to downcast, required: '{required_type}' actual: '{actual_type}'")]
    DowncastFailed {
        required_type: &'static str,
        actual_type: &'static str,
    },
    /// A constructor or factory returned an error
    #[error("Construction of '{target}' failed - error: {error}")]
    ConstructionFailed {
        target: Token,
        error: Arc<DynError>,
    },
    /// Resolution nested deeper than the configured bound
    #[error("Resolving '{token}' exceeded the maximum depth of {max_depth} - is there a circular dependency?")]
    DepthExceeded { token: Token, max_depth: usize },
    /// The metadata of a module container was dropped while the module was still in use
    #[error("The metadata of this module has been dropped")]
    MetadataDropped,
}
impl ResolveError {
    /// Wraps an error returned by a constructor or factory
    ///
    /// Resolution errors raised inside the constructor are passed through unchanged.
    pub(crate) fn construction(target: Token, error: DynError) -> Self {
        match error.downcast::<ResolveError>() {
            Ok(inner) => *inner,
            Err(error) => ResolveError::ConstructionFailed {
                target,
                error: Arc::new(error),
            },
        }
    }
}

/// Errors when describing a type to the metadata registry
#[derive(Error, Debug, Clone)]
pub enum MetadataError {
    /// An explicit injection token was attached to something other than a constructor parameter
    #[error("Can't apply an injection token to anything but a constructor parameter: '{target}' takes {parameters} parameters, got index {index}")]
    ExplicitInjectionMisuse {
        target: TypeInfo,
        index: usize,
        parameters: usize,
    },
}

/// Errors when defining a module or requesting a controller from it
#[derive(Error, Debug, Clone)]
pub enum ModuleError {
    #[error("Invalid import: {entry} in module: {module}")]
    InvalidImport { entry: String, module: &'static str },
    #[error("Invalid service/provider {entry} in module: {module}")]
    InvalidProvider { entry: String, module: &'static str },
    #[error("Invalid controller {entry} in module: {module}")]
    InvalidController { entry: String, module: &'static str },
    #[error("Invalid exported service/provider {entry} in module: {module}")]
    InvalidExport { entry: String, module: &'static str },
    #[error("No such controller: {controller} defined in module: {module}")]
    UnknownController {
        controller: &'static str,
        module: &'static str,
    },
    /// The requested type was never defined as a module
    #[error("Invalid module: {0}")]
    InvalidModule(&'static str),

    #[error(transparent)]
    Resolve(#[from] ResolveError),
}
