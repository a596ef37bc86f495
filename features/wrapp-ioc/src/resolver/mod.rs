use crate::{
    errors::ResolveError,
    types::{Instance, Token, TypeInfo},
};

pub mod arguments;

pub use arguments::Arguments;

/// The operations a [Provider](crate::provider::Provider) needs from its container
///
/// Implemented by [Container](crate::container::Container); every nested resolution goes
/// through the same two entry points, so a provider never needs to know where it is registered.
pub trait Resolve {
    /// Constructs a fresh instance of `target`, resolving every constructor parameter
    fn resolve_instance(&self, target: TypeInfo) -> Result<Instance, ResolveError>;

    /// Resolves the value for the parameter at `index` identified by `token`
    ///
    /// A registered provider wins over a registered service with the same token.
    fn resolve_argument(&self, token: &Token, index: usize) -> Result<Instance, ResolveError>;
}
