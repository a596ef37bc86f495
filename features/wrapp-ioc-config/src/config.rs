use std::{fmt, ops::Deref, sync::Arc};

use wrapp_ioc::{Arguments, Injectable, ResolveError};

/// A config taken as a constructor argument
///
/// Configs registered through a [ConfigProvider](crate::provider::ConfigProvider) are provided
/// under their own type, so a constructor declares the parameter as `T` and wraps it here.
///
/// # Example
/// ```rust
/// use wrapp_ioc::{ResolveError, TypeDescriptor};
/// use wrapp_ioc_config::config::Config;
///
/// struct ServerConfig {
///     port: u16,
/// }
///
/// struct Server {
///     config: Config<ServerConfig>,
/// }
///
/// let _descriptor = TypeDescriptor::new(|args| {
///     Ok::<_, ResolveError>(Server {
///         config: Config::take(args)?,
///     })
/// })
/// .param::<ServerConfig>()
/// .service();
/// ```
pub struct Config<T> {
    inner: Arc<T>,
}
impl<T> Deref for Config<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}
impl<T> Clone for Config<T> {
    fn clone(&self) -> Self {
        Config {
            inner: self.inner.clone(),
        }
    }
}
impl<T: fmt::Debug> fmt::Debug for Config<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Config").field(&self.inner).finish()
    }
}
impl<T> From<Arc<T>> for Config<T> {
    fn from(inner: Arc<T>) -> Self {
        Config { inner }
    }
}

impl<T: Injectable> Config<T> {
    /// Takes the next constructor argument as config
    pub fn take(args: &mut Arguments) -> Result<Self, ResolveError> {
        args.take::<T>().map(Config::from)
    }
}

impl<T> Config<T> {
    pub fn inner(&self) -> Arc<T> {
        self.inner.clone()
    }

    pub fn into_inner(self) -> Arc<T> {
        self.inner
    }
}
