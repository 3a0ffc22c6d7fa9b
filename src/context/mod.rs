//! Design-time construction of database (or other) contexts.
//!
//! Tooling that needs a context outside the running application, such as a
//! schema migration command, asks a [`ContextFactory`] for one and passes the
//! arguments it was invoked with.

use crate::config::{ConfigurationResolver, ResolvedConfiguration};
use crate::Error;

/// Creates a context from process arguments.
pub trait ContextFactory {
    type Context;

    fn create_context(&self, args: &[String]) -> Result<Self::Context, Error>;

    /// Calls [`create_context`](Self::create_context) with the arguments of the
    /// current process, minus the program name.
    fn create_from_process_args(&self) -> Result<Self::Context, Error> {
        let args: Vec<String> = std::env::args().skip(1).collect();
        self.create_context(&args)
    }
}

/// A [`ContextFactory`] backed by a closure over the raw arguments.
#[derive(Debug, Clone)]
pub struct FnFactory<F>(F);

impl<F> FnFactory<F> {
    pub fn new<C>(create: F) -> Self
    where
        F: Fn(&[String]) -> Result<C, Error>,
    {
        Self(create)
    }
}

impl<F, C> ContextFactory for FnFactory<F>
where
    F: Fn(&[String]) -> Result<C, Error>,
{
    type Context = C;

    fn create_context(&self, args: &[String]) -> Result<C, Error> {
        (self.0)(args)
    }
}

/// A [`ContextFactory`] that resolves the host configuration first and hands
/// it to a build function.
///
/// ## Example
///
/// ```no_run
/// use appsettings_host::{ConfigurationResolver, ConfiguredFactory, ContextFactory, Error, Settings};
///
/// struct Database {
///     url: String,
/// }
///
/// let factory = ConfiguredFactory::new(
///     ConfigurationResolver::new(Settings::default()),
///     |config| {
///         let url = config.connection_string("Default").ok_or_else(|| {
///             Error::context("no connection string named 'Default'")
///         })?;
///         Ok(Database { url: url.to_string() })
///     },
/// );
///
/// let _db = factory.create_context(&["--environment=Development".to_string()])?;
/// # Ok::<(), Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct ConfiguredFactory<F> {
    resolver: ConfigurationResolver,
    build: F,
}

impl<F> ConfiguredFactory<F> {
    pub fn new<C>(resolver: ConfigurationResolver, build: F) -> Self
    where
        F: Fn(&ResolvedConfiguration) -> Result<C, Error>,
    {
        Self { resolver, build }
    }

    pub fn resolver(&self) -> &ConfigurationResolver {
        &self.resolver
    }
}

impl<F, C> ContextFactory for ConfiguredFactory<F>
where
    F: Fn(&ResolvedConfiguration) -> Result<C, Error>,
{
    type Context = C;

    fn create_context(&self, args: &[String]) -> Result<C, Error> {
        let config = self.resolver.resolve(args)?;
        tracing::debug!(environment = %config.environment(), "creating context");
        (self.build)(&config)
    }
}
