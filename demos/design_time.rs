//! Builds a pretend database context the way a migration tool would.
//!
//! Run from a directory containing `appsettings.json`:
//!
//! ```sh
//! cargo run --example design_time -- --environment=Development
//! ```

use appsettings_host::{
    ConfigurationResolver, ConfiguredFactory, ContextFactory, Error, ResolvedConfiguration,
    Settings,
};

#[derive(Debug)]
struct DatabaseContext {
    connection_string: String,
    pool_size: u32,
}

fn create(config: &ResolvedConfiguration) -> Result<DatabaseContext, Error> {
    let connection_string = config
        .connection_string("Default")
        .ok_or_else(|| Error::context("ConnectionStrings:Default is not set"))?
        .to_string();
    let pool_size: u32 = config.get_parsed("Database:PoolSize")?.unwrap_or(10);

    Ok(DatabaseContext {
        connection_string,
        pool_size,
    })
}

fn main() -> Result<(), Error> {
    let factory = ConfiguredFactory::new(ConfigurationResolver::new(Settings::default()), create);

    let context = factory.create_from_process_args()?;

    println!("Connection: {}", context.connection_string);
    println!("Pool size: {}", context.pool_size);

    Ok(())
}
