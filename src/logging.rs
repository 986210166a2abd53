use std::error::Error;

use tracing_subscriber::EnvFilter;

/// Install a stderr `tracing` subscriber filtered by `RUST_LOG`, falling back to `default_level`.
pub fn init_logging(default_level: &str) -> Result<(), Box<dyn Error>> {
    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(default_level))?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|err| -> Box<dyn Error> { err })?;

    Ok(())
}
