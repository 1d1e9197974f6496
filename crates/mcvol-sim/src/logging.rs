//! Tracing subscriber setup for the CLI.

use std::error::Error;
use std::io;

use tracing_subscriber::EnvFilter;

/// Installs the global subscriber. Records go to stderr, filtered by `RUST_LOG`
/// with `info` as the fallback level.
pub fn init(json: bool) -> Result<(), Box<dyn Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false);
    let installed = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    installed.map_err(|err| err as Box<dyn Error>)
}
