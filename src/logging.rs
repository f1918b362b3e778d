//! Console logging for the session runner.
//!
//! Output goes to stderr so row tables and share links on stdout stay
//! pipeable. `RUST_LOG` overrides the level picked from the command line.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

pub fn default_level(verbose: bool) -> &'static str {
    if verbose { "parktrails=debug,info" } else { "info" }
}

/// Installs the global subscriber. Fails if one is already set.
pub fn init_logging(verbose: bool) -> anyhow::Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level(verbose)));

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .try_init()?;
    Ok(())
}
