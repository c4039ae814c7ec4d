use anyhow::{anyhow, Result};
use std::env;
use std::io;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_LEVEL: &str = "warn";
const VERBOSE_LEVEL: &str = "debug";

/// Builds the filter: `RUST_LOG` wins, otherwise `warn` (or `debug` when
/// verbose). HTTP client internals stay at `warn` either way.
pub fn build_filter(verbose: bool) -> EnvFilter {
    let default_level = if verbose { VERBOSE_LEVEL } else { DEFAULT_LEVEL };
    env::var("RUST_LOG")
        .map_or_else(|_| EnvFilter::new(default_level), EnvFilter::new)
        .add_directive(
            "hyper=warn"
                .parse()
                .unwrap_or_else(|_| tracing::Level::WARN.into()),
        )
        .add_directive(
            "reqwest=warn"
                .parse()
                .unwrap_or_else(|_| tracing::Level::WARN.into()),
        )
}

/// Diagnostics go to stderr so stdout stays clean for the report.
pub fn init_logging(verbose: bool) -> Result<()> {
    let fmt_layer = fmt::layer()
        .with_writer(io::stderr)
        .with_target(false)
        .compact();

    tracing_subscriber::registry()
        .with(build_filter(verbose))
        .with(fmt_layer)
        .try_init()
        .map_err(|e| anyhow!("Failed to initialise logging: {}", e))
}
