//! Tracing setup for the CLI.

use anyhow::{Context, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

pub const DEFAULT_LOG_FILTER: &str = "swmmscan=warn";
const VERBOSE_LOG_FILTER: &str = "swmmscan=debug";

/// Logging options resolved from the command line and config.
pub struct LogConfig<'a> {
    /// Filter directive from config; `RUST_LOG` takes precedence.
    pub filter: &'a str,
    pub verbose: bool,
}

/// Build the filter: `RUST_LOG`, else `-v`, else the configured directive.
pub fn build_filter(config: &LogConfig<'_>) -> Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    let directive = if config.verbose {
        VERBOSE_LOG_FILTER
    } else {
        config.filter
    };
    EnvFilter::try_new(directive)
        .with_context(|| format!("Invalid log filter: {:?}", directive))
}

/// Install a stderr fmt subscriber. Stdout stays reserved for command output.
pub fn init_logging(config: LogConfig<'_>) -> Result<()> {
    let filter = build_filter(&config)?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_filter(filter),
        )
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(())
}
