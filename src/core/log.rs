//! Logging setup for the command line

use anyhow::{Context, Result};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{
    EnvFilter, filter::Targets, fmt, prelude::__tracing_subscriber_SubscriberExt,
    util::SubscriberInitExt,
};

/// Per-target levels: our own events at debug when verbose, HTTP stack
/// internals never below warn.
pub fn app_targets(verbose: bool) -> Targets {
    let app_level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::OFF
    };
    let http_level = if verbose {
        LevelFilter::WARN
    } else {
        LevelFilter::OFF
    };

    Targets::new()
        .with_target("pbrates", app_level)
        .with_target("reqwest", http_level)
        .with_target("hyper", http_level)
        .with_target("hyper_util", http_level)
}

/// Installs the global subscriber. Events go to stderr, stdout is for the table.
pub fn init_logging(verbose: bool) -> Result<()> {
    let level = if verbose { "debug" } else { "off" };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .pretty()
                .without_time()
                .with_writer(std::io::stderr),
        )
        .with(app_targets(verbose))
        .with(env_filter)
        .try_init()
        .context("Failed to initialise logging")
}
