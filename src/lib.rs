pub mod cli;
pub mod core;
pub mod providers;

use crate::core::config::AppConfig;
use anyhow::Result;
use std::io::Write;
use tracing::{debug, info};

pub async fn run(num_days: i64, config_path: Option<&str>) -> Result<()> {
    info!("Exchange rates lookup starting...");

    let config = AppConfig::load(config_path)?;
    debug!("Loaded config: {config:#?}");

    run_with_config(&config, num_days, &mut std::io::stdout()).await
}

/// Runs one lookup; the HTTP client lives only for the duration of the call.
pub async fn run_with_config<W: Write>(
    config: &AppConfig,
    num_days: i64,
    out: &mut W,
) -> Result<()> {
    let provider = providers::PrivatBankProvider::new(&config.provider)?;
    cli::rates::run(config, &provider, num_days, out).await
}
