use anyhow::Result;
use clap::Parser;
use pbrates::cli::rates::parse_day_count;
use pbrates::core::log::init_logging;

/// Отримайте курси обміну євро та доларів США в API ПриватБанку.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Кількість днів для отримання курсів валют (макс.: 10)
    #[arg(allow_negative_numbers = true, value_parser = parse_day_count)]
    num_days: i64,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long)]
    config_path: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose)?;

    let result = pbrates::run(cli.num_days, cli.config_path.as_deref()).await;

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
