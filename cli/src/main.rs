use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod commands;
mod output;

use commands::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cli = Cli::parse();
    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Generate(args) => commands::generate::run(config_path, args).await,
        Commands::Members(args) => commands::members::run(config_path, args).await,
        Commands::Providers(args) => commands::providers::run(config_path, args),
        Commands::Inspect(args) => commands::inspect::run(config_path, args).await
    }
}
