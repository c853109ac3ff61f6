use anyhow::Result;
use clap::Args;
use colored::Colorize;
use generation::{EnvCredentials, PROVIDERS, available_providers};
use std::path::Path;

use super::runtime::load_config;
use crate::output;

#[derive(Args)]
pub struct ProvidersArgs {
    #[arg(long, help = "Output as JSON")]
    pub json: bool
}

pub fn run(config_path: Option<&Path>, args: ProvidersArgs) -> Result<()> {
    let config = load_config(config_path, None)?;
    let entries = available_providers(&EnvCredentials);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    output::header("Available Providers");
    println!();

    if entries.is_empty() {
        let vars: Vec<&str> = PROVIDERS.iter().map(|p| p.credential_env).collect();
        output::warn("No provider credentials are set");
        output::hint(&format!("Set one of {}", vars.join(", ")));
        return Ok(());
    }

    for entry in &entries {
        let marker = if entry.compound_id == config.generation.default_provider {
            " (default)".green().to_string()
        } else {
            String::new()
        };
        println!(
            "  {:<40} {}{}",
            entry.compound_id.cyan(),
            entry.display_name,
            marker
        );
    }

    Ok(())
}
