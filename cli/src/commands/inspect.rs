use anyhow::Result;
use clap::Args;
use std::path::Path;

use super::runtime::{connectwise_client, load_config};
use crate::output;

#[derive(Args)]
pub struct InspectArgs {}

/// Prints the newest raw service ticket, for checking field names.
pub async fn run(config_path: Option<&Path>, _args: InspectArgs) -> Result<()> {
    let config = load_config(config_path, None)?;
    let client = connectwise_client(&config)?;

    match client.sample_ticket().await? {
        Some(ticket) => println!("{}", serde_json::to_string_pretty(&ticket)?),
        None => output::warn("No service tickets returned")
    }

    Ok(())
}
