use anyhow::Result;
use clap::Args;
use colored::Colorize;
use recap_core::RecordDirectory;
use std::path::Path;

use super::runtime::{connectwise_client, load_config};
use crate::output;

#[derive(Args)]
pub struct MembersArgs {
    #[arg(long, help = "Output as JSON")]
    pub json: bool
}

pub async fn run(config_path: Option<&Path>, args: MembersArgs) -> Result<()> {
    let config = load_config(config_path, None)?;
    let client = connectwise_client(&config)?;
    let members = client.list_members().await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&members)?);
        return Ok(());
    }

    output::header("Active Members");
    println!();
    for member in &members {
        println!("  {:<24} {}", member.identifier.cyan(), member.name);
    }
    println!();
    println!("{} members", members.len().to_string().bold());

    Ok(())
}
