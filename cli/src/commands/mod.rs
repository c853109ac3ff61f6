pub mod generate;
pub mod inspect;
pub mod members;
pub mod providers;
mod runtime;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "recap",
    author,
    version,
    about = "Recap - turn a technician's helpdesk tickets into a value report",
    long_about = "Fetches a technician's ConnectWise tickets with their notes and logged time, \
                  and hands them to a text-generation provider to write the report.\n\n\
                  Credentials are read from the environment or a local .env file."
)]
pub struct Cli {
    #[arg(long, global = true, env = "RECAP_CONFIG", help = "Configuration file (TOML or YAML)")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Generate a report for one technician")]
    Generate(generate::GenerateArgs),

    #[command(about = "List active technicians")]
    Members(members::MembersArgs),

    #[command(about = "List generation providers whose credentials are set")]
    Providers(providers::ProvidersArgs),

    #[command(about = "Print one raw service ticket")]
    Inspect(inspect::InspectArgs)
}
