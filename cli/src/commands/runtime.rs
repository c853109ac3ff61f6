//! Shared setup for commands that talk to ConnectWise or a provider.

use adapters::ConnectWiseClient;
use anyhow::{Context, Result, bail};
use config::{Config, ConfigLayer};
use generation::ProviderRegistry;
use pipeline::ReportService;
use std::path::Path;
use std::sync::Arc;

pub fn load_config(path: Option<&Path>, overrides: Option<ConfigLayer>) -> Result<Config> {
    config::load_layered(path, overrides).context("Failed to load configuration")
}

pub fn connectwise_client(config: &Config) -> Result<Arc<ConnectWiseClient>> {
    let missing = config.connectwise.missing_fields();
    if !missing.is_empty() {
        let vars: Vec<String> = missing
            .iter()
            .map(|field| format!("CW_{}", field.to_uppercase()))
            .collect();
        bail!("ConnectWise settings missing: set {}", vars.join(", "));
    }

    let client = ConnectWiseClient::new(&config.connectwise)
        .context("Failed to build ConnectWise client")?;
    Ok(Arc::new(client))
}

pub fn report_service(config: &Config) -> Result<ReportService> {
    let client = connectwise_client(config)?;
    let registry = ProviderRegistry::from_env(&config.generation)
        .context("Failed to build provider registry")?;

    Ok(ReportService::from_config(
        client.clone(),
        client,
        Arc::new(registry),
        config
    ))
}
