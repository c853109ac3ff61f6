//! Application state shared by every handler.

use adapters::ConnectWiseClient;
use config::Config;
use generation::ProviderRegistry;
use metrics_exporter_prometheus::PrometheusHandle;
use pipeline::ReportService;
use std::sync::Arc;

use crate::error::{ApiError, Result};

pub struct AppState {
    pub config: Config,
    pub reports: ReportService,
    pub metrics: Option<PrometheusHandle>
}

impl AppState {
    /// Builds the ConnectWise client and provider registry once. The client
    /// serves both as record directory and as per-record detail source.
    pub fn new(config: Config, metrics: Option<PrometheusHandle>) -> Result<Self> {
        let missing = config.connectwise.missing_fields();
        if !missing.is_empty() {
            return Err(ApiError::Configuration(format!(
                "ConnectWise settings missing: {}",
                missing.join(", ")
            )));
        }

        let client = Arc::new(
            ConnectWiseClient::new(&config.connectwise)
                .map_err(|e| ApiError::Configuration(e.to_string()))?
        );
        let registry = Arc::new(
            ProviderRegistry::from_env(&config.generation)
                .map_err(|e| ApiError::Configuration(e.to_string()))?
        );
        let reports = ReportService::from_config(client.clone(), client, registry, &config);

        Ok(Self::with_service(config, reports, metrics))
    }

    pub fn with_service(
        config: Config,
        reports: ReportService,
        metrics: Option<PrometheusHandle>
    ) -> Self {
        Self {
            config,
            reports,
            metrics
        }
    }
}
