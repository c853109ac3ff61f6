//! Report service: one request in, one generated report out.

use crate::aggregator::Aggregator;
use crate::prompt::build_prompt;
use crate::telemetry::PipelineTelemetry;
use chrono::NaiveDate;
use config::{Config, PipelineConfig};
use errors::ReportError;
use generation::BackendFactory;
use recap_core::{
    Member, ProviderCatalogEntry, ProviderSpec, RecordDirectory, RecordQuery, RecordSource
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use validator::{Validate, ValidationError, ValidationErrors};

pub const NO_TICKETS_REPORT: &str =
    "# No Tickets Found\n\nNo tickets were found for the selected criteria.";

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Missing fields deserialize as empty strings and fail validation.
#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
pub struct ReportRequest {
    #[serde(default)]
    #[validate(custom(function = "validate_member_id"))]
    pub member_id: String,

    #[serde(default)]
    pub technician_name: Option<String>,

    #[serde(default)]
    #[validate(custom(function = "validate_iso_date"))]
    pub start_date: String,

    #[serde(default)]
    #[validate(custom(function = "validate_iso_date"))]
    pub end_date: String,

    /// Compound `provider:model` id; the configured default when absent.
    #[serde(default)]
    pub provider: Option<String>
}

impl ReportRequest {
    pub fn new(
        member_id: impl Into<String>,
        start_date: impl Into<String>,
        end_date: impl Into<String>
    ) -> Self {
        Self {
            member_id: member_id.into(),
            start_date: start_date.into(),
            end_date: end_date.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    #[must_use]
    pub fn with_technician_name(mut self, name: impl Into<String>) -> Self {
        self.technician_name = Some(name.into());
        self
    }

    pub fn technician_display_name(&self) -> &str {
        self.technician_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(self.member_id.as_str())
    }
}

fn validate_member_id(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::new("required").with_message("is required".into()));
    }
    let allowed = |c: char| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-' | '@');
    if !value.chars().all(allowed) {
        return Err(ValidationError::new("identifier")
            .with_message("may only contain letters, digits, '.', '_', '-' and '@'".into()));
    }
    Ok(())
}

fn validate_iso_date(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::new("required").with_message("is required".into()));
    }
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map(|_| ())
        .map_err(|_| {
            ValidationError::new("iso_date").with_message("must be a YYYY-MM-DD date".into())
        })
}

fn first_invalid_field(errors: &ValidationErrors) -> ReportError {
    let mut fields: Vec<(String, String)> = errors
        .field_errors()
        .into_iter()
        .map(|(field, errs)| {
            let reason = errs
                .first()
                .and_then(|e| e.message.as_ref().map(|m| m.to_string()))
                .unwrap_or_else(|| "is invalid".to_string());
            (field.to_string(), reason)
        })
        .collect();
    fields.sort_by_key(|(field, _)| field_rank(field));

    match fields.into_iter().next() {
        Some((field, reason)) => ReportError::invalid(field, reason),
        None => ReportError::invalid("request", "is invalid")
    }
}

fn field_rank(field: &str) -> usize {
    match field {
        "member_id" => 0,
        "start_date" => 1,
        "end_date" => 2,
        _ => 3
    }
}

/// Dates of a request that passed validation.
fn date_range(request: &ReportRequest) -> Result<(NaiveDate, NaiveDate), ReportError> {
    let parse = |field: &str, value: &str| {
        NaiveDate::parse_from_str(value, DATE_FORMAT)
            .map_err(|_| ReportError::invalid(field, "must be a YYYY-MM-DD date"))
    };
    let start = parse("start_date", &request.start_date)?;
    let end = parse("end_date", &request.end_date)?;
    if start > end {
        return Err(ReportError::invalid("start_date", "must not be after end_date"));
    }
    Ok((start, end))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub report: String,
    pub ticket_count: usize,
    pub processed_count: usize
}

impl Report {
    pub fn no_tickets() -> Self {
        Self {
            report: NO_TICKETS_REPORT.to_string(),
            ticket_count: 0,
            processed_count: 0
        }
    }
}

/// Wires the record directory, the detail source and the backend factory
/// together. Built once at startup and shared.
pub struct ReportService {
    directory: Arc<dyn RecordDirectory>,
    source: Arc<dyn RecordSource>,
    backends: Arc<dyn BackendFactory>,
    pipeline: PipelineConfig,
    default_provider: String
}

impl ReportService {
    pub fn new(
        directory: Arc<dyn RecordDirectory>,
        source: Arc<dyn RecordSource>,
        backends: Arc<dyn BackendFactory>
    ) -> Self {
        let defaults = Config::default();
        Self {
            directory,
            source,
            backends,
            pipeline: defaults.pipeline,
            default_provider: defaults.generation.default_provider
        }
    }

    pub fn from_config(
        directory: Arc<dyn RecordDirectory>,
        source: Arc<dyn RecordSource>,
        backends: Arc<dyn BackendFactory>,
        config: &Config
    ) -> Self {
        Self::new(directory, source, backends)
            .with_pipeline_config(config.pipeline.clone())
            .with_default_provider(config.generation.default_provider.clone())
    }

    #[must_use]
    pub fn with_pipeline_config(mut self, pipeline: PipelineConfig) -> Self {
        self.pipeline = pipeline;
        self
    }

    #[must_use]
    pub fn with_default_provider(mut self, provider: impl Into<String>) -> Self {
        self.default_provider = provider.into();
        self
    }

    pub fn default_provider(&self) -> &str {
        &self.default_provider
    }

    pub async fn list_members(&self) -> Result<Vec<Member>, ReportError> {
        Ok(self.directory.list_members().await?)
    }

    pub fn list_providers(&self) -> Vec<ProviderCatalogEntry> {
        self.backends.list_available_providers()
    }

    #[instrument(skip(self, request), fields(member_id = %request.member_id))]
    pub async fn generate(&self, request: &ReportRequest) -> Result<Report, ReportError> {
        let result = self.run(request).await;
        PipelineTelemetry::record_report(match &result {
            Ok(report) if report.ticket_count == 0 => "empty",
            Ok(_) => "generated",
            Err(_) => "failed"
        });
        result
    }

    async fn run(&self, request: &ReportRequest) -> Result<Report, ReportError> {
        request.validate().map_err(|e| first_invalid_field(&e))?;
        let (start, end) = date_range(request)?;

        let spec = ProviderSpec::parse(
            request
                .provider
                .as_deref()
                .filter(|p| !p.trim().is_empty())
                .unwrap_or(self.default_provider.as_str())
        );
        let backend = self.backends.create_backend(&spec)?;
        info!(
            provider = %backend.provider_key(),
            model = %backend.model_id(),
            %start,
            %end,
            "Generating report"
        );

        let query = RecordQuery::for_owner(&request.member_id).between(start, end);
        let records = self.directory.fetch_records(&query).await?;
        if records.is_empty() {
            info!("No tickets matched the query");
            return Ok(Report::no_tickets());
        }

        let aggregation = Aggregator::from_config(self.source.clone(), &self.pipeline)
            .aggregate(records)
            .await?;

        let prompt = build_prompt(&aggregation.enriched, request.technician_display_name());
        let text = backend.generate(&prompt).await?;

        Ok(Report {
            report: text,
            ticket_count: aggregation.attempted,
            processed_count: aggregation.succeeded
        })
    }
}
