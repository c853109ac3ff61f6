//! # Recap Errors
//!
//! Error taxonomy for the report pipeline.
//!
//! - Uses `thiserror` for structured error definitions
//! - Named fields on every variant so log lines carry their context
//! - Per-record errors ([`DetailFetchError`]) are absorbed by the aggregator;
//!   everything else propagates to the caller

use std::fmt;
use thiserror::Error;

/// Errors raised by a record source (the upstream helpdesk API).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SourceError {
    #[error("Request to {endpoint} failed: {reason}")]
    Transport { endpoint: String, reason: String },

    #[error("Request to {endpoint} returned status {status}")]
    Status {
        endpoint: String,
        status: u16,
        body: Option<String>
    },

    #[error("Malformed payload from {endpoint}: {reason}")]
    Malformed { endpoint: String, reason: String },

    #[error("Record source configuration error: {message}")]
    Configuration { message: String }
}

impl SourceError {
    /// The endpoint the failed request targeted, when there was one.
    pub fn endpoint(&self) -> Option<&str> {
        match self {
            SourceError::Transport { endpoint, .. }
            | SourceError::Status { endpoint, .. }
            | SourceError::Malformed { endpoint, .. } => Some(endpoint),
            SourceError::Configuration { .. } => None
        }
    }
}

/// Which of the two per-record sub-fetches failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DetailPart {
    Notes,
    TimeEntries
}

impl fmt::Display for DetailPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DetailPart::Notes => write!(f, "notes"),
            DetailPart::TimeEntries => write!(f, "time entries")
        }
    }
}

/// A single record's detail fetch failed. Never partially applied.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Detail fetch for record {record_id} failed on {part}: {source}")]
pub struct DetailFetchError {
    pub record_id: String,
    pub part: DetailPart,
    #[source]
    pub source: SourceError
}

impl DetailFetchError {
    pub fn new(record_id: impl Into<String>, part: DetailPart, source: SourceError) -> Self {
        Self {
            record_id: record_id.into(),
            part,
            source
        }
    }
}

/// Fatal aggregation errors. Individual record failures never end up here.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AggregateError {
    #[error("Worker pool could not be created: {reason}")]
    WorkerPool { reason: String }
}

/// Backend construction errors, surfaced before any work begins.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BackendError {
    #[error("Unknown provider: {provider_key}")]
    UnknownProvider { provider_key: String },

    #[error("Missing credential for provider {provider_key}: set {env_var}")]
    MissingCredential {
        provider_key: String,
        env_var: String
    },

    #[error("Backend configuration error for {provider_key}: {reason}")]
    Configuration {
        provider_key: String,
        reason: String
    }
}

/// A generation call failed. Single attempt, no retry.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Generation with {provider_key}:{model_id} failed: {cause}")]
pub struct GenerationError {
    pub provider_key: String,
    pub model_id: String,
    pub cause: String
}

impl GenerationError {
    pub fn new(
        provider_key: impl Into<String>,
        model_id: impl Into<String>,
        cause: impl Into<String>
    ) -> Self {
        Self {
            provider_key: provider_key.into(),
            model_id: model_id.into(),
            cause: cause.into()
        }
    }
}

/// Top-level error for one report run.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Invalid request: {field} {reason}")]
    InvalidRequest { field: String, reason: String },

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Aggregate(#[from] AggregateError),

    #[error(transparent)]
    Generation(#[from] GenerationError)
}

impl ReportError {
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ReportError::InvalidRequest {
            field: field.into(),
            reason: reason.into()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detail_fetch_error_display_names_record_and_part() {
        let err = DetailFetchError::new(
            "42",
            DetailPart::TimeEntries,
            SourceError::Status {
                endpoint: "time/entries".to_string(),
                status: 503,
                body: None
            }
        );
        let msg = err.to_string();
        assert!(msg.contains("42"));
        assert!(msg.contains("time entries"));
        assert!(msg.contains("503"));
    }

    #[test]
    fn test_backend_error_display() {
        let err = BackendError::MissingCredential {
            provider_key: "openai".to_string(),
            env_var: "OPENAI_API_KEY".to_string()
        };
        assert_eq!(
            err.to_string(),
            "Missing credential for provider openai: set OPENAI_API_KEY"
        );
    }

    #[test]
    fn test_report_error_is_transparent_over_generation() {
        let err: ReportError = GenerationError::new("gemini", "gemini-2.5-pro", "quota").into();
        assert_eq!(
            err.to_string(),
            "Generation with gemini:gemini-2.5-pro failed: quota"
        );
    }

    #[test]
    fn test_source_error_endpoint() {
        let err = SourceError::Malformed {
            endpoint: "service/tickets/1/notes".to_string(),
            reason: "expected array".to_string()
        };
        assert_eq!(err.endpoint(), Some("service/tickets/1/notes"));
        assert_eq!(
            SourceError::Configuration {
                message: "x".to_string()
            }
            .endpoint(),
            None
        );
    }
}
