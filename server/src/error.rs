//! Error types for the HTTP surface.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response}
};
use errors::{BackendError, ReportError};
use serde::Serialize;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ApiError>;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Report(#[from] ReportError),

    /// The request body could not be decoded.
    #[error("Malformed request body: {0}")]
    Body(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Server error: {0}")]
    Server(String)
}

/// Error response body for HTTP endpoints.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>
}

impl ApiError {
    fn parts(&self) -> (StatusCode, &'static str, Option<String>) {
        match self {
            Self::Report(ReportError::InvalidRequest { field, .. }) => {
                (StatusCode::BAD_REQUEST, "INVALID_REQUEST", Some(field.clone()))
            }
            Self::Report(ReportError::Backend(BackendError::UnknownProvider { .. })) => {
                (StatusCode::BAD_REQUEST, "UNKNOWN_PROVIDER", None)
            }
            Self::Report(ReportError::Backend(BackendError::MissingCredential {
                env_var, ..
            })) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "MISSING_CREDENTIAL",
                Some(env_var.clone())
            ),
            Self::Report(ReportError::Backend(BackendError::Configuration { .. })) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "BACKEND_CONFIGURATION_ERROR",
                None
            ),
            Self::Report(ReportError::Source(e)) => (
                StatusCode::BAD_GATEWAY,
                "SOURCE_ERROR",
                e.endpoint().map(str::to_string)
            ),
            Self::Report(ReportError::Aggregate(_)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "AGGREGATION_ERROR", None)
            }
            Self::Report(ReportError::Generation(e)) => (
                StatusCode::BAD_GATEWAY,
                "GENERATION_ERROR",
                Some(format!("{}:{}", e.provider_key, e.model_id))
            ),
            Self::Body(_) => (StatusCode::BAD_REQUEST, "INVALID_REQUEST", None),
            Self::Configuration(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "CONFIGURATION_ERROR", None)
            }
            Self::Server(_) => (StatusCode::INTERNAL_SERVER_ERROR, "SERVER_ERROR", None)
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, details) = self.parts();
        if status.is_server_error() {
            tracing::error!(error = %self, code, "Request failed");
        } else {
            tracing::debug!(error = %self, code, "Request rejected");
        }

        let body = ErrorResponse {
            error: self.to_string(),
            code: code.to_string(),
            details
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use errors::{GenerationError, SourceError};

    fn status_of(err: impl Into<ApiError>) -> StatusCode {
        err.into().parts().0
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            status_of(ReportError::invalid("member_id", "is required")),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(ReportError::from(BackendError::UnknownProvider {
                provider_key: "x".to_string()
            })),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(ReportError::from(BackendError::MissingCredential {
                provider_key: "openai".to_string(),
                env_var: "OPENAI_API_KEY".to_string()
            })),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_of(ReportError::from(SourceError::Transport {
                endpoint: "service/tickets".to_string(),
                reason: "refused".to_string()
            })),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status_of(ReportError::from(GenerationError::new("gemini", "m", "quota"))),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_error_response_without_details() {
        let resp = ErrorResponse {
            error: "test error".to_string(),
            code: "TEST_ERROR".to_string(),
            details: None
        };
        let json = serde_json::to_string(&resp).unwrap();
        assert!(!json.contains("details"));
    }

    #[test]
    fn test_invalid_request_details_name_the_field() {
        let (_, code, details) =
            ApiError::from(ReportError::invalid("start_date", "must be a YYYY-MM-DD date")).parts();
        assert_eq!(code, "INVALID_REQUEST");
        assert_eq!(details.as_deref(), Some("start_date"));
    }
}
