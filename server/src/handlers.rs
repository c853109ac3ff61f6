//! HTTP request handlers.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse
};
use pipeline::{Report, ReportRequest};
use recap_core::ProviderCatalogEntry;
use serde::Serialize;
use std::sync::Arc;

use crate::error::{ApiError, Result};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION")
    })
}

#[derive(Debug, Serialize)]
pub struct MemberResponse {
    pub id: String,
    pub name: String,
    pub identifier: String
}

/// GET /api/members
pub async fn list_members(
    State(state): State<Arc<AppState>>
) -> Result<Json<Vec<MemberResponse>>> {
    let members = state.reports.list_members().await?;
    tracing::debug!(count = members.len(), "Returning members");

    Ok(Json(
        members
            .into_iter()
            .map(|m| MemberResponse {
                id: m.identifier.clone(),
                name: m.name,
                identifier: m.identifier
            })
            .collect()
    ))
}

/// GET /api/providers
///
/// Recomputed on every call from the credentials currently set.
pub async fn list_providers(
    State(state): State<Arc<AppState>>
) -> Json<Vec<ProviderCatalogEntry>> {
    Json(state.reports.list_providers())
}

/// POST /api/generate
pub async fn generate_report(
    State(state): State<Arc<AppState>>,
    body: std::result::Result<Json<ReportRequest>, JsonRejection>
) -> Result<Json<Report>> {
    let Json(request) = body.map_err(|e| ApiError::Body(e.body_text()))?;

    let report = state.reports.generate(&request).await?;
    tracing::info!(
        member_id = %request.member_id,
        ticket_count = report.ticket_count,
        processed_count = report.processed_count,
        "Report generated"
    );
    Ok(Json(report))
}

/// GET /metrics
pub async fn metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match &state.metrics {
        Some(handle) => (StatusCode::OK, handle.render()),
        None => (StatusCode::NOT_FOUND, "metrics disabled\n".to_string())
    }
}
