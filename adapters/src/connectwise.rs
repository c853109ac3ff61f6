//! ConnectWise Manage REST client.
//!
//! One pooled [`reqwest::Client`] per process, built from
//! [`ConnectWiseConfig`] and shared by handle across all detail workers.

use async_trait::async_trait;
use config::ConnectWiseConfig;
use errors::SourceError;
use recap_core::{
    CoarseRecord, Member, NoteEntry, RecordDirectory, RecordQuery, RecordSource, TimeEntry
};
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::collections::HashSet;
use std::time::Duration;
use tracing::{debug, warn};

const SERVICE_TICKETS: &str = "service/tickets";
const PROJECT_TICKETS: &str = "project/tickets";
const TIME_ENTRIES: &str = "time/entries";
const MEMBERS: &str = "system/members";
const ORDER_BY: &str = "dateEntered desc";
const MAX_ERROR_BODY: usize = 512;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTicket {
    id: i64,
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    date_closed: Option<String>,
    #[serde(default)]
    date_entered: Option<String>
}

impl From<RawTicket> for CoarseRecord {
    fn from(raw: RawTicket) -> Self {
        CoarseRecord {
            id: raw.id.to_string(),
            title: raw.summary.unwrap_or_default(),
            reference_date: raw.date_closed.or(raw.date_entered)
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawNote {
    #[serde(default)]
    date_created: Option<String>,
    #[serde(default)]
    text: Option<String>
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTimeEntry {
    #[serde(default)]
    actual_hours: Option<f64>
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawMember {
    #[serde(default)]
    identifier: Option<String>,
    #[serde(default)]
    first_name: Option<String>,
    #[serde(default)]
    last_name: Option<String>
}

impl RawMember {
    fn into_member(self) -> Option<Member> {
        let identifier = self.identifier.filter(|id| !id.is_empty())?;
        let name = format!(
            "{} {}",
            self.first_name.unwrap_or_default(),
            self.last_name.unwrap_or_default()
        )
        .trim()
        .to_string();
        Some(Member { identifier, name })
    }
}

/// Renders a [`RecordQuery`] into a ConnectWise `conditions` expression.
///
/// Returns `None` when the query has no filters.
pub fn render_conditions(query: &RecordQuery) -> Option<String> {
    let mut clauses = Vec::new();

    if let Some(owner) = &query.owner_identifier {
        clauses.push(format!(
            "owner/identifier=\"{}\"",
            owner.replace('"', "\\\"")
        ));
    }

    let date_clause = match (query.entered_from, query.entered_to) {
        (Some(from), Some(to)) => Some(format!(
            "dateEntered >= [{from}] AND dateEntered <= [{to}]"
        )),
        (Some(from), None) => Some(format!("dateEntered >= [{from}]")),
        (None, Some(to)) => Some(format!("dateEntered <= [{to}]")),
        (None, None) => None
    };
    clauses.extend(date_clause);

    if clauses.is_empty() {
        return None;
    }
    Some(
        clauses
            .iter()
            .map(|c| format!("({c})"))
            .collect::<Vec<_>>()
            .join(" AND ")
    )
}

pub struct ConnectWiseClient {
    client: reqwest::Client,
    base_url: String,
    username: String,
    private_key: String,
    page_size: u32,
    max_records: u32
}

impl ConnectWiseClient {
    /// Builds the pooled client. Fails when credentials are missing or the
    /// optional `clientId` is not a valid header value.
    pub fn new(config: &ConnectWiseConfig) -> Result<Self, SourceError> {
        if !config.is_configured() {
            return Err(SourceError::Configuration {
                message: format!(
                    "missing ConnectWise credentials: {}",
                    config.missing_fields().join(", ")
                )
            });
        }

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(client_id) = &config.client_id {
            let value = HeaderValue::from_str(client_id).map_err(|e| {
                SourceError::Configuration {
                    message: format!("invalid clientId header: {e}")
                }
            })?;
            headers.insert(HeaderName::from_static("clientid"), value);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .pool_max_idle_per_host(config.pool_size)
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| SourceError::Configuration {
                message: format!("failed to build HTTP client: {e}")
            })?;

        Ok(Self {
            client,
            base_url: config.base_url(),
            username: format!("{}+{}", config.company_id, config.public_key),
            private_key: config.private_key.clone(),
            page_size: config.page_size,
            max_records: config.max_records
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, String)]
    ) -> Result<T, SourceError> {
        let url = format!("{}/{}", self.base_url, endpoint);
        debug!(endpoint, "ConnectWise GET");

        let response = self
            .client
            .get(&url)
            .basic_auth(&self.username, Some(&self.private_key))
            .query(params)
            .send()
            .await
            .map_err(|e| SourceError::Transport {
                endpoint: endpoint.to_string(),
                reason: e.to_string()
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| SourceError::Transport {
            endpoint: endpoint.to_string(),
            reason: e.to_string()
        })?;

        if !status.is_success() {
            let body = (!body.is_empty()).then(|| truncate(&body, MAX_ERROR_BODY));
            return Err(SourceError::Status {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
                body
            });
        }

        serde_json::from_str(&body).map_err(|e| SourceError::Malformed {
            endpoint: endpoint.to_string(),
            reason: e.to_string()
        })
    }

    /// Walks one ticket board page by page until a short page or the record
    /// cap. A failed page ends the walk and keeps what was already collected.
    async fn fetch_board(&self, board: &str, conditions: Option<&str>) -> Vec<CoarseRecord> {
        let mut records = Vec::new();
        let mut page = 1u32;

        loop {
            let remaining = self.max_records.saturating_sub(records.len() as u32);
            if remaining == 0 {
                break;
            }
            let page_size = self.page_size.min(remaining);

            let mut params = vec![
                ("pageSize", page_size.to_string()),
                ("page", page.to_string()),
                ("orderBy", ORDER_BY.to_string()),
            ];
            if let Some(conditions) = conditions {
                params.push(("conditions", conditions.to_string()));
            }

            match self.get::<Vec<RawTicket>>(board, &params).await {
                Ok(batch) => {
                    let fetched = batch.len() as u32;
                    records.extend(batch.into_iter().map(CoarseRecord::from));
                    if fetched < page_size {
                        break;
                    }
                    page += 1;
                }
                Err(e) => {
                    warn!(board, page, error = %e, "Ticket board fetch failed");
                    break;
                }
            }
        }

        debug!(board, count = records.len(), "Fetched ticket board");
        records
    }

    /// The first raw service ticket, for inspecting field shapes.
    pub async fn sample_ticket(&self) -> Result<Option<serde_json::Value>, SourceError> {
        let params = [("pageSize", "1".to_string())];
        let tickets: Vec<serde_json::Value> = self.get(SERVICE_TICKETS, &params).await?;
        Ok(tickets.into_iter().next())
    }
}

fn truncate(body: &str, max: usize) -> String {
    match body.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string()
    }
}

#[async_trait]
impl RecordSource for ConnectWiseClient {
    async fn get_notes(&self, record_id: &str) -> Result<Vec<NoteEntry>, SourceError> {
        let endpoint = format!("{SERVICE_TICKETS}/{record_id}/notes");
        let params = [("pageSize", self.page_size.to_string())];
        let notes: Vec<RawNote> = self.get(&endpoint, &params).await?;
        Ok(notes
            .into_iter()
            .map(|n| NoteEntry {
                created_at: n.date_created.unwrap_or_default(),
                text: n.text.unwrap_or_default()
            })
            .collect())
    }

    async fn get_time_entries(&self, record_id: &str) -> Result<Vec<TimeEntry>, SourceError> {
        let params = [
            ("conditions", format!("ticket/id={record_id}")),
            ("pageSize", self.page_size.to_string()),
        ];
        let entries: Vec<RawTimeEntry> = self.get(TIME_ENTRIES, &params).await?;
        Ok(entries
            .into_iter()
            .map(|e| TimeEntry {
                hours: e.actual_hours
            })
            .collect())
    }
}

#[async_trait]
impl RecordDirectory for ConnectWiseClient {
    async fn fetch_records(&self, query: &RecordQuery) -> Result<Vec<CoarseRecord>, SourceError> {
        let conditions = render_conditions(query);
        let (mut service, project) = tokio::join!(
            self.fetch_board(SERVICE_TICKETS, conditions.as_deref()),
            self.fetch_board(PROJECT_TICKETS, conditions.as_deref())
        );
        service.extend(project);

        // a ticket entered mid-walk shifts later pages and repeats a row
        let mut seen = HashSet::with_capacity(service.len());
        service.retain(|r| seen.insert(r.id.clone()));
        Ok(service)
    }

    async fn list_members(&self) -> Result<Vec<Member>, SourceError> {
        let params = [
            ("conditions", "inactiveFlag=false".to_string()),
            ("pageSize", "1000".to_string()),
        ];
        let members: Vec<RawMember> = self.get(MEMBERS, &params).await?;
        Ok(members.into_iter().filter_map(RawMember::into_member).collect())
    }
}
