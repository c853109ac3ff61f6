use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;

/// A work item summary (ticket) fetched in bulk, before its details.
///
/// Identity is `id`; never mutated after the source produces it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoarseRecord {
    pub id: String,
    pub title: String,
    pub reference_date: Option<String>
}

impl CoarseRecord {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        reference_date: Option<String>
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            reference_date
        }
    }
}

/// One note attached to a record, in the order the source returns it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteEntry {
    pub created_at: String,
    pub text: String
}

impl NoteEntry {
    pub fn new(created_at: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            created_at: created_at.into(),
            text: text.into()
        }
    }
}

/// One logged time entry. A missing `hours` counts as zero.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TimeEntry {
    pub hours: Option<f64>
}

impl TimeEntry {
    pub fn hours(hours: f64) -> Self {
        Self { hours: Some(hours) }
    }
}

/// A coarse record combined with its notes text and total logged hours.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedRecord {
    pub id: String,
    pub title: String,
    pub reference_date: Option<String>,
    /// One `- [<createdAt>] <text>` line per note, empty when there are none.
    pub notes_text: String,
    pub total_hours: f64
}

/// Outcome of one aggregation run.
///
/// `enriched.len() == succeeded` and `succeeded <= attempted`. Failed records
/// are dropped, never represented as placeholders.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AggregationResult {
    pub enriched: Vec<EnrichedRecord>,
    pub attempted: usize,
    pub succeeded: usize
}

impl AggregationResult {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn failed(&self) -> usize {
        self.attempted - self.succeeded
    }

    pub fn is_complete(&self) -> bool {
        self.attempted == self.succeeded
    }
}

/// A provider selection parsed from `"<providerKey>:<modelId>"` or a bare
/// `"<providerKey>"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderSpec {
    pub provider_key: String,
    pub model_id: Option<String>
}

impl ProviderSpec {
    pub const SEPARATOR: char = ':';

    pub fn new(provider_key: impl Into<String>, model_id: Option<String>) -> Self {
        Self {
            provider_key: provider_key.into(),
            model_id
        }
    }

    /// Splits on the first separator. An empty model after the separator is
    /// treated the same as no model.
    pub fn parse(compound: &str) -> Self {
        let compound = compound.trim();
        match compound.split_once(Self::SEPARATOR) {
            Some((provider, model)) => {
                let model = model.trim();
                Self {
                    provider_key: provider.trim().to_string(),
                    model_id: (!model.is_empty()).then(|| model.to_string())
                }
            }
            None => Self {
                provider_key: compound.to_string(),
                model_id: None
            }
        }
    }
}

impl std::str::FromStr for ProviderSpec {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl fmt::Display for ProviderSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.model_id {
            Some(model) => write!(f, "{}{}{}", self.provider_key, Self::SEPARATOR, model),
            None => write!(f, "{}", self.provider_key)
        }
    }
}

/// One usable (provider, model) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderCatalogEntry {
    #[serde(rename = "id")]
    pub compound_id: String,
    #[serde(rename = "provider")]
    pub provider_key: String,
    #[serde(rename = "name")]
    pub display_name: String,
    #[serde(rename = "model")]
    pub model_id: String
}

/// An active technician known to the helpdesk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub identifier: String,
    pub name: String
}

/// Filter for the coarse record listing.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RecordQuery {
    pub owner_identifier: Option<String>,
    pub entered_from: Option<NaiveDate>,
    pub entered_to: Option<NaiveDate>
}

impl RecordQuery {
    pub fn for_owner(owner: impl Into<String>) -> Self {
        Self {
            owner_identifier: Some(owner.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn between(mut self, from: NaiveDate, to: NaiveDate) -> Self {
        self.entered_from = Some(from);
        self.entered_to = Some(to);
        self
    }

    #[must_use]
    pub fn entered_from(mut self, from: NaiveDate) -> Self {
        self.entered_from = Some(from);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_compound_provider_id() {
        let spec = ProviderSpec::parse("openai:gpt-4o");
        assert_eq!(spec.provider_key, "openai");
        assert_eq!(spec.model_id.as_deref(), Some("gpt-4o"));
    }

    #[test]
    fn test_parse_bare_provider_id() {
        let spec: ProviderSpec = "openai".parse().unwrap();
        assert_eq!(spec.provider_key, "openai");
        assert_eq!(spec.model_id, None);
    }

    #[test]
    fn test_parse_splits_on_first_separator_only() {
        let spec = ProviderSpec::parse("ollama:llama3:8b");
        assert_eq!(spec.provider_key, "ollama");
        assert_eq!(spec.model_id.as_deref(), Some("llama3:8b"));
    }

    #[test]
    fn test_parse_trailing_separator_means_default_model() {
        let spec = ProviderSpec::parse("gemini:");
        assert_eq!(spec.provider_key, "gemini");
        assert_eq!(spec.model_id, None);
    }

    #[test]
    fn test_provider_spec_display_round_trips() {
        assert_eq!(ProviderSpec::parse("anthropic:claude").to_string(), "anthropic:claude");
        assert_eq!(ProviderSpec::parse("anthropic").to_string(), "anthropic");
    }

    #[test]
    fn test_catalog_entry_serializes_short_field_names() {
        let entry = ProviderCatalogEntry {
            compound_id: "openai:gpt-4o".to_string(),
            provider_key: "openai".to_string(),
            display_name: "OpenAI (GPT-4o)".to_string(),
            model_id: "gpt-4o".to_string()
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["id"], "openai:gpt-4o");
        assert_eq!(json["provider"], "openai");
        assert_eq!(json["name"], "OpenAI (GPT-4o)");
        assert_eq!(json["model"], "gpt-4o");
    }

    #[test]
    fn test_aggregation_result_counts() {
        let result = AggregationResult {
            enriched: Vec::new(),
            attempted: 3,
            succeeded: 0
        };
        assert_eq!(result.failed(), 3);
        assert!(!result.is_complete());
        assert!(AggregationResult::empty().is_complete());
    }
}
