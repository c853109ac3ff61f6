//! Collaborator traits for the report pipeline

use async_trait::async_trait;
use errors::SourceError;

use crate::types::{CoarseRecord, Member, NoteEntry, RecordQuery, TimeEntry};

/// Per-record detail reads. Implementations must be safe to call from many
/// workers at once; the pipeline adds no throttling beyond its own bound.
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Notes for one record, in source order.
    async fn get_notes(&self, record_id: &str) -> Result<Vec<NoteEntry>, SourceError>;

    /// Time entries logged against one record.
    async fn get_time_entries(&self, record_id: &str) -> Result<Vec<TimeEntry>, SourceError>;
}

/// Bulk listings used to start a report run.
#[async_trait]
pub trait RecordDirectory: Send + Sync {
    async fn fetch_records(&self, query: &RecordQuery) -> Result<Vec<CoarseRecord>, SourceError>;

    async fn list_members(&self) -> Result<Vec<Member>, SourceError>;
}
