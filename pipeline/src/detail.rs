//! Per-record detail fetch: notes text and total logged hours.

use errors::{DetailFetchError, DetailPart};
use recap_core::{CoarseRecord, EnrichedRecord, NoteEntry, RecordSource, TimeEntry};
use std::sync::Arc;

/// Joins notes as `- [<createdAt>] <text>` lines in source order.
pub fn notes_text(notes: &[NoteEntry]) -> String {
    notes
        .iter()
        .map(|note| format!("- [{}] {}", note.created_at, note.text))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Sums logged hours. Missing or non-finite values count as zero.
///
/// Values are summed in sorted order so the total does not depend on the
/// order the source returned the entries in.
pub fn total_hours(entries: &[TimeEntry]) -> f64 {
    let mut hours: Vec<f64> = entries
        .iter()
        .map(|entry| entry.hours.filter(|h| h.is_finite()).unwrap_or(0.0))
        .collect();
    hours.sort_by(f64::total_cmp);
    hours.iter().sum::<f64>().max(0.0)
}

/// Read-only per-record worker shared by every aggregation task.
#[derive(Clone)]
pub struct DetailFetcher {
    source: Arc<dyn RecordSource>
}

impl DetailFetcher {
    pub fn new(source: Arc<dyn RecordSource>) -> Self {
        Self { source }
    }

    /// Issues exactly one notes read and one time-entries read. Either
    /// failing fails the whole record; no partial record is returned.
    pub async fn fetch_details(
        &self,
        record: &CoarseRecord
    ) -> Result<EnrichedRecord, DetailFetchError> {
        let (notes, entries) = tokio::join!(
            self.source.get_notes(&record.id),
            self.source.get_time_entries(&record.id)
        );
        let notes =
            notes.map_err(|e| DetailFetchError::new(&record.id, DetailPart::Notes, e))?;
        let entries =
            entries.map_err(|e| DetailFetchError::new(&record.id, DetailPart::TimeEntries, e))?;

        Ok(EnrichedRecord {
            id: record.id.clone(),
            title: record.title.clone(),
            reference_date: record.reference_date.clone(),
            notes_text: notes_text(&notes),
            total_hours: total_hours(&entries)
        })
    }
}
