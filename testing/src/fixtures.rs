use async_trait::async_trait;
use dashmap::{DashMap, DashSet};
use errors::{DetailPart, SourceError};
use parking_lot::Mutex;
use recap_core::{
    CoarseRecord, Member, NoteEntry, RecordDirectory, RecordQuery, RecordSource, TimeEntry
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

pub fn coarse_record(id: &str) -> CoarseRecord {
    CoarseRecord::new(
        id,
        format!("Ticket {id}"),
        Some("2024-01-15T00:00:00Z".to_string())
    )
}

pub fn note(created_at: &str, text: &str) -> NoteEntry {
    NoteEntry::new(created_at, text)
}

pub fn member(identifier: &str, name: &str) -> Member {
    Member {
        identifier: identifier.to_string(),
        name: name.to_string()
    }
}

/// Tracks in-flight calls and the highest count seen.
#[derive(Default)]
struct InFlightGauge {
    current: AtomicUsize,
    peak: AtomicUsize
}

impl InFlightGauge {
    fn enter(&self) -> InFlightGuard<'_> {
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        InFlightGuard { gauge: self }
    }
}

struct InFlightGuard<'a> {
    gauge: &'a InFlightGauge
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.gauge.current.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Record source backed by maps, with per-record fault injection.
///
/// Unknown ids read as empty notes and no time entries.
#[derive(Default)]
pub struct InMemoryRecordSource {
    notes: DashMap<String, Vec<NoteEntry>>,
    time_entries: DashMap<String, Vec<TimeEntry>>,
    faults: DashSet<(String, DetailPart)>,
    delay: Option<Duration>,
    notes_calls: AtomicUsize,
    time_entry_calls: AtomicUsize,
    in_flight: InFlightGauge
}

impl InMemoryRecordSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// One note and one one-hour entry per record.
    pub fn seeded(records: &[CoarseRecord]) -> Self {
        let source = Self::new();
        for record in records {
            source.insert_notes(
                &record.id,
                vec![note("2024-01-15T09:00:00Z", &format!("Worked on {}", record.title))]
            );
            source.insert_time_entries(&record.id, vec![TimeEntry::hours(1.0)]);
        }
        source
    }

    /// Each read sleeps for `delay` before answering.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn insert_notes(&self, record_id: &str, notes: Vec<NoteEntry>) {
        self.notes.insert(record_id.to_string(), notes);
    }

    pub fn insert_time_entries(&self, record_id: &str, entries: Vec<TimeEntry>) {
        self.time_entries.insert(record_id.to_string(), entries);
    }

    pub fn fail_on(&self, record_id: &str, part: DetailPart) {
        self.faults.insert((record_id.to_string(), part));
    }

    pub fn notes_calls(&self) -> usize {
        self.notes_calls.load(Ordering::SeqCst)
    }

    pub fn time_entry_calls(&self) -> usize {
        self.time_entry_calls.load(Ordering::SeqCst)
    }

    /// Highest number of reads observed in flight at once.
    pub fn peak_in_flight(&self) -> usize {
        self.in_flight.peak.load(Ordering::SeqCst)
    }

    async fn pause(&self) {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
    }

    fn check_fault(
        &self,
        record_id: &str,
        part: DetailPart,
        endpoint: String
    ) -> Result<(), SourceError> {
        if self.faults.contains(&(record_id.to_string(), part)) {
            return Err(SourceError::Status {
                endpoint,
                status: 500,
                body: Some("injected fault".to_string())
            });
        }
        Ok(())
    }
}

#[async_trait]
impl RecordSource for InMemoryRecordSource {
    async fn get_notes(&self, record_id: &str) -> Result<Vec<NoteEntry>, SourceError> {
        self.notes_calls.fetch_add(1, Ordering::SeqCst);
        let _guard = self.in_flight.enter();
        self.pause().await;

        self.check_fault(
            record_id,
            DetailPart::Notes,
            format!("service/tickets/{record_id}/notes")
        )?;
        Ok(self
            .notes
            .get(record_id)
            .map(|n| n.value().clone())
            .unwrap_or_default())
    }

    async fn get_time_entries(&self, record_id: &str) -> Result<Vec<TimeEntry>, SourceError> {
        self.time_entry_calls.fetch_add(1, Ordering::SeqCst);
        let _guard = self.in_flight.enter();
        self.pause().await;

        self.check_fault(record_id, DetailPart::TimeEntries, "time/entries".to_string())?;
        Ok(self
            .time_entries
            .get(record_id)
            .map(|e| e.value().clone())
            .unwrap_or_default())
    }
}

/// Directory returning a fixed record list and member roster.
#[derive(Default)]
pub struct InMemoryDirectory {
    records: Vec<CoarseRecord>,
    members: Vec<Member>,
    failure: Option<SourceError>,
    queries: Mutex<Vec<RecordQuery>>
}

impl InMemoryDirectory {
    pub fn new(records: Vec<CoarseRecord>) -> Self {
        Self {
            records,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_members(mut self, members: Vec<Member>) -> Self {
        self.members = members;
        self
    }

    /// Every call fails with `error`.
    #[must_use]
    pub fn failing(mut self, error: SourceError) -> Self {
        self.failure = Some(error);
        self
    }

    pub fn queries(&self) -> Vec<RecordQuery> {
        self.queries.lock().clone()
    }

    fn check_failure(&self) -> Result<(), SourceError> {
        match &self.failure {
            Some(error) => Err(error.clone()),
            None => Ok(())
        }
    }
}

#[async_trait]
impl RecordDirectory for InMemoryDirectory {
    async fn fetch_records(&self, query: &RecordQuery) -> Result<Vec<CoarseRecord>, SourceError> {
        self.queries.lock().push(query.clone());
        self.check_failure()?;
        Ok(self.records.clone())
    }

    async fn list_members(&self) -> Result<Vec<Member>, SourceError> {
        self.check_failure()?;
        Ok(self.members.clone())
    }
}
