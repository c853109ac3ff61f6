//! # Recap Pipeline
//!
//! Turns a technician's tickets into a generated report.
//!
//! - [`DetailFetcher`] reads one record's notes and time entries
//! - [`Aggregator`] fans the fetcher out over a record set with a bounded
//!   worker pool and drops records whose details could not be read
//! - [`ReportService`] validates a request, picks a backend, aggregates and
//!   generates

pub mod aggregator;
pub mod detail;
pub mod prompt;
pub mod report;
pub mod telemetry;

pub use aggregator::{Aggregator, DEFAULT_CONCURRENCY_LIMIT};
pub use detail::{DetailFetcher, notes_text, total_hours};
pub use prompt::build_prompt;
pub use report::{NO_TICKETS_REPORT, Report, ReportRequest, ReportService};
