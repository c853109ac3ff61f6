//! Shared test doubles for the Recap workspace.
//!
//! - [`InMemoryRecordSource`]: notes and time entries per record id, with
//!   per-record fault injection, an optional read delay, call counters and a
//!   peak in-flight gauge
//! - [`InMemoryDirectory`]: fixed record list and member roster
//! - Fixture builders for records, notes and members

mod fixtures;

pub use fixtures::*;
