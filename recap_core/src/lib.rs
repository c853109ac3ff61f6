//! # Recap Core
//!
//! Shared types and traits for the Recap report pipeline.
//!
//! This crate provides:
//! - The record data model (coarse records, notes, time entries, enriched
//!   records, aggregation results)
//! - Provider selection types (compound `provider:model` identifiers and
//!   catalog entries)
//! - The collaborator traits implemented by record source adapters

pub mod traits;
pub mod types;

pub use traits::{RecordDirectory, RecordSource};
pub use types::{
    AggregationResult, CoarseRecord, EnrichedRecord, Member, NoteEntry, ProviderCatalogEntry,
    ProviderSpec, RecordQuery, TimeEntry
};
