//! Diagnostics data model returned alongside the combined patterns.
//!
//! `CombineReport` is the entry point: per-stage counters for matching,
//! deduplication and cleaning plus a timing breakdown. Everything serialises
//! to camelCase JSON for the demo tooling.

pub mod report;
pub mod stages;

pub use report::{CombineReport, InputDescriptor, StageTimings};
pub use stages::{CleanStage, DedupStage, MatchStage};
