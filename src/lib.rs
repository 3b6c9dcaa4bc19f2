//! # Langstats
//!
//! Combinable per-language descriptive statistics for sharded text corpora.
//!
//! The engine is split into two phases that never communicate directly:
//!
//! - **Collect**: any number of independent [`collector::StatsCollector`]
//!   instances each consume a document stream, maintain one
//!   [`aggregate::RunningAggregate`] per language, and persist a single
//!   [`artifact::PartitionArtifact`] file at end of stream.
//! - **Reduce**: a single [`reducer::StatsReducer`] merges every artifact
//!   into one global summary per language (exact histogram addition plus
//!   weighted first/second-moment combination), applies a caller-supplied
//!   derivation function, and writes one report per language.
//!
//! ## Modules
//!
//! - `aggregate` - Per-language running accumulators and their merge algebra
//! - `artifact` - Persisted partition snapshots exchanged between phases
//! - `collector` - Pass-through pipeline stage driving the map phase
//! - `document` - Input document model and language-key extraction
//! - `reducer` - Sequential merge orchestration and report output
//! - `report` - Merged statistics, derivation functions, histogram helpers
//! - `runner` - In-process parallel scheduling of collector workers
//! - `tokenizer` - Word/sentence tokenizer capability map
//! - `testing` - Fixtures shared by unit and integration tests
pub mod aggregate;
pub mod artifact;
pub mod collector;
pub mod document;
pub mod error;
pub mod reducer;
pub mod report;
pub mod runner;
pub mod tokenizer;

pub mod testing;

pub use error::{Error, Result};
