#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

/// Command-line runner behind the `filament-match` binary.
pub mod app;
/// Hard structural filters producing candidate pairs.
pub mod candidates;
/// Matcher configuration types.
pub mod config;
/// Centralized constants used across scoring, filtering, and storage.
pub mod constants;
/// Chunked worker fan-out and result merging.
pub mod coordinator;
/// Case records and lead output types.
pub mod data;
/// Coordinates, distances, and the geographic sub-score.
pub mod geo;
/// Pair-space accounting and formatting helpers.
pub mod heuristics;
/// Aggregate lead metrics.
pub mod metrics;
/// End-to-end lead search.
pub mod pipeline;
/// Final filter, sort, and truncation of leads.
pub mod ranker;
/// Pair scoring and explanatory features.
pub mod scoring;
/// Document-frequency tables and token specificity.
pub mod stats;
/// Record storage traits and built-in stores.
pub mod store;
/// Shared type aliases.
pub mod types;
/// Tokenization and text helpers.
pub mod utils;

mod errors;

pub use candidates::{Candidate, CandidateCriteria, CandidateGenerator};
pub use config::{CandidateConfig, CompositeWeights, MatcherConfig, RunConfig, ScoringConfig};
pub use coordinator::{ChunkOutcome, ParallelCoordinator, score_chunk};
pub use data::{
    AgeRange, BiologicalEvidence, EvidenceStatus, Lead, MissingRecord, Sex, UnidentifiedRecord,
};
pub use errors::MatchError;
pub use geo::GeoPoint;
pub use pipeline::{MatchReport, RunSummary, find_leads};
pub use ranker::LeadRanker;
pub use scoring::PairScorer;
pub use stats::{CorpusStats, StopWords};
pub use store::{InMemoryStore, JsonFileStore, RecordStore, StoreOpener};
pub use types::{CaseNumber, Feature, FileNumber, StoreId, Token};
