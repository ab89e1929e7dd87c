//! Chunked, shared-nothing batch execution.
//!
//! The UHR set is split into contiguous chunks of `ceil(len / workers)`. Each
//! worker opens its own store handle, borrows the immutable `CorpusStats`,
//! and runs the pure `score_chunk`. Partial results are concatenated in chunk
//! order. Any worker error or panic fails the whole batch.

use std::thread;
use std::time::Instant;

use tracing::{debug, info};

use crate::candidates::CandidateGenerator;
use crate::config::MatcherConfig;
use crate::data::{Lead, MissingRecord, UnidentifiedRecord};
use crate::errors::MatchError;
use crate::scoring::PairScorer;
use crate::stats::CorpusStats;
use crate::store::StoreOpener;

/// Leads and counters produced by one or more chunks.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ChunkOutcome {
    /// Qualifying leads in source-record order.
    pub leads: Vec<Lead>,
    /// Pairs that survived the hard filters and were scored.
    pub candidate_pairs: u128,
    /// UHR records that were matched.
    pub records_scored: usize,
    /// UHR records skipped for a too-short description.
    pub records_skipped: usize,
}

impl ChunkOutcome {
    fn absorb(&mut self, other: ChunkOutcome) {
        self.leads.extend(other.leads);
        self.candidate_pairs += other.candidate_pairs;
        self.records_scored += other.records_scored;
        self.records_skipped += other.records_skipped;
    }
}

/// `ceil(len / workers)`, never below one.
pub fn chunk_size(len: usize, workers: usize) -> usize {
    len.div_ceil(workers.max(1)).max(1)
}

/// Generate and score candidates for every record in `records`.
///
/// Pure with respect to its inputs: the same chunk always yields the same
/// leads in the same order.
pub fn score_chunk(
    records: &[UnidentifiedRecord],
    missing: &[MissingRecord],
    stats: &CorpusStats,
    config: &MatcherConfig,
) -> ChunkOutcome {
    let generator = CandidateGenerator::new(&config.candidates);
    let scorer = PairScorer::new(stats, &config.scoring);
    let min_score = config.run.min_score;

    let mut outcome = ChunkOutcome::default();
    for record in records {
        if !generator.is_eligible(record) {
            outcome.records_skipped += 1;
            continue;
        }
        outcome.records_scored += 1;
        for candidate in generator.generate(record, missing) {
            outcome.candidate_pairs += 1;
            if let Some(lead) = scorer.lead(&candidate, min_score) {
                outcome.leads.push(lead);
            }
        }
    }
    outcome
}

/// Dispatches UHR chunks to workers and merges their leads.
pub struct ParallelCoordinator<'a> {
    opener: &'a dyn StoreOpener,
    stats: &'a CorpusStats,
    config: &'a MatcherConfig,
}

impl<'a> ParallelCoordinator<'a> {
    /// Coordinator opening one store handle per worker.
    pub fn new(
        opener: &'a dyn StoreOpener,
        stats: &'a CorpusStats,
        config: &'a MatcherConfig,
    ) -> Self {
        Self {
            opener,
            stats,
            config,
        }
    }

    /// Score every record, in parallel when configured.
    ///
    /// Lead order is unspecified across chunks; rank the result.
    pub fn run(&self, records: &[UnidentifiedRecord]) -> Result<ChunkOutcome, MatchError> {
        let workers = self.config.run.effective_workers();
        let size = chunk_size(records.len(), workers);
        let chunks: Vec<&[UnidentifiedRecord]> = records.chunks(size).collect();
        if self.config.run.parallel && chunks.len() > 1 {
            self.run_parallel(&chunks)
        } else {
            self.run_sequential(&chunks)
        }
    }

    /// Same chunks as the parallel path, on the calling thread with one handle.
    pub fn run_sequential(
        &self,
        chunks: &[&[UnidentifiedRecord]],
    ) -> Result<ChunkOutcome, MatchError> {
        let start = Instant::now();
        let store = self.opener.open()?;
        let missing = store.missing_records()?;
        let mut merged = ChunkOutcome::default();
        for chunk in chunks {
            merged.absorb(score_chunk(chunk, &missing, self.stats, self.config));
        }
        info!(
            store_id = %self.opener.id(),
            chunks = chunks.len(),
            leads = merged.leads.len(),
            elapsed_ms = start.elapsed().as_millis(),
            "sequential scoring completed"
        );
        Ok(merged)
    }

    /// One scoped thread per chunk; each opens its own store handle.
    pub fn run_parallel(&self, chunks: &[&[UnidentifiedRecord]]) -> Result<ChunkOutcome, MatchError> {
        let start = Instant::now();
        let results: Vec<Result<ChunkOutcome, MatchError>> = thread::scope(|scope| {
            let handles: Vec<_> = chunks
                .iter()
                .enumerate()
                .map(|(worker, chunk)| (worker, scope.spawn(move || self.run_worker(worker, chunk))))
                .collect();
            handles
                .into_iter()
                .map(|(worker, handle)| match handle.join() {
                    Ok(result) => result,
                    Err(_) => Err(MatchError::WorkerFailed {
                        worker,
                        reason: "scoring thread panicked".into(),
                    }),
                })
                .collect()
        });

        let mut merged = ChunkOutcome::default();
        for result in results {
            merged.absorb(result?);
        }
        info!(
            store_id = %self.opener.id(),
            workers = chunks.len(),
            leads = merged.leads.len(),
            elapsed_ms = start.elapsed().as_millis(),
            "parallel scoring completed"
        );
        Ok(merged)
    }

    fn run_worker(
        &self,
        worker: usize,
        chunk: &[UnidentifiedRecord],
    ) -> Result<ChunkOutcome, MatchError> {
        let start = Instant::now();
        let store = self.opener.open()?;
        let missing = store.missing_records()?;
        let outcome = score_chunk(chunk, &missing, self.stats, self.config);
        debug!(
            worker,
            records = chunk.len(),
            candidate_pairs = outcome.candidate_pairs,
            leads = outcome.leads.len(),
            elapsed_ms = start.elapsed().as_millis(),
            "worker chunk scored"
        );
        Ok(outcome)
    }
}
