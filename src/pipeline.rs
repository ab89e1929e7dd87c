use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::config::MatcherConfig;
use crate::coordinator::ParallelCoordinator;
use crate::data::Lead;
use crate::errors::MatchError;
use crate::heuristics::PairSpace;
use crate::metrics::{LeadConcentration, ScoreSummary, lead_concentration, score_summary};
use crate::ranker::LeadRanker;
use crate::stats::CorpusStats;
use crate::store::StoreOpener;

/// Counters describing one matching run.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RunSummary {
    /// UHR records loaded.
    pub unidentified_records: usize,
    /// MP records loaded.
    pub missing_records: usize,
    /// UHR records with at least one candidate.
    pub records_scored: usize,
    /// UHR records with no candidates.
    pub records_skipped: usize,
    /// Pair counts per stage.
    pub pair_space: PairSpace,
    /// Leads returned after ranking and truncation.
    pub leads_returned: usize,
    /// Wall-clock duration of the run.
    pub elapsed: Duration,
}

/// Ranked leads plus run counters.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MatchReport {
    /// Ranked leads.
    pub leads: Vec<Lead>,
    /// Run counters.
    pub summary: RunSummary,
}

impl MatchReport {
    /// Highest-ranked lead.
    pub fn top_lead(&self) -> Option<&Lead> {
        self.leads.first()
    }

    /// How leads spread across UHR cases.
    pub fn concentration(&self) -> Option<LeadConcentration> {
        lead_concentration(&self.leads)
    }

    /// Distribution of lead scores.
    pub fn score_summary(&self) -> Option<ScoreSummary> {
        score_summary(&self.leads)
    }
}

/// Run the full matching pipeline against `opener`.
///
/// Loads both collections through one handle, builds corpus statistics once,
/// scores every UHR record (in parallel when `config.run.parallel` is set)
/// and ranks the merged leads. Any storage or worker failure aborts the run.
pub fn find_leads(
    opener: &dyn StoreOpener,
    config: &MatcherConfig,
) -> Result<MatchReport, MatchError> {
    config.validate()?;
    let start = Instant::now();

    let store = opener.open()?;
    let unidentified = store.unidentified_records()?;
    let missing = store.missing_records()?;
    drop(store);
    debug!(
        store_id = %opener.id(),
        unidentified = unidentified.len(),
        missing = missing.len(),
        "collections loaded"
    );

    let stats = CorpusStats::build(&unidentified, &missing);
    debug!(
        uhr_documents = stats.unidentified.total_documents(),
        mp_documents = stats.missing.total_documents(),
        "corpus statistics built"
    );

    let outcome = ParallelCoordinator::new(opener, &stats, config).run(&unidentified)?;
    let mut pair_space = PairSpace::new(unidentified.len(), missing.len());
    pair_space.candidate_pairs = outcome.candidate_pairs;
    pair_space.qualifying_pairs = outcome.leads.len() as u128;

    let leads = LeadRanker::new(config.run.min_score, config.run.limit).rank(outcome.leads);
    let summary = RunSummary {
        unidentified_records: unidentified.len(),
        missing_records: missing.len(),
        records_scored: outcome.records_scored,
        records_skipped: outcome.records_skipped,
        pair_space,
        leads_returned: leads.len(),
        elapsed: start.elapsed(),
    };
    info!(
        store_id = %opener.id(),
        candidate_pairs = summary.pair_space.candidate_pairs as u64,
        qualifying = summary.pair_space.qualifying_pairs as u64,
        leads = summary.leads_returned,
        elapsed_ms = summary.elapsed.as_millis(),
        "lead search completed"
    );
    Ok(MatchReport { leads, summary })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{AgeRange, BiologicalEvidence, MissingRecord, Sex, UnidentifiedRecord};
    use crate::geo::GeoPoint;
    use crate::store::InMemoryStore;
    use chrono::NaiveDate;

    fn uhr(case: &str, description: &str, discovered: (i32, u32, u32)) -> UnidentifiedRecord {
        UnidentifiedRecord {
            case_number: case.into(),
            discovery_date: NaiveDate::from_ymd_opt(discovered.0, discovered.1, discovered.2),
            sex: Sex::Female,
            age: AgeRange::new(Some(20), Some(30)),
            location: GeoPoint::new(41.0, -87.0),
            race: Some("White".into()),
            evidence: BiologicalEvidence::default(),
            description: description.into(),
        }
    }

    fn mp(file: &str, description: &str, last_seen: (i32, u32, u32)) -> MissingRecord {
        MissingRecord {
            file_number: file.into(),
            name: format!("Name {file}"),
            last_seen_date: NaiveDate::from_ymd_opt(last_seen.0, last_seen.1, last_seen.2),
            sex: Sex::Female,
            age: Some(25),
            location: GeoPoint::new(41.0, -87.0),
            race: Some("White".into()),
            evidence: BiologicalEvidence::default(),
            description: description.into(),
        }
    }

    #[test]
    fn report_counts_pair_space_and_ranks_leads() {
        let store = InMemoryStore::new(
            vec![
                uhr("UP1", "red jacket", (2020, 1, 1)),
                uhr("UP2", "green boots", (2016, 1, 1)),
            ],
            vec![
                mp("MP1", "red jacket", (2019, 1, 1)),
                mp("MP2", "green boots", (2015, 1, 1)),
            ],
        )
        .unwrap();
        let mut config = MatcherConfig::default();
        config.run.parallel = false;

        let report = find_leads(&store, &config).unwrap();
        assert_eq!(report.summary.unidentified_records, 2);
        assert_eq!(report.summary.missing_records, 2);
        assert_eq!(report.summary.pair_space.total_pairs, 4);
        // UP2 was found before MP1 was last seen, so only three pairs survive.
        assert_eq!(report.summary.pair_space.candidate_pairs, 3);
        assert_eq!(report.summary.leads_returned, report.leads.len());
        assert!(report.leads.iter().all(|lead| lead.score >= 0.35));
        assert!(
            report
                .leads
                .windows(2)
                .all(|pair| pair[0].score >= pair[1].score)
        );
        assert!(
            !report
                .leads
                .iter()
                .any(|lead| lead.uhr_case == "UP2" && lead.mp_file == "MP1")
        );
        assert_eq!(report.top_lead(), report.leads.first());
    }

    #[test]
    fn invalid_config_is_rejected_before_loading() {
        let store = InMemoryStore::new(Vec::new(), Vec::new()).unwrap();
        let mut config = MatcherConfig::default();
        config.run.min_score = 1.5;
        let err = find_leads(&store, &config).unwrap_err();
        assert!(matches!(err, MatchError::Configuration(_)));
    }

    #[test]
    fn empty_store_yields_empty_report() {
        let store = InMemoryStore::new(Vec::new(), Vec::new()).unwrap();
        let report = find_leads(&store, &MatcherConfig::default()).unwrap();
        assert!(report.leads.is_empty());
        assert!(report.concentration().is_none());
        assert_eq!(report.summary.pair_space.total_pairs, 0);
    }
}
