//! Multi-factor pair scoring.
//!
//! The composite is `w_text·text + w_geo·geo + w_pheno·phenotype`, boosted by
//! a biological-evidence multiplier and clamped to `[0, 1]`.

use std::cmp::Ordering;
use std::collections::HashSet;

use crate::candidates::Candidate;
use crate::config::{CompositeWeights, ScoringConfig};
use crate::constants::leads::PREVIEW_CHARS;
use crate::constants::scoring::{FEATURE_DENTAL_BOTH, FEATURE_DNA_BOTH, MAX_IGNORED_TOKEN_CHARS};
use crate::constants::specificity::RARE_SUFFIX;
use crate::data::{BiologicalEvidence, Lead};
use crate::geo::{distance_between, score_geo};
use crate::stats::{CorpusStats, StopWords};
use crate::types::{Feature, Token};
use crate::utils::{is_numeric_token, preview, word_tokens};

/// Result of comparing two descriptions.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TextOverlap {
    /// Normalized overlap score in `[0, 1]`.
    pub score: f64,
    /// Surfaced tokens, most specific first.
    pub features: Vec<Feature>,
}

/// Full breakdown of one pair's score.
#[derive(Clone, Debug, PartialEq)]
pub struct PairScore {
    /// Description overlap.
    pub text: TextOverlap,
    /// Great-circle distance, when both locations are known.
    pub distance_miles: Option<f64>,
    /// Geographic score.
    pub geo: f64,
    /// 1 when races match, otherwise 0.
    pub phenotype: f64,
    /// Biological-evidence boost, 1 when not applied.
    pub bio_multiplier: f64,
    /// Final clamped composite.
    pub score: f64,
}

/// Tokens eligible for overlap scoring: no stop words, no tokens of two
/// characters or fewer, no purely numeric tokens.
pub fn scoring_tokens(text: &str, stop_words: &StopWords) -> HashSet<Token> {
    word_tokens(text)
        .filter(|token| token.chars().count() > MAX_IGNORED_TOKEN_CHARS)
        .filter(|token| !is_numeric_token(token))
        .filter(|token| !stop_words.contains(token))
        .collect()
}

/// Specificity-weighted overlap of two descriptions.
pub fn score_text(
    uhr_description: &str,
    mp_description: &str,
    stats: &CorpusStats,
    config: &ScoringConfig,
) -> TextOverlap {
    let uhr_tokens = scoring_tokens(uhr_description, &config.stop_words);
    if uhr_tokens.is_empty() {
        return TextOverlap::default();
    }
    let mp_tokens = scoring_tokens(mp_description, &config.stop_words);

    let mut shared: Vec<(&Token, f64)> = uhr_tokens
        .intersection(&mp_tokens)
        .map(|token| {
            let specificity =
                stats.specificity(token, &config.stop_words, config.unseen_token_specificity);
            (token, specificity)
        })
        .collect();
    if shared.is_empty() {
        return TextOverlap::default();
    }
    shared.sort_by(|(left_token, left), (right_token, right)| {
        right
            .partial_cmp(left)
            .unwrap_or(Ordering::Equal)
            .then_with(|| left_token.cmp(right_token))
    });

    let mut total = 0.0;
    let mut features = Vec::new();
    for (token, specificity) in shared {
        total += specificity;
        if specificity > config.rare_threshold {
            features.push(format!("{token}{RARE_SUFFIX}"));
        } else if specificity > config.ordinary_threshold {
            features.push(token.clone());
        }
    }
    TextOverlap {
        score: (total / config.text_normalizer).clamp(0.0, 1.0),
        features,
    }
}

/// True when a race value carries information.
fn known_race(race: Option<&str>) -> Option<String> {
    let normalized = race?.trim().to_lowercase();
    match normalized.as_str() {
        "" | "unknown" | "uncertain" | "unsure" => None,
        _ => Some(normalized),
    }
}

/// 1.0 when both races are known and equal, 0.0 otherwise.
pub fn score_phenotype(race_a: Option<&str>, race_b: Option<&str>) -> f64 {
    match (known_race(race_a), known_race(race_b)) {
        (Some(a), Some(b)) if a == b => 1.0,
        _ => 0.0,
    }
}

/// `boost` when both sides have complete DNA, or both have complete dental
/// records; 1.0 otherwise.
pub fn bio_multiplier(a: &BiologicalEvidence, b: &BiologicalEvidence, boost: f64) -> f64 {
    if shared_dna(a, b) || shared_dental(a, b) {
        boost
    } else {
        1.0
    }
}

fn shared_dna(a: &BiologicalEvidence, b: &BiologicalEvidence) -> bool {
    a.dna.is_complete() && b.dna.is_complete()
}

fn shared_dental(a: &BiologicalEvidence, b: &BiologicalEvidence) -> bool {
    a.dental.is_complete() && b.dental.is_complete()
}

/// Weighted composite times the multiplier, clamped to `[0, 1]`.
pub fn combine(
    weights: &CompositeWeights,
    text: f64,
    geo: f64,
    phenotype: f64,
    bio_multiplier: f64,
) -> f64 {
    let composite = weights.text * text + weights.geo * geo + weights.phenotype * phenotype;
    let boosted = composite * bio_multiplier;
    if boosted.is_nan() {
        return 0.0;
    }
    boosted.clamp(0.0, 1.0)
}

/// Scores candidate pairs against one immutable statistics snapshot.
#[derive(Clone, Copy, Debug)]
pub struct PairScorer<'a> {
    stats: &'a CorpusStats,
    config: &'a ScoringConfig,
}

impl<'a> PairScorer<'a> {
    /// Scorer over `stats` with `config`.
    pub fn new(stats: &'a CorpusStats, config: &'a ScoringConfig) -> Self {
        Self { stats, config }
    }

    /// Score breakdown for a candidate pair.
    pub fn score(&self, candidate: &Candidate<'_>) -> PairScore {
        let uhr = candidate.unidentified;
        let mp = candidate.missing;
        let text = score_text(&uhr.description, &mp.description, self.stats, self.config);
        let distance_miles = distance_between(uhr.location.as_ref(), mp.location.as_ref());
        let geo = score_geo(distance_miles, self.config.geo_decay_miles);
        let phenotype = score_phenotype(uhr.race.as_deref(), mp.race.as_deref());
        let bio = bio_multiplier(&uhr.evidence, &mp.evidence, self.config.bio_multiplier);
        let score = combine(&self.config.weights, text.score, geo, phenotype, bio);
        PairScore {
            text,
            distance_miles,
            geo,
            phenotype,
            bio_multiplier: bio,
            score,
        }
    }

    /// Lead for the pair when its final score reaches `min_score`.
    pub fn lead(&self, candidate: &Candidate<'_>, min_score: f64) -> Option<Lead> {
        let scored = self.score(candidate);
        if scored.score < min_score {
            return None;
        }
        let uhr = candidate.unidentified;
        let mp = candidate.missing;

        let mut features = scored.text.features;
        if let Some(miles) = scored.distance_miles {
            features.push(format!("{miles:.0} miles away"));
        }
        if scored.phenotype > 0.0 {
            if let Some(race) = mp.race.as_deref() {
                features.push(format!("race match: {}", race.trim()));
            }
        }
        if shared_dna(&uhr.evidence, &mp.evidence) {
            features.push(FEATURE_DNA_BOTH.to_string());
        }
        if shared_dental(&uhr.evidence, &mp.evidence) {
            features.push(FEATURE_DENTAL_BOTH.to_string());
        }

        Some(Lead {
            uhr_case: uhr.case_number.clone(),
            mp_file: mp.file_number.clone(),
            mp_name: mp.name.clone(),
            score: scored.score,
            shared_features: features,
            uhr_desc_preview: preview(&uhr.description, PREVIEW_CHARS),
            mp_desc_preview: preview(&mp.description, PREVIEW_CHARS),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{AgeRange, EvidenceStatus, MissingRecord, Sex, UnidentifiedRecord};
    use crate::geo::GeoPoint;
    use crate::stats::DocumentFrequencies;

    fn background_stats(filler: usize) -> CorpusStats {
        let docs: Vec<String> = (0..filler).map(|idx| format!("filler{idx} jacket")).collect();
        CorpusStats {
            unidentified: DocumentFrequencies::build(docs.iter()),
            missing: DocumentFrequencies::build(docs.iter()),
        }
    }

    fn uhr(description: &str) -> UnidentifiedRecord {
        UnidentifiedRecord {
            case_number: "UP1".into(),
            discovery_date: None,
            sex: Sex::Unknown,
            age: AgeRange::default(),
            location: None,
            race: None,
            evidence: BiologicalEvidence::default(),
            description: description.into(),
        }
    }

    fn mp(description: &str) -> MissingRecord {
        MissingRecord {
            file_number: "MP1".into(),
            name: "Jane Doe".into(),
            last_seen_date: None,
            sex: Sex::Unknown,
            age: None,
            location: None,
            race: None,
            evidence: BiologicalEvidence::default(),
            description: description.into(),
        }
    }

    #[test]
    fn empty_or_disjoint_text_scores_zero() {
        let stats = background_stats(10);
        let config = ScoringConfig::default();
        assert_eq!(score_text("", "blue hoodie", &stats, &config), TextOverlap::default());
        assert_eq!(score_text("blue hoodie", "", &stats, &config), TextOverlap::default());
        assert_eq!(
            score_text("blue hoodie", "red sneakers", &stats, &config),
            TextOverlap::default()
        );
        // Shared tokens that are all stop words, short, or numeric are disjoint too.
        assert_eq!(
            score_text("remains found 1987 ok", "remains found 1987 ok", &stats, &config),
            TextOverlap::default()
        );
    }

    #[test]
    fn unseen_shared_tokens_are_rare() {
        let stats = background_stats(10);
        let config = ScoringConfig::default();
        let overlap = score_text("tattoo dragon", "dragon tattoo", &stats, &config);
        assert_eq!(overlap.features, vec!["dragon (rare)", "tattoo (rare)"]);
        assert!((overlap.score - 5.0 / 35.0).abs() < 1e-12);
    }

    #[test]
    fn common_tokens_score_but_are_not_surfaced() {
        let stats = background_stats(10);
        let config = ScoringConfig::default();
        let overlap = score_text("jacket", "jacket", &stats, &config);
        assert!(overlap.features.is_empty());
        assert_eq!(overlap.score, 0.0);
    }

    #[test]
    fn ordinary_tokens_are_surfaced_without_suffix() {
        // df=1 of 50 documents in each collection: log10(50) ~= 1.7.
        let stats = background_stats(50);
        let config = ScoringConfig::default();
        let overlap = score_text("filler3 coat", "filler3 coat", &stats, &config);
        assert_eq!(overlap.features, vec!["coat (rare)", "filler3"]);
    }

    #[test]
    fn text_score_clamps_to_one() {
        let stats = background_stats(1);
        let config = ScoringConfig::default();
        let words: Vec<String> = (0..40).map(|idx| format!("unique{idx}")).collect();
        let text = words.join(" ");
        let overlap = score_text(&text, &text, &stats, &config);
        assert_eq!(overlap.score, 1.0);
    }

    #[test]
    fn phenotype_requires_both_known_and_equal() {
        assert_eq!(score_phenotype(Some("White"), Some("white ")), 1.0);
        assert_eq!(score_phenotype(Some("White"), Some("Black")), 0.0);
        assert_eq!(score_phenotype(Some("White"), None), 0.0);
        assert_eq!(score_phenotype(Some("Unknown"), Some("Unknown")), 0.0);
        assert_eq!(score_phenotype(None, None), 0.0);
    }

    #[test]
    fn bio_multiplier_needs_matching_complete_evidence() {
        let complete_dna = BiologicalEvidence {
            dna: EvidenceStatus::Complete,
            dental: EvidenceStatus::NotAvailable,
        };
        let complete_dental = BiologicalEvidence {
            dna: EvidenceStatus::Submitted,
            dental: EvidenceStatus::Complete,
        };
        assert_eq!(bio_multiplier(&complete_dna, &complete_dna, 1.5), 1.5);
        assert_eq!(bio_multiplier(&complete_dental, &complete_dental, 1.5), 1.5);
        assert_eq!(bio_multiplier(&complete_dna, &complete_dental, 1.5), 1.0);
        let none = BiologicalEvidence::default();
        assert_eq!(bio_multiplier(&none, &none, 1.5), 1.0);
    }

    #[test]
    fn combine_stays_in_unit_interval() {
        let weights = CompositeWeights::default();
        let steps = [0.0, 0.1, 0.35, 0.5, 0.9, 1.0];
        for text in steps {
            for geo in steps {
                for pheno in steps {
                    for bio in [1.0, 1.5] {
                        let score = combine(&weights, text, geo, pheno, bio);
                        assert!((0.0..=1.0).contains(&score));
                    }
                }
            }
        }
        assert_eq!(combine(&weights, 1.0, 1.0, 1.0, 1.5), 1.0);
        assert!((combine(&weights, 0.0, 0.5, 0.0, 1.0) - 0.15).abs() < 1e-12);
    }

    #[test]
    fn lead_carries_features_previews_and_distance() {
        let stats = background_stats(10);
        let config = ScoringConfig::default();
        let mut unidentified = uhr("dragon tattoo on back");
        unidentified.location = GeoPoint::new(40.0, -100.0);
        unidentified.race = Some("White".into());
        let mut missing = mp("dragon tattoo");
        missing.location = GeoPoint::new(40.0, -100.0);
        missing.race = Some("White".into());
        let candidate = Candidate {
            unidentified: &unidentified,
            missing: &missing,
        };
        let scorer = PairScorer::new(&stats, &config);
        let lead = scorer.lead(&candidate, 0.35).expect("lead");
        assert_eq!(lead.uhr_case, "UP1");
        assert_eq!(lead.mp_file, "MP1");
        assert_eq!(lead.mp_name, "Jane Doe");
        assert_eq!(
            lead.shared_features,
            vec![
                "dragon (rare)",
                "tattoo (rare)",
                "0 miles away",
                "race match: White"
            ]
        );
        // 0.4 * 5/35 + 0.3 * 1.0 + 0.3 * 1.0
        assert!((lead.score - (0.4 * 5.0 / 35.0 + 0.6)).abs() < 1e-9);
        assert_eq!(lead.uhr_desc_preview, "dragon tattoo on back");
    }

    #[test]
    fn lead_below_threshold_is_dropped() {
        let stats = background_stats(10);
        let config = ScoringConfig::default();
        let unidentified = uhr("");
        let missing = mp("");
        let candidate = Candidate {
            unidentified: &unidentified,
            missing: &missing,
        };
        let scorer = PairScorer::new(&stats, &config);
        // Only the neutral geo score contributes: 0.3 * 0.5.
        assert!((scorer.score(&candidate).score - 0.15).abs() < 1e-12);
        assert!(scorer.lead(&candidate, 0.35).is_none());
        assert!(scorer.lead(&candidate, 0.15).is_some());
    }

    #[test]
    fn geo_and_bio_alone_can_qualify_a_pair() {
        let stats = background_stats(10);
        let config = ScoringConfig::default();
        let evidence = BiologicalEvidence {
            dna: EvidenceStatus::Complete,
            dental: EvidenceStatus::Complete,
        };
        let mut unidentified = uhr("");
        unidentified.location = GeoPoint::new(35.0, -90.0);
        unidentified.evidence = evidence;
        let mut missing = mp("");
        missing.location = GeoPoint::new(35.0, -90.0);
        missing.evidence = evidence;
        let candidate = Candidate {
            unidentified: &unidentified,
            missing: &missing,
        };
        let lead = PairScorer::new(&stats, &config)
            .lead(&candidate, 0.35)
            .expect("geo + bio lead");
        assert!((lead.score - 0.45).abs() < 1e-9);
        assert!(lead.shared_features.contains(&FEATURE_DNA_BOTH.to_string()));
        assert!(lead.shared_features.contains(&FEATURE_DENTAL_BOTH.to_string()));
    }
}
