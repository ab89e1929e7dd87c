use std::collections::HashMap;

use crate::data::Lead;
use crate::types::CaseNumber;

/// How leads are spread across UHR cases.
///
/// A single UHR record with a generic description can flood the output; this
/// makes that visible.
#[derive(Clone, Debug, PartialEq)]
pub struct LeadConcentration {
    /// Total leads.
    pub total: usize,
    /// Distinct UHR cases with at least one lead.
    pub cases: usize,
    /// Fewest leads for one case.
    pub min: usize,
    /// Most leads for one case.
    pub max: usize,
    /// Mean leads per case.
    pub mean: f64,
    /// Largest single-case share of all leads.
    pub max_share: f64,
    /// Per-case breakdown, largest share first.
    pub per_case: Vec<CaseShare>,
}

/// Per-UHR-case share of the leads.
#[derive(Clone, Debug, PartialEq)]
pub struct CaseShare {
    /// UHR case number.
    pub case: CaseNumber,
    /// Leads for this case.
    pub count: usize,
    /// Fraction of all leads.
    pub share: f64,
}

/// Distribution of lead scores.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScoreSummary {
    /// Lowest score.
    pub min: f64,
    /// Highest score.
    pub max: f64,
    /// Mean score.
    pub mean: f64,
}

/// Compute concentration metrics; `None` when there are no leads.
pub fn lead_concentration(leads: &[Lead]) -> Option<LeadConcentration> {
    if leads.is_empty() {
        return None;
    }
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for lead in leads {
        *counts.entry(lead.uhr_case.as_str()).or_insert(0) += 1;
    }
    let total = leads.len();
    let cases = counts.len();
    let min = counts.values().copied().min().unwrap_or(0);
    let max = counts.values().copied().max().unwrap_or(0);
    let mut per_case: Vec<CaseShare> = counts
        .into_iter()
        .map(|(case, count)| CaseShare {
            case: case.to_string(),
            count,
            share: count as f64 / total as f64,
        })
        .collect();
    per_case.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.case.cmp(&b.case)));
    Some(LeadConcentration {
        total,
        cases,
        min,
        max,
        mean: total as f64 / cases as f64,
        max_share: max as f64 / total as f64,
        per_case,
    })
}

/// Score distribution; `None` when there are no leads.
pub fn score_summary(leads: &[Lead]) -> Option<ScoreSummary> {
    if leads.is_empty() {
        return None;
    }
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    let mut sum = 0.0;
    for lead in leads {
        min = min.min(lead.score);
        max = max.max(lead.score);
        sum += lead.score;
    }
    Some(ScoreSummary {
        min,
        max,
        mean: sum / leads.len() as f64,
    })
}
