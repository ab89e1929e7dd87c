use std::cmp::Ordering;

use crate::data::Lead;

/// Final filter/sort/truncate step over merged leads.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LeadRanker {
    /// Leads scoring below this are dropped.
    pub min_score: f64,
    /// Maximum leads kept.
    pub limit: usize,
}

impl LeadRanker {
    /// Ranker with the given threshold and limit.
    pub fn new(min_score: f64, limit: usize) -> Self {
        Self { min_score, limit }
    }

    /// Drop leads under `min_score`, sort by descending score, keep `limit`.
    ///
    /// Equal scores are ordered by UHR case number, then MP file number, so the
    /// output does not depend on merge order.
    pub fn rank(&self, mut leads: Vec<Lead>) -> Vec<Lead> {
        leads.retain(|lead| lead.score >= self.min_score);
        leads.sort_by(compare_leads);
        leads.truncate(self.limit);
        leads
    }
}

/// Descending score, then ascending `(uhr_case, mp_file)`.
pub fn compare_leads(left: &Lead, right: &Lead) -> Ordering {
    right
        .score
        .total_cmp(&left.score)
        .then_with(|| left.uhr_case.cmp(&right.uhr_case))
        .then_with(|| left.mp_file.cmp(&right.mp_file))
}
