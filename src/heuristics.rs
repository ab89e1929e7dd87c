//! Pair-space accounting and formatting helpers for run summaries.

/// Size of the UHR × MP pair space and how much of it survived each stage.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PairSpace {
    /// Every UHR × MP combination.
    pub total_pairs: u128,
    /// Pairs that passed the hard filters and were scored.
    pub candidate_pairs: u128,
    /// Pairs at or above the minimum score, before truncation.
    pub qualifying_pairs: u128,
}

impl PairSpace {
    /// Pair space for the given collection sizes; stage counters start at zero.
    pub fn new(unidentified: usize, missing: usize) -> Self {
        Self {
            total_pairs: (unidentified as u128).saturating_mul(missing as u128),
            ..Self::default()
        }
    }

    /// Fraction of the pair space removed by hard filters, in `[0, 1]`.
    pub fn pruning_ratio(&self) -> f64 {
        if self.total_pairs == 0 {
            return 0.0;
        }
        let kept = self.candidate_pairs.min(self.total_pairs);
        1.0 - (kept as f64 / self.total_pairs as f64)
    }
}

/// Render `value` with thousands separators.
pub fn format_u128_with_commas(value: u128) -> String {
    let raw = value.to_string();
    let mut grouped_reversed = String::with_capacity(raw.len() + (raw.len() / 3));
    for (idx, ch) in raw.chars().rev().enumerate() {
        if idx > 0 && idx % 3 == 0 {
            grouped_reversed.push(',');
        }
        grouped_reversed.push(ch);
    }
    grouped_reversed.chars().rev().collect()
}

/// Render a ratio as a percentage with two decimals; `n/a` for non-finite input.
pub fn format_ratio_percent(ratio: f64) -> String {
    if !ratio.is_finite() {
        return "n/a".to_string();
    }
    format!("{:.2}%", ratio * 100.0)
}
