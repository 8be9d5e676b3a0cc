use std::cmp::Ordering;

use crate::core::PredictionResult;
use crate::ranking::Ranker;

/// Orders by opening rank, then closing rank, then institute name (all ascending)
pub struct CutoffOrderRanker;

impl CutoffOrderRanker {
    pub fn new() -> Self {
        Self
    }

    pub fn compare(a: &PredictionResult, b: &PredictionResult) -> Ordering {
        a.opening_rank
            .cmp(&b.opening_rank)
            .then_with(|| a.closing_rank.cmp(&b.closing_rank))
            .then_with(|| a.institute.cmp(&b.institute))
    }
}

impl Default for CutoffOrderRanker {
    fn default() -> Self {
        Self::new()
    }
}

impl Ranker for CutoffOrderRanker {
    fn rank(&self, results: &mut [PredictionResult]) {
        // Stable: rows equal on every key keep dataset order
        results.sort_by(Self::compare);
    }

    fn name(&self) -> &str {
        "cutoff-order"
    }
}
