pub mod classifier;
pub mod ordering;

use crate::core::PredictionResult;

pub use classifier::{classify, ChanceThresholds};
pub use ordering::CutoffOrderRanker;

/// Trait for result ordering implementations
pub trait Ranker: Send + Sync {
    /// Sort results in place; must be a deterministic total order
    fn rank(&self, results: &mut [PredictionResult]);

    /// Get ranker name for logging
    fn name(&self) -> &str;
}
