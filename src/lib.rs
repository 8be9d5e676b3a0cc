//! # Admission Predictor
//!
//! Admission-prediction matching engine over historical counselling cutoffs:
//! - Eligibility matching of cutoff records against a candidate's rank and category
//! - Positional chance classification (High / Medium / Low)
//! - Deterministic ordering, free-text refinement and pagination
//! - Bounded, deduplicated prediction history with pluggable persistence
//! - Pluggable dataset providers (in-memory, JSON directory, HTTP)
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use admission_predictor::{
//!     providers::JsonDirectoryProvider, Gender, PredictionEngine, PredictionQuery,
//!     PredictorConfig, Quota, Round,
//! };
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let mut engine = PredictionEngine::new(PredictorConfig::default())?;
//!     engine.add_provider(Arc::new(JsonDirectoryProvider::new("data")));
//!
//!     let outcome = engine.predict(&PredictionQuery {
//!         rank: 1520,
//!         category: "OPEN".to_string(),
//!         quota: Quota::AI,
//!         gender: Gender::GenderNeutral,
//!         round: Round::Numbered(6),
//!         year: 2024,
//!         authority: "JoSAA".to_string(),
//!         state: None,
//!     }).await?;
//!
//!     let mut view = engine.view(&outcome);
//!     view.set_institute_filter("technology");
//!     for result in view.current().page.results {
//!         println!("{}", result.display());
//!     }
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod core;
pub mod engine;
pub mod error;
pub mod history;
pub mod matching;
pub mod pagination;
pub mod providers;
pub mod ranking;
pub mod refine;
pub mod view;

// Re-export primary types
pub use crate::core::{
    Chance, ChanceBreakdown, CutoffRecord, DatasetKey, Gender, PredictionOutcome, PredictionQuery,
    PredictionResult, PredictionStatus, QueryForm, Quota, Round,
};
pub use config::PredictorConfig;
pub use engine::{build_predictions, PredictionEngine};
pub use error::{PredictorError, Result};
pub use history::{HistoryEntry, HistoryKey, HistoryStore, PredictionHistory};
pub use matching::{AuthorityScope, EligibilityMatcher};
pub use pagination::{paginate, Page, PageRequest};
pub use ranking::{classify, ChanceThresholds};
pub use refine::{refine, RefineFilter};
pub use view::{ResultPage, ResultView};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
