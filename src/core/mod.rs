pub mod cutoff_record;
pub mod prediction;
pub mod query;

pub use cutoff_record::{tokens_equal, CutoffRecord, DatasetKey, Gender, Quota, Round};
pub use prediction::{Chance, ChanceBreakdown, PredictionOutcome, PredictionResult, PredictionStatus};
pub use query::{parse_rank, PredictionQuery, QueryForm};
