use serde::{Deserialize, Serialize};

use crate::core::Chance;
use crate::error::{PredictorError, Result};

/// Positional cut points inside an `[opening, closing]` band
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChanceThresholds {
    /// Positions strictly below this are High
    pub high_below: f64,
    /// Positions strictly below this (and not High) are Medium, the rest Low
    pub medium_below: f64,
}

impl Default for ChanceThresholds {
    fn default() -> Self {
        Self {
            high_below: 0.3,
            medium_below: 0.7,
        }
    }
}

impl ChanceThresholds {
    pub fn validate(&self) -> Result<()> {
        let ordered = self.high_below > 0.0
            && self.high_below < self.medium_below
            && self.medium_below <= 1.0;
        if !ordered {
            return Err(PredictorError::Config(format!(
                "chance thresholds must satisfy 0 < high ({}) < medium ({}) <= 1",
                self.high_below, self.medium_below
            )));
        }
        Ok(())
    }

    /// Classify `rank` by its relative position in the band.
    ///
    /// A zero-width band has no position; a rank at (or better than) its
    /// single seat is High, anything worse is Low.
    pub fn classify(&self, rank: u32, opening_rank: u32, closing_rank: u32) -> Chance {
        if closing_rank <= opening_rank {
            return if rank <= closing_rank { Chance::High } else { Chance::Low };
        }

        let position = band_position(rank, opening_rank, closing_rank);
        if position < self.high_below {
            Chance::High
        } else if position < self.medium_below {
            Chance::Medium
        } else {
            Chance::Low
        }
    }
}

/// `(rank - opening) / (closing - opening)`; caller guarantees `closing > opening`
fn band_position(rank: u32, opening_rank: u32, closing_rank: u32) -> f64 {
    (f64::from(rank) - f64::from(opening_rank)) / (f64::from(closing_rank) - f64::from(opening_rank))
}

/// Classify with the default 0.3 / 0.7 cut points
pub fn classify(rank: u32, opening_rank: u32, closing_rank: u32) -> Chance {
    ChanceThresholds::default().classify(rank, opening_rank, closing_rank)
}
