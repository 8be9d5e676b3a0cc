use serde::{Deserialize, Serialize};

use crate::core::{CutoffRecord, Gender, PredictionQuery, Quota, Round};

/// Discrete admission-likelihood bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Chance {
    High,
    Medium,
    Low,
}

impl Chance {
    pub fn label(&self) -> &'static str {
        match self {
            Chance::High => "High",
            Chance::Medium => "Medium",
            Chance::Low => "Low",
        }
    }

    /// Percentage hint shown next to the label
    pub fn hint(&self) -> &'static str {
        match self {
            Chance::High => ">95%",
            Chance::Medium => "70-90%",
            Chance::Low => "<70%",
        }
    }
}

/// One matched cutoff line with its chance classification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionResult {
    pub institute: String,
    pub program: String,
    pub quota: Quota,
    pub category: String,
    pub gender: Gender,
    pub opening_rank: u32,
    pub closing_rank: u32,
    pub round: Round,
    pub chance: Chance,
    pub chance_hint: String,
}

impl PredictionResult {
    pub fn from_record(record: &CutoffRecord, chance: Chance) -> Self {
        Self {
            institute: record.institute.clone(),
            program: record.program.clone(),
            quota: record.quota,
            category: record.category.clone(),
            gender: record.gender,
            opening_rank: record.opening_rank,
            closing_rank: record.closing_rank,
            round: record.round,
            chance,
            chance_hint: chance.hint().to_string(),
        }
    }

    pub fn display(&self) -> String {
        format!(
            "{} - {} [{}-{}] {} ({})",
            self.institute,
            self.program,
            self.opening_rank,
            self.closing_rank,
            self.chance.label(),
            self.chance_hint
        )
    }
}

/// How a valid submission ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PredictionStatus {
    /// At least one record matched
    Matched,
    /// Dataset present, zero records matched
    NoMatch,
}

/// Result counts per chance bucket
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChanceBreakdown {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl ChanceBreakdown {
    pub fn from_results(results: &[PredictionResult]) -> Self {
        results.iter().fold(Self::default(), |mut acc, r| {
            match r.chance {
                Chance::High => acc.high += 1,
                Chance::Medium => acc.medium += 1,
                Chance::Low => acc.low += 1,
            }
            acc
        })
    }

    pub fn total(&self) -> usize {
        self.high + self.medium + self.low
    }
}

/// Outcome of one successful prediction: the full ranked result set plus metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionOutcome {
    pub query: PredictionQuery,
    pub status: PredictionStatus,
    /// Full ranked result set, before refinement and pagination
    pub results: Vec<PredictionResult>,
    pub total_matched: usize,
    pub breakdown: ChanceBreakdown,
    /// False when the query was a duplicate of an existing history entry
    pub recorded_in_history: bool,
    /// Dataset provider that served the records
    pub provider: String,
    pub latency_ms: f64,
}

impl PredictionOutcome {
    pub fn is_empty(&self) -> bool {
        self.status == PredictionStatus::NoMatch
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn display(&self) -> String {
        format!(
            "{} -> {} matches (high {}, medium {}, low {}) [{}] {:.2}ms",
            self.query.display(),
            self.total_matched,
            self.breakdown.high,
            self.breakdown.medium,
            self.breakdown.low,
            self.provider,
            self.latency_ms
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(chance: Chance) -> PredictionResult {
        PredictionResult {
            institute: "NIT Example".to_string(),
            program: "Electrical".to_string(),
            quota: Quota::OS,
            category: "OPEN".to_string(),
            gender: Gender::GenderNeutral,
            opening_rank: 100,
            closing_rank: 200,
            round: Round::Numbered(1),
            chance,
            chance_hint: chance.hint().to_string(),
        }
    }

    #[test]
    fn test_chance_vocabulary() {
        assert_eq!(Chance::High.hint(), ">95%");
        assert_eq!(Chance::Medium.hint(), "70-90%");
        assert_eq!(Chance::Low.hint(), "<70%");
        assert_eq!(serde_json::to_string(&Chance::Medium).unwrap(), "\"Medium\"");
    }

    #[test]
    fn test_breakdown_counts() {
        let results = vec![result(Chance::High), result(Chance::Low), result(Chance::High)];
        let breakdown = ChanceBreakdown::from_results(&results);
        assert_eq!(breakdown, ChanceBreakdown { high: 2, medium: 0, low: 1 });
        assert_eq!(breakdown.total(), 3);
    }

    #[test]
    fn test_result_field_names_are_stable() {
        let value = serde_json::to_value(result(Chance::Medium)).unwrap();
        assert_eq!(value["openingRank"], 100);
        assert_eq!(value["closingRank"], 200);
        assert_eq!(value["chance"], "Medium");
        assert_eq!(value["chanceHint"], "70-90%");
    }
}
