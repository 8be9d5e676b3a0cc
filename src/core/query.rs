use serde::{Deserialize, Serialize};

use crate::core::{DatasetKey, Gender, Quota, Round};
use crate::error::{PredictorError, Result};

/// Candidate's search criteria. Immutable once submitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionQuery {
    pub rank: u32,
    pub category: String,
    pub quota: Quota,
    pub gender: Gender,
    pub round: Round,
    pub year: u16,
    pub authority: String,
    #[serde(default)]
    pub state: Option<String>,
}

impl PredictionQuery {
    /// Dataset this query runs against
    pub fn dataset_key(&self) -> DatasetKey {
        DatasetKey::new(self.authority.clone(), self.year, self.round)
    }

    /// Rank must be a positive integer
    pub fn validate(&self) -> Result<()> {
        if self.rank == 0 {
            return Err(PredictorError::validation("rank", "must be a positive integer"));
        }
        if self.category.trim().is_empty() {
            return Err(PredictorError::validation("category", "must not be empty"));
        }
        Ok(())
    }

    pub fn display(&self) -> String {
        let mut out = format!(
            "rank {} | {} | {} | {} | {} {} R{}",
            self.rank, self.category, self.quota, self.gender, self.authority, self.year, self.round
        );
        if let Some(state) = &self.state {
            out.push_str(&format!(" | {}", state));
        }
        out
    }
}

/// Unvalidated form input, as submitted by the form layer
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryForm {
    #[serde(default)]
    pub rank: Option<String>,
    pub category: String,
    pub quota: String,
    pub gender: String,
    pub round: String,
    pub year: u16,
    pub authority: String,
    #[serde(default)]
    pub state: Option<String>,
}

impl QueryForm {
    /// Validate raw input into a typed query
    pub fn into_query(&self) -> Result<PredictionQuery> {
        let rank = parse_rank(self.rank.as_deref())?;
        let query = PredictionQuery {
            rank,
            category: self.category.trim().to_string(),
            quota: self.quota.parse()?,
            gender: self.gender.parse()?,
            round: self.round.parse()?,
            year: self.year,
            authority: self.authority.trim().to_string(),
            state: self
                .state
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
        };
        query.validate()?;
        Ok(query)
    }
}

/// Parse a rank field: missing, non-numeric and non-positive inputs are rejected
pub fn parse_rank(input: Option<&str>) -> Result<u32> {
    let raw = input.map(str::trim).filter(|s| !s.is_empty()).ok_or_else(|| {
        PredictorError::validation("rank", "is required")
    })?;

    let value: i64 = raw
        .parse()
        .map_err(|_| PredictorError::validation("rank", format!("'{}' is not a number", raw)))?;

    if value <= 0 {
        return Err(PredictorError::validation("rank", "must be a positive integer"));
    }

    u32::try_from(value).map_err(|_| PredictorError::validation("rank", "is too large"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(rank: Option<&str>) -> QueryForm {
        QueryForm {
            rank: rank.map(str::to_string),
            category: " OPEN ".to_string(),
            quota: "AI".to_string(),
            gender: "Gender-Neutral".to_string(),
            round: "6".to_string(),
            year: 2024,
            authority: "JoSAA".to_string(),
            state: Some("   ".to_string()),
        }
    }

    #[test]
    fn test_parse_rank() {
        assert_eq!(parse_rank(Some(" 1520 ")).unwrap(), 1520);
        assert!(parse_rank(None).unwrap_err().is_validation());
        assert!(parse_rank(Some("")).unwrap_err().is_validation());
        assert!(parse_rank(Some("abc")).unwrap_err().is_validation());
        assert!(parse_rank(Some("0")).unwrap_err().is_validation());
        assert!(parse_rank(Some("-4")).unwrap_err().is_validation());
        assert!(parse_rank(Some("12.5")).unwrap_err().is_validation());
    }

    #[test]
    fn test_form_into_query() {
        let query = form(Some("150")).into_query().unwrap();
        assert_eq!(query.rank, 150);
        assert_eq!(query.category, "OPEN");
        assert_eq!(query.quota, Quota::AI);
        assert_eq!(query.round, Round::Numbered(6));
        assert_eq!(query.state, None);
    }

    #[test]
    fn test_zero_rank_query_is_invalid() {
        let mut query = form(Some("10")).into_query().unwrap();
        query.rank = 0;
        assert!(query.validate().unwrap_err().is_validation());
    }
}
