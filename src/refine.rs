//! Free-text narrowing of an already ranked result set.

use serde::{Deserialize, Serialize};

use crate::core::PredictionResult;

/// Optional institute/program substrings, AND-combined
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefineFilter {
    pub institute: Option<String>,
    pub program: Option<String>,
}

impl RefineFilter {
    pub fn new(institute: Option<&str>, program: Option<&str>) -> Self {
        Self {
            institute: normalize_term(institute),
            program: normalize_term(program),
        }
    }

    /// No active term
    pub fn is_empty(&self) -> bool {
        self.institute.is_none() && self.program.is_none()
    }

    pub fn matches(&self, result: &PredictionResult) -> bool {
        contains_term(&result.institute, self.institute.as_deref())
            && contains_term(&result.program, self.program.as_deref())
    }
}

/// Blank terms are absent; stored lowercased
fn normalize_term(term: Option<&str>) -> Option<String> {
    term.map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
}

fn contains_term(haystack: &str, term: Option<&str>) -> bool {
    match term {
        Some(term) => haystack.to_lowercase().contains(term),
        None => true,
    }
}

/// Keep results passing the filter, preserving order
pub fn refine(results: &[PredictionResult], filter: &RefineFilter) -> Vec<PredictionResult> {
    if filter.is_empty() {
        return results.to_vec();
    }
    results
        .iter()
        .filter(|result| filter.matches(result))
        .cloned()
        .collect()
}
