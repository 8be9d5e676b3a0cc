//! Eligibility matching of cutoff records against a candidate query.
//!
//! National and state-scoped counselling flows differ only in which fields
//! take part in the comparison, so both are expressed as a list of
//! [`FieldMatcher`]s selected by [`AuthorityScope`].

use serde::{Deserialize, Serialize};

use crate::core::{tokens_equal, CutoffRecord, PredictionQuery};

/// How a counselling authority scopes its datasets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AuthorityScope {
    /// One dataset for the whole country (JoSAA, CSAB)
    National,
    /// Records carry a state and queries may narrow by it
    StateScoped,
}

/// A single eligibility condition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldMatcher {
    Category,
    Quota,
    Gender,
    /// `opening_rank <= rank <= closing_rank`
    RankBand,
    /// Only enforced when the query names a state
    State,
}

impl FieldMatcher {
    pub fn accepts(&self, query: &PredictionQuery, record: &CutoffRecord) -> bool {
        match self {
            FieldMatcher::Category => tokens_equal(&record.category, &query.category),
            FieldMatcher::Quota => record.quota == query.quota,
            FieldMatcher::Gender => record.gender == query.gender,
            FieldMatcher::RankBand => record.admits(query.rank),
            FieldMatcher::State => match (&query.state, &record.state) {
                (None, _) => true,
                (Some(wanted), Some(actual)) => tokens_equal(wanted, actual),
                (Some(_), None) => false,
            },
        }
    }
}

const NATIONAL_FIELDS: &[FieldMatcher] = &[
    FieldMatcher::Category,
    FieldMatcher::Quota,
    FieldMatcher::Gender,
    FieldMatcher::RankBand,
];

const STATE_SCOPED_FIELDS: &[FieldMatcher] = &[
    FieldMatcher::Category,
    FieldMatcher::Quota,
    FieldMatcher::Gender,
    FieldMatcher::RankBand,
    FieldMatcher::State,
];

/// Filters records against a query; a record matches iff every field matcher accepts it
#[derive(Debug, Clone)]
pub struct EligibilityMatcher {
    fields: Vec<FieldMatcher>,
}

impl EligibilityMatcher {
    pub fn new(fields: Vec<FieldMatcher>) -> Self {
        Self { fields }
    }

    pub fn for_scope(scope: AuthorityScope) -> Self {
        let fields = match scope {
            AuthorityScope::National => NATIONAL_FIELDS,
            AuthorityScope::StateScoped => STATE_SCOPED_FIELDS,
        };
        Self::new(fields.to_vec())
    }

    pub fn fields(&self) -> &[FieldMatcher] {
        &self.fields
    }

    pub fn matches(&self, query: &PredictionQuery, record: &CutoffRecord) -> bool {
        self.fields.iter().all(|field| field.accepts(query, record))
    }

    /// Matching records in input order. No match is an empty vector, never an error.
    pub fn match_records<'a>(
        &self,
        query: &PredictionQuery,
        records: &'a [CutoffRecord],
    ) -> Vec<&'a CutoffRecord> {
        let matched: Vec<&CutoffRecord> = records
            .iter()
            .filter(|record| self.matches(query, record))
            .collect();

        tracing::debug!(
            "Matched {} of {} records for rank {}",
            matched.len(),
            records.len(),
            query.rank
        );

        matched
    }
}
