use serde::{Deserialize, Serialize};
use std::env;
use std::num::NonZeroUsize;
use std::path::Path;
use std::str::FromStr;

use crate::error::{PredictorError, Result};
use crate::history::HistoryKey;
use crate::matching::AuthorityScope;
use crate::ranking::ChanceThresholds;

const DEFAULT_PAGE_SIZE: NonZeroUsize = match NonZeroUsize::new(5) {
    Some(n) => n,
    None => unreachable!(),
};
const DEFAULT_HISTORY_CAPACITY: NonZeroUsize = match NonZeroUsize::new(5) {
    Some(n) => n,
    None => unreachable!(),
};

fn default_state_authorities() -> Vec<String> {
    ["UPTAC", "MHT-CET", "WBJEE", "KCET"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PredictorConfig {
    pub page_size: NonZeroUsize,
    pub history_capacity: NonZeroUsize,
    pub thresholds: ChanceThresholds,
    pub history_key: HistoryKey,
    /// Authorities whose datasets are state-scoped; everything else is national
    pub state_authorities: Vec<String>,
}

impl Default for PredictorConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            thresholds: ChanceThresholds::default(),
            history_key: HistoryKey::default(),
            state_authorities: default_state_authorities(),
        }
    }
}

impl PredictorConfig {
    /// Defaults overridden by `PREDICTOR_*` environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Some(size) = env_parse::<usize>("PREDICTOR_PAGE_SIZE")? {
            config.page_size = non_zero("PREDICTOR_PAGE_SIZE", size)?;
        }
        if let Some(capacity) = env_parse::<usize>("PREDICTOR_HISTORY_CAPACITY")? {
            config.history_capacity = non_zero("PREDICTOR_HISTORY_CAPACITY", capacity)?;
        }
        if let Some(high) = env_parse::<f64>("PREDICTOR_HIGH_BELOW")? {
            config.thresholds.high_below = high;
        }
        if let Some(medium) = env_parse::<f64>("PREDICTOR_MEDIUM_BELOW")? {
            config.thresholds.medium_below = medium;
        }
        if let Ok(key) = env::var("PREDICTOR_HISTORY_KEY") {
            config.history_key = match key.trim().to_ascii_lowercase().as_str() {
                "exclude-rank" => HistoryKey::ExcludeRank,
                "include-rank" => HistoryKey::IncludeRank,
                other => {
                    return Err(PredictorError::Config(format!(
                        "PREDICTOR_HISTORY_KEY must be exclude-rank or include-rank, got '{}'",
                        other
                    )))
                }
            };
        }
        if let Ok(list) = env::var("PREDICTOR_STATE_AUTHORITIES") {
            config.state_authorities = list
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
        }

        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.thresholds.validate()
    }

    pub fn scope_for(&self, authority: &str) -> AuthorityScope {
        let authority = authority.trim();
        if self
            .state_authorities
            .iter()
            .any(|a| a.trim().eq_ignore_ascii_case(authority))
        {
            AuthorityScope::StateScoped
        } else {
            AuthorityScope::National
        }
    }
}

fn env_parse<T: FromStr>(name: &str) -> Result<Option<T>> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| PredictorError::Config(format!("{} has invalid value '{}'", name, raw))),
        Err(_) => Ok(None),
    }
}

fn non_zero(name: &str, value: usize) -> Result<NonZeroUsize> {
    NonZeroUsize::new(value).ok_or_else(|| PredictorError::Config(format!("{} must be greater than zero", name)))
}
