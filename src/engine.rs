use std::sync::Arc;
use std::time::Instant;

use crate::config::PredictorConfig;
use crate::core::{
    ChanceBreakdown, CutoffRecord, DatasetKey, PredictionOutcome, PredictionQuery, PredictionResult,
    PredictionStatus, QueryForm,
};
use crate::error::{PredictorError, Result};
use crate::history::{HistoryBackend, HistoryEntry, HistoryStore};
use crate::matching::{AuthorityScope, EligibilityMatcher};
use crate::providers::CutoffProvider;
use crate::ranking::{ChanceThresholds, CutoffOrderRanker, Ranker};
use crate::view::ResultView;

/// Main prediction orchestrator
pub struct PredictionEngine {
    providers: Vec<Arc<dyn CutoffProvider>>,
    ranker: Arc<dyn Ranker>,
    history: HistoryStore,
    config: PredictorConfig,
}

impl PredictionEngine {
    /// Create engine with unpersisted history
    pub fn new(config: PredictorConfig) -> Result<Self> {
        let history = HistoryStore::in_memory(config.history_capacity, config.history_key);
        Self::with_history_store(config, history)
    }

    /// Create engine whose history is loaded from and saved to `backend`
    pub async fn with_history_backend(config: PredictorConfig, backend: Arc<dyn HistoryBackend>) -> Result<Self> {
        config.validate()?;
        let history = HistoryStore::open(backend, config.history_capacity, config.history_key.into_fn()).await?;
        Self::with_history_store(config, history)
    }

    /// Create engine around a prepared history store (e.g. with a custom dedup key).
    /// The store's capacity and dedup key take precedence over `config`, and
    /// `config.history_capacity` is updated to match.
    pub fn with_history_store(mut config: PredictorConfig, history: HistoryStore) -> Result<Self> {
        config.validate()?;
        if config.history_capacity != history.capacity() {
            tracing::debug!(
                "History store capacity {} overrides configured {}",
                history.capacity(),
                config.history_capacity
            );
            config.history_capacity = history.capacity();
        }

        Ok(Self {
            providers: Vec::new(),
            ranker: Arc::new(CutoffOrderRanker::new()),
            history,
            config,
        })
    }

    /// Add a dataset provider. Providers are consulted in registration order.
    pub fn add_provider(&mut self, provider: Arc<dyn CutoffProvider>) {
        self.providers.push(provider);
    }

    pub fn config(&self) -> &PredictorConfig {
        &self.config
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    /// First provider holding a non-empty dataset wins
    async fn fetch_dataset(&self, key: &DatasetKey) -> Result<(String, Vec<CutoffRecord>)> {
        if self.providers.is_empty() {
            return Err(PredictorError::data_unavailable(key, "no cutoff provider configured"));
        }

        let mut last_error = None;
        for provider in &self.providers {
            match provider.fetch(key).await {
                Ok(Some(records)) if records.is_empty() => {
                    tracing::debug!("Provider {} holds no records for {}", provider.name(), key);
                }
                Ok(Some(records)) => {
                    tracing::debug!("Provider {} returned {} records for {}", provider.name(), records.len(), key);
                    return Ok((provider.name().to_string(), records));
                }
                Ok(None) => {
                    tracing::debug!("Provider {} has no dataset for {}", provider.name(), key);
                }
                Err(e) => {
                    tracing::warn!("Provider {} failed: {}", provider.name(), e);
                    last_error = Some(e.to_string());
                }
            }
        }

        let reason = last_error.unwrap_or_else(|| "dataset not found".to_string());
        Err(PredictorError::data_unavailable(key, reason))
    }

    /// Validate, fetch, match, classify, rank and record one query
    pub async fn predict(&self, query: &PredictionQuery) -> Result<PredictionOutcome> {
        let start = Instant::now();

        query.validate()?;

        let key = query.dataset_key();
        let (provider, records) = self.fetch_dataset(&key).await?;

        let scope = self.config.scope_for(&query.authority);
        let results = build_predictions(query, &records, scope, &self.config.thresholds, self.ranker.as_ref());

        let status = if results.is_empty() {
            PredictionStatus::NoMatch
        } else {
            PredictionStatus::Matched
        };

        let recorded_in_history = match self.history.record(query, results.len()).await {
            Ok(added) => added,
            Err(e) => {
                tracing::warn!("Failed to save history: {}", e);
                false
            }
        };

        let latency_ms = start.elapsed().as_secs_f64() * 1000.0;

        let outcome = PredictionOutcome {
            query: query.clone(),
            status,
            total_matched: results.len(),
            breakdown: ChanceBreakdown::from_results(&results),
            results,
            recorded_in_history,
            provider,
            latency_ms,
        };

        tracing::info!("{}", outcome.display());
        Ok(outcome)
    }

    /// Validate raw form input, then predict
    pub async fn submit(&self, form: &QueryForm) -> Result<PredictionOutcome> {
        let query = form.into_query()?;
        self.predict(&query).await
    }

    /// Re-run the query stored at history position `index`
    pub async fn rerun(&self, index: usize) -> Result<PredictionOutcome> {
        let query = self.history.reuse(index).await?;
        self.predict(&query).await
    }

    /// Refinement/pagination view over an outcome's full result set
    pub fn view(&self, outcome: &PredictionOutcome) -> ResultView {
        ResultView::new(outcome.results.clone(), self.config.page_size)
    }

    pub async fn history_entries(&self) -> Vec<HistoryEntry> {
        self.history.entries().await
    }

    pub async fn delete_history(&self, index: usize) -> Result<HistoryEntry> {
        self.history.delete(index).await
    }

    pub async fn clear_history(&self) -> Result<()> {
        self.history.clear().await
    }

    pub fn ranking_method(&self) -> &str {
        self.ranker.name()
    }
}

/// Pure matching pipeline: match, classify, then order
pub fn build_predictions(
    query: &PredictionQuery,
    records: &[CutoffRecord],
    scope: AuthorityScope,
    thresholds: &ChanceThresholds,
    ranker: &dyn Ranker,
) -> Vec<PredictionResult> {
    let matcher = EligibilityMatcher::for_scope(scope);

    let mut results: Vec<PredictionResult> = matcher
        .match_records(query, records)
        .into_iter()
        .map(|record| {
            let chance = thresholds.classify(query.rank, record.opening_rank, record.closing_rank);
            PredictionResult::from_record(record, chance)
        })
        .collect();

    ranker.rank(&mut results);
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Chance, Gender, Quota, Round};
    use crate::providers::InMemoryProvider;
    use async_trait::async_trait;

    fn record(institute: &str, opening: u32, closing: u32) -> CutoffRecord {
        CutoffRecord {
            institute: institute.to_string(),
            program: "CS".to_string(),
            quota: Quota::AI,
            category: "OPEN".to_string(),
            gender: Gender::GenderNeutral,
            opening_rank: opening,
            closing_rank: closing,
            round: Round::Numbered(1),
            year: 2024,
            authority: "JoSAA".to_string(),
            state: None,
        }
    }

    fn query(rank: u32) -> PredictionQuery {
        PredictionQuery {
            rank,
            category: "OPEN".to_string(),
            quota: Quota::AI,
            gender: Gender::GenderNeutral,
            round: Round::Numbered(1),
            year: 2024,
            authority: "JoSAA".to_string(),
            state: None,
        }
    }

    struct FailingProvider;

    #[async_trait]
    impl CutoffProvider for FailingProvider {
        async fn fetch(&self, _key: &DatasetKey) -> Result<Option<Vec<CutoffRecord>>> {
            Err(PredictorError::Provider {
                provider: "failing".to_string(),
                message: "connection reset".to_string(),
            })
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    struct FailingBackend;

    #[async_trait]
    impl HistoryBackend for FailingBackend {
        async fn load(&self) -> Result<Vec<HistoryEntry>> {
            Ok(Vec::new())
        }

        async fn save(&self, _entries: &[HistoryEntry]) -> Result<()> {
            Err(PredictorError::HistoryStorage("disk full".to_string()))
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    fn engine_with(records: Vec<CutoffRecord>) -> PredictionEngine {
        let mut engine = PredictionEngine::new(PredictorConfig::default()).unwrap();
        let provider = InMemoryProvider::new().with_dataset(DatasetKey::new("JoSAA", 2024, Round::Numbered(1)), records);
        engine.add_provider(Arc::new(provider));
        engine
    }

    #[test]
    fn test_build_predictions_orders_and_classifies() {
        let records = vec![record("B", 100, 200), record("A", 20, 1000), record("C", 300, 500)];
        let results = build_predictions(
            &query(150),
            &records,
            AuthorityScope::National,
            &ChanceThresholds::default(),
            &CutoffOrderRanker::new(),
        );

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].institute, "A");
        assert_eq!(results[0].chance, Chance::High);
        assert_eq!(results[1].institute, "B");
        assert_eq!(results[1].chance, Chance::Medium);
    }

    #[tokio::test]
    async fn test_failing_provider_falls_through() {
        let mut engine = PredictionEngine::new(PredictorConfig::default()).unwrap();
        engine.add_provider(Arc::new(FailingProvider));
        let provider = InMemoryProvider::new()
            .with_dataset(DatasetKey::new("JoSAA", 2024, Round::Numbered(1)), vec![record("X", 1, 10)]);
        engine.add_provider(Arc::new(provider));

        let outcome = engine.predict(&query(5)).await.unwrap();
        assert_eq!(outcome.provider, "memory");
        assert_eq!(outcome.total_matched, 1);
    }

    #[tokio::test]
    async fn test_fetch_failure_skips_history() {
        let mut engine = PredictionEngine::new(PredictorConfig::default()).unwrap();
        engine.add_provider(Arc::new(FailingProvider));

        let err = engine.predict(&query(5)).await.unwrap_err();
        assert!(err.is_data_unavailable());
        assert!(err.to_string().contains("connection reset"));
        assert!(engine.history_entries().await.is_empty());
    }

    #[tokio::test]
    async fn test_no_provider_is_data_unavailable() {
        let engine = PredictionEngine::new(PredictorConfig::default()).unwrap();
        assert!(engine.predict(&query(5)).await.unwrap_err().is_data_unavailable());
    }

    #[tokio::test]
    async fn test_rerun_from_history() {
        let engine = engine_with(vec![record("X", 1, 10)]);
        engine.predict(&query(5)).await.unwrap();

        let outcome = engine.rerun(0).await.unwrap();
        assert_eq!(outcome.query.rank, 5);
        assert!(!outcome.recorded_in_history);

        assert!(engine.rerun(3).await.unwrap_err().is_history_index());
    }

    #[tokio::test]
    async fn test_empty_dataset_falls_through_to_next_provider() {
        let key = DatasetKey::new("JoSAA", 2024, Round::Numbered(1));
        let mut engine = PredictionEngine::new(PredictorConfig::default()).unwrap();
        engine.add_provider(Arc::new(InMemoryProvider::new().with_dataset(key.clone(), Vec::new())));

        let err = engine.predict(&query(5)).await.unwrap_err();
        assert!(err.is_data_unavailable());
        assert!(engine.history_entries().await.is_empty());

        let mut fallback = InMemoryProvider::new();
        fallback.insert(key, vec![record("X", 1, 10)]);
        engine.add_provider(Arc::new(fallback));

        let outcome = engine.predict(&query(5)).await.unwrap();
        assert_eq!(outcome.total_matched, 1);
    }

    #[tokio::test]
    async fn test_failed_history_save_is_not_fatal() {
        let store = HistoryStore::open(
            Arc::new(FailingBackend),
            PredictorConfig::default().history_capacity,
            crate::history::HistoryKey::ExcludeRank.into_fn(),
        )
        .await
        .unwrap();
        let mut engine = PredictionEngine::with_history_store(PredictorConfig::default(), store).unwrap();
        engine.add_provider(Arc::new(
            InMemoryProvider::new().with_dataset(DatasetKey::new("JoSAA", 2024, Round::Numbered(1)), vec![record("X", 1, 10)]),
        ));

        let outcome = engine.predict(&query(5)).await.unwrap();
        assert_eq!(outcome.status, PredictionStatus::Matched);
        assert!(!outcome.recorded_in_history);
        assert!(engine.history_entries().await.is_empty());
    }

    #[test]
    fn test_history_store_capacity_wins() {
        let capacity = std::num::NonZeroUsize::new(2).unwrap();
        let store = HistoryStore::in_memory(capacity, crate::history::HistoryKey::IncludeRank);
        let engine = PredictionEngine::with_history_store(PredictorConfig::default(), store).unwrap();
        assert_eq!(engine.config().history_capacity, capacity);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = PredictorConfig::default();
        config.thresholds = ChanceThresholds { high_below: 0.9, medium_below: 0.1 };
        assert!(PredictionEngine::new(config).is_err());
    }
}
