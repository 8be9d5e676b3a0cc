//! Bounded, deduplicated prediction history.
//!
//! [`PredictionHistory`] owns the eviction and dedup policy and knows nothing
//! about storage. [`HistoryStore`] pairs it with a [`HistoryBackend`] and
//! applies every mutation as one locked read-modify-write.

pub mod memory;
pub mod sqlite;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use std::num::NonZeroUsize;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::core::PredictionQuery;
use crate::error::{PredictorError, Result};

pub use memory::MemoryHistoryBackend;
pub use sqlite::SqliteHistoryBackend;

/// Trait for history persistence implementations
#[async_trait]
pub trait HistoryBackend: Send + Sync {
    /// Load persisted entries, most recent first
    async fn load(&self) -> Result<Vec<HistoryEntry>>;

    /// Replace the persisted snapshot
    async fn save(&self, entries: &[HistoryEntry]) -> Result<()>;

    /// Get backend name for logging
    fn name(&self) -> &str;
}

/// One past search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub query: PredictionQuery,
    pub result_count: usize,
    pub timestamp: DateTime<Utc>,
}

impl HistoryEntry {
    pub fn display(&self) -> String {
        format!(
            "{} -> {} results ({})",
            self.query.display(),
            self.result_count,
            self.timestamp.format("%Y-%m-%d %H:%M:%S")
        )
    }
}

/// Built-in dedup key policies
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HistoryKey {
    /// category + gender + quota (+ state): two searches differing only by rank collide
    #[default]
    ExcludeRank,
    /// rank + category + gender + quota (+ state)
    IncludeRank,
}

impl HistoryKey {
    pub fn key(&self, query: &PredictionQuery) -> String {
        let mut key = format!(
            "{}|{:?}|{}",
            query.category.trim().to_lowercase(),
            query.gender,
            query.quota.code()
        );
        if let Some(state) = &query.state {
            key.push('|');
            key.push_str(&state.trim().to_lowercase());
        }
        match self {
            HistoryKey::ExcludeRank => key,
            HistoryKey::IncludeRank => format!("{}|{}", query.rank, key),
        }
    }

    pub fn into_fn(self) -> KeyFn {
        Arc::new(move |query: &PredictionQuery| self.key(query))
    }
}

/// Caller-supplied dedup key function
pub type KeyFn = Arc<dyn Fn(&PredictionQuery) -> String + Send + Sync>;

/// Most-recent-first list of at most `capacity` entries, unique by key
#[derive(Clone)]
pub struct PredictionHistory {
    entries: VecDeque<HistoryEntry>,
    capacity: NonZeroUsize,
    key_fn: KeyFn,
}

impl fmt::Debug for PredictionHistory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PredictionHistory")
            .field("entries", &self.entries)
            .field("capacity", &self.capacity)
            .finish_non_exhaustive()
    }
}

impl PredictionHistory {
    pub fn new(capacity: NonZeroUsize, key: HistoryKey) -> Self {
        Self::with_key_fn(capacity, key.into_fn())
    }

    pub fn with_key_fn(capacity: NonZeroUsize, key_fn: KeyFn) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity.get()),
            capacity,
            key_fn,
        }
    }

    /// Rebuild from persisted entries, keeping first occurrences up to capacity
    pub fn from_entries(entries: Vec<HistoryEntry>, capacity: NonZeroUsize, key_fn: KeyFn) -> Self {
        let mut history = Self::with_key_fn(capacity, key_fn);
        for entry in entries {
            if history.entries.len() == capacity.get() {
                break;
            }
            if !history.contains_key(&(history.key_fn)(&entry.query)) {
                history.entries.push_back(entry);
            }
        }
        history
    }

    fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|e| (self.key_fn)(&e.query) == key)
    }

    /// Prepend unless a same-key entry exists (first write wins). Returns whether it was added.
    pub fn record(&mut self, query: PredictionQuery, result_count: usize, timestamp: DateTime<Utc>) -> bool {
        let key = (self.key_fn)(&query);
        if self.contains_key(&key) {
            return false;
        }
        self.entries.push_front(HistoryEntry {
            query,
            result_count,
            timestamp,
        });
        self.entries.truncate(self.capacity.get());
        true
    }

    pub fn delete(&mut self, index: usize) -> Result<HistoryEntry> {
        let len = self.entries.len();
        self.entries
            .remove(index)
            .ok_or(PredictorError::HistoryIndex { index, len })
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Stored query snapshot for re-running
    pub fn reuse(&self, index: usize) -> Result<PredictionQuery> {
        self.entries
            .get(index)
            .map(|e| e.query.clone())
            .ok_or(PredictorError::HistoryIndex {
                index,
                len: self.entries.len(),
            })
    }

    pub fn entries(&self) -> Vec<HistoryEntry> {
        self.entries.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity.get()
    }
}

/// History bound to a persistence backend. Mutations are serialized and a
/// failed save leaves the in-memory history untouched.
pub struct HistoryStore {
    state: Mutex<PredictionHistory>,
    backend: Arc<dyn HistoryBackend>,
    capacity: NonZeroUsize,
}

impl HistoryStore {
    /// Load persisted history from `backend`
    pub async fn open(backend: Arc<dyn HistoryBackend>, capacity: NonZeroUsize, key_fn: KeyFn) -> Result<Self> {
        let entries = backend.load().await?;
        tracing::debug!("Loaded {} history entries from {}", entries.len(), backend.name());

        Ok(Self {
            state: Mutex::new(PredictionHistory::from_entries(entries, capacity, key_fn)),
            backend,
            capacity,
        })
    }

    /// Unpersisted history
    pub fn in_memory(capacity: NonZeroUsize, key: HistoryKey) -> Self {
        Self {
            state: Mutex::new(PredictionHistory::new(capacity, key)),
            backend: Arc::new(MemoryHistoryBackend::new()),
            capacity,
        }
    }

    pub fn capacity(&self) -> NonZeroUsize {
        self.capacity
    }

    /// Apply `op` to a copy, persist it, then commit
    async fn mutate<T>(&self, op: impl FnOnce(&mut PredictionHistory) -> Result<(T, bool)>) -> Result<T> {
        let mut state = self.state.lock().await;
        let mut next = state.clone();
        let (value, changed) = op(&mut next)?;
        if changed {
            self.backend.save(&next.entries()).await?;
            *state = next;
        }
        Ok(value)
    }

    pub async fn record(&self, query: &PredictionQuery, result_count: usize) -> Result<bool> {
        let query = query.clone();
        let added = self
            .mutate(|history| {
                let added = history.record(query, result_count, Utc::now());
                Ok((added, added))
            })
            .await?;

        if added {
            tracing::info!("Recorded history entry ({} results)", result_count);
        } else {
            tracing::debug!("Duplicate history entry skipped");
        }
        Ok(added)
    }

    pub async fn delete(&self, index: usize) -> Result<HistoryEntry> {
        self.mutate(|history| history.delete(index).map(|entry| (entry, true)))
            .await
    }

    pub async fn clear(&self) -> Result<()> {
        self.mutate(|history| {
            let changed = !history.is_empty();
            history.clear();
            Ok(((), changed))
        })
        .await
    }

    pub async fn reuse(&self, index: usize) -> Result<PredictionQuery> {
        self.state.lock().await.reuse(index)
    }

    pub async fn entries(&self) -> Vec<HistoryEntry> {
        self.state.lock().await.entries()
    }

    pub async fn len(&self) -> usize {
        self.state.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Gender, Quota, Round};

    fn query(rank: u32, category: &str) -> PredictionQuery {
        PredictionQuery {
            rank,
            category: category.to_string(),
            quota: Quota::HS,
            gender: Gender::GenderNeutral,
            round: Round::Numbered(1),
            year: 2024,
            authority: "JoSAA".to_string(),
            state: None,
        }
    }

    fn capacity() -> NonZeroUsize {
        NonZeroUsize::new(5).unwrap()
    }

    #[test]
    fn test_bounded_most_recent_first() {
        let mut history = PredictionHistory::new(capacity(), HistoryKey::ExcludeRank);
        for (i, category) in ["OPEN", "EWS", "OBC-NCL", "SC", "ST", "OPEN (PwD)"].iter().enumerate() {
            assert!(history.record(query(100 + i as u32, category), i, Utc::now()));
        }

        assert_eq!(history.len(), 5);
        let categories: Vec<String> = history.entries().into_iter().map(|e| e.query.category).collect();
        assert_eq!(categories, vec!["OPEN (PwD)", "ST", "SC", "OBC-NCL", "EWS"]);
    }

    #[test]
    fn test_duplicate_is_first_write_wins() {
        let mut history = PredictionHistory::new(capacity(), HistoryKey::ExcludeRank);
        history.record(query(150, "OPEN"), 3, Utc::now());
        history.record(query(400, "EWS"), 1, Utc::now());

        assert!(!history.record(query(151, " open "), 9, Utc::now()));
        assert_eq!(history.len(), 2);
        assert_eq!(history.reuse(1).unwrap().rank, 150);
        assert_eq!(history.entries()[1].result_count, 3);
    }

    #[test]
    fn test_rank_inclusive_key() {
        let mut history = PredictionHistory::new(capacity(), HistoryKey::IncludeRank);
        assert!(history.record(query(150, "OPEN"), 3, Utc::now()));
        assert!(history.record(query(151, "OPEN"), 3, Utc::now()));
        assert!(!history.record(query(151, "OPEN"), 3, Utc::now()));
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn test_state_participates_in_key() {
        let key = HistoryKey::ExcludeRank;
        let mut a = query(10, "OPEN");
        let mut b = query(10, "OPEN");
        a.state = Some("Uttar Pradesh".to_string());
        b.state = Some("Bihar".to_string());
        assert_ne!(key.key(&a), key.key(&b));
    }

    #[test]
    fn test_custom_key_fn() {
        let by_authority: KeyFn = Arc::new(|q: &PredictionQuery| q.authority.to_lowercase());
        let mut history = PredictionHistory::with_key_fn(capacity(), by_authority);
        assert!(history.record(query(1, "OPEN"), 0, Utc::now()));
        assert!(!history.record(query(2, "EWS"), 0, Utc::now()));
    }

    #[test]
    fn test_delete_and_reuse_bounds() {
        let mut history = PredictionHistory::new(capacity(), HistoryKey::ExcludeRank);
        history.record(query(150, "OPEN"), 3, Utc::now());

        let err = history.delete(4).unwrap_err();
        assert!(err.is_history_index());
        assert!(history.reuse(1).unwrap_err().is_history_index());
        assert_eq!(history.len(), 1);

        let removed = history.delete(0).unwrap();
        assert_eq!(removed.query.rank, 150);
        assert!(history.is_empty());
    }

    #[test]
    fn test_from_entries_truncates_and_dedups() {
        let entries: Vec<HistoryEntry> = ["OPEN", "OPEN", "EWS", "SC", "ST", "OBC-NCL", "PWD"]
            .iter()
            .map(|c| HistoryEntry {
                query: query(1, c),
                result_count: 0,
                timestamp: Utc::now(),
            })
            .collect();

        let history = PredictionHistory::from_entries(entries, capacity(), HistoryKey::ExcludeRank.into_fn());
        assert_eq!(history.len(), 5);
        assert_eq!(history.entries()[1].query.category, "EWS");
    }

    #[tokio::test]
    async fn test_store_clear_and_delete() {
        let store = HistoryStore::in_memory(capacity(), HistoryKey::ExcludeRank);
        store.record(&query(1, "OPEN"), 2).await.unwrap();
        store.record(&query(2, "EWS"), 0).await.unwrap();

        assert!(store.delete(9).await.unwrap_err().is_history_index());
        assert_eq!(store.len().await, 2);

        store.delete(0).await.unwrap();
        assert_eq!(store.reuse(0).await.unwrap().category, "OPEN");

        store.clear().await.unwrap();
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test]
    async fn test_store_persists_through_backend() {
        let backend = Arc::new(MemoryHistoryBackend::new());
        let store = HistoryStore::open(backend.clone(), capacity(), HistoryKey::ExcludeRank.into_fn())
            .await
            .unwrap();
        store.record(&query(1, "OPEN"), 2).await.unwrap();

        let reopened = HistoryStore::open(backend, capacity(), HistoryKey::ExcludeRank.into_fn())
            .await
            .unwrap();
        assert_eq!(reopened.entries().await.len(), 1);
    }

    struct ReadOnlyBackend {
        seed: Vec<HistoryEntry>,
    }

    #[async_trait]
    impl HistoryBackend for ReadOnlyBackend {
        async fn load(&self) -> Result<Vec<HistoryEntry>> {
            Ok(self.seed.clone())
        }

        async fn save(&self, _entries: &[HistoryEntry]) -> Result<()> {
            Err(PredictorError::HistoryStorage("disk full".to_string()))
        }

        fn name(&self) -> &str {
            "read-only"
        }
    }

    #[tokio::test]
    async fn test_failed_save_leaves_history_untouched() {
        let seed = vec![
            HistoryEntry { query: query(10, "OPEN"), result_count: 2, timestamp: Utc::now() },
            HistoryEntry { query: query(20, "EWS"), result_count: 0, timestamp: Utc::now() },
        ];
        let backend = Arc::new(ReadOnlyBackend { seed: seed.clone() });
        let store = HistoryStore::open(backend, capacity(), HistoryKey::ExcludeRank.into_fn())
            .await
            .unwrap();

        let err = store.record(&query(30, "SC"), 1).await.unwrap_err();
        assert!(matches!(err, PredictorError::HistoryStorage(_)));
        assert!(store.delete(0).await.is_err());
        assert!(store.clear().await.is_err());

        assert_eq!(store.len().await, 2);
        assert_eq!(store.entries().await, seed);
    }

    #[tokio::test]
    async fn test_concurrent_records_are_not_lost() {
        let store = Arc::new(HistoryStore::in_memory(capacity(), HistoryKey::ExcludeRank));
        let mut handles = Vec::new();
        for category in ["OPEN", "EWS", "SC"] {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.record(&query(10, category), 1).await.unwrap()
            }));
        }
        for handle in handles {
            assert!(handle.await.unwrap());
        }
        assert_eq!(store.len().await, 3);
    }
}
