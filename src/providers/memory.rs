use async_trait::async_trait;
use std::collections::HashMap;

use crate::core::{CutoffRecord, DatasetKey};
use crate::error::Result;
use crate::providers::{admit_records, CutoffProvider};

/// Datasets held in process memory, keyed by (authority, year, round)
#[derive(Debug, Default)]
pub struct InMemoryProvider {
    datasets: HashMap<DatasetKey, Vec<CutoffRecord>>,
}

impl InMemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a dataset. Malformed bands are rejected here.
    pub fn insert(&mut self, key: DatasetKey, records: Vec<CutoffRecord>) {
        let records = admit_records(self.name(), records);
        self.datasets.insert(key.normalized(), records);
    }

    pub fn with_dataset(mut self, key: DatasetKey, records: Vec<CutoffRecord>) -> Self {
        self.insert(key, records);
        self
    }

    pub fn dataset_count(&self) -> usize {
        self.datasets.len()
    }
}

#[async_trait]
impl CutoffProvider for InMemoryProvider {
    async fn fetch(&self, key: &DatasetKey) -> Result<Option<Vec<CutoffRecord>>> {
        Ok(self.datasets.get(&key.normalized()).cloned())
    }

    fn name(&self) -> &str {
        "memory"
    }
}
