use async_trait::async_trait;
use std::sync::Mutex;

use crate::error::{PredictorError, Result};
use crate::history::{HistoryBackend, HistoryEntry};

/// Process-local history backend
#[derive(Debug, Default)]
pub struct MemoryHistoryBackend {
    entries: Mutex<Vec<HistoryEntry>>,
}

impl MemoryHistoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn poisoned() -> PredictorError {
        PredictorError::HistoryStorage("memory backend lock poisoned".to_string())
    }
}

#[async_trait]
impl HistoryBackend for MemoryHistoryBackend {
    async fn load(&self) -> Result<Vec<HistoryEntry>> {
        let entries = self.entries.lock().map_err(|_| Self::poisoned())?;
        Ok(entries.clone())
    }

    async fn save(&self, entries: &[HistoryEntry]) -> Result<()> {
        let mut stored = self.entries.lock().map_err(|_| Self::poisoned())?;
        *stored = entries.to_vec();
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}
