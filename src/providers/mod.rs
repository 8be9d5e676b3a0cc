pub mod http;
pub mod json_dir;
pub mod memory;

use async_trait::async_trait;
use crate::core::{CutoffRecord, DatasetKey};
use crate::error::Result;

pub use http::HttpProvider;
pub use json_dir::JsonDirectoryProvider;
pub use memory::InMemoryProvider;

/// Trait for cutoff dataset sources (local files, remote API, in-memory)
#[async_trait]
pub trait CutoffProvider: Send + Sync {
    /// Fetch the dataset for `key`. `Ok(None)` means the source has no such dataset.
    async fn fetch(&self, key: &DatasetKey) -> Result<Option<Vec<CutoffRecord>>>;

    /// Get provider name
    fn name(&self) -> &str;
}

/// Drop records whose rank band is malformed (`opening_rank == 0` or `opening_rank > closing_rank`)
pub fn admit_records(provider: &str, records: Vec<CutoffRecord>) -> Vec<CutoffRecord> {
    let total = records.len();
    let admitted: Vec<CutoffRecord> = records
        .into_iter()
        .filter(|record| {
            let valid = record.has_valid_band();
            if !valid {
                tracing::warn!(
                    "Provider {} rejected {}: band {}-{}",
                    provider,
                    record.display_name(),
                    record.opening_rank,
                    record.closing_rank
                );
            }
            valid
        })
        .collect();

    if admitted.len() < total {
        tracing::warn!("Provider {} rejected {} of {} records", provider, total - admitted.len(), total);
    }
    admitted
}
