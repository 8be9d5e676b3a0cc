use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::core::{CutoffRecord, DatasetKey};
use crate::error::{PredictorError, Result};
use crate::providers::{admit_records, CutoffProvider};

/// Normalized datasets on disk, one JSON array per file:
/// `<root>/<authority>/<year>/round-<round>.json`
pub struct JsonDirectoryProvider {
    root: PathBuf,
}

impl JsonDirectoryProvider {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Candidate paths: authority as given, then lowercased.
    /// The authority must be a single plain path segment.
    fn dataset_paths(&self, key: &DatasetKey) -> Result<Vec<PathBuf>> {
        let authority = key.authority.trim();
        if authority.is_empty() || authority.contains(['/', '\\']) || authority.contains("..") {
            return Err(PredictorError::validation(
                "authority",
                format!("'{}' is not a valid dataset directory name", authority),
            ));
        }

        let file = format!("round-{}.json", key.round);
        let mut paths = vec![self.root.join(authority).join(key.year.to_string()).join(&file)];
        let lowered = authority.to_lowercase();
        if lowered != authority {
            paths.push(self.root.join(lowered).join(key.year.to_string()).join(&file));
        }
        Ok(paths)
    }
}

#[async_trait]
impl CutoffProvider for JsonDirectoryProvider {
    async fn fetch(&self, key: &DatasetKey) -> Result<Option<Vec<CutoffRecord>>> {
        for path in self.dataset_paths(key)? {
            let raw = match tokio::fs::read_to_string(&path).await {
                Ok(raw) => raw,
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => return Err(PredictorError::Io(e)),
            };

            let records: Vec<CutoffRecord> = serde_json::from_str(&raw).map_err(|e| PredictorError::Provider {
                provider: self.name().to_string(),
                message: format!("{}: {}", path.display(), e),
            })?;

            tracing::debug!("Loaded {} records from {}", records.len(), path.display());
            return Ok(Some(admit_records(self.name(), records)));
        }

        Ok(None)
    }

    fn name(&self) -> &str {
        "json-dir"
    }
}
