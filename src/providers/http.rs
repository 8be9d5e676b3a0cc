use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;

use crate::core::{CutoffRecord, DatasetKey};
use crate::error::{PredictorError, Result};
use crate::providers::{admit_records, CutoffProvider};

/// Remote cutoff store serving normalized datasets as JSON arrays at
/// `GET <base>/<authority>/<year>/<round>`
pub struct HttpProvider {
    client: Client,
    base_url: String,
}

impl HttpProvider {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn dataset_url(&self, key: &DatasetKey) -> String {
        format!(
            "{}/{}/{}/{}",
            self.base_url,
            urlencoding::encode(key.authority.trim()),
            key.year,
            urlencoding::encode(&key.round.to_string())
        )
    }

    fn provider_error(&self, message: String) -> PredictorError {
        PredictorError::Provider {
            provider: self.name().to_string(),
            message,
        }
    }
}

#[async_trait]
impl CutoffProvider for HttpProvider {
    async fn fetch(&self, key: &DatasetKey) -> Result<Option<Vec<CutoffRecord>>> {
        let url = self.dataset_url(key);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| self.provider_error(format!("Request failed: {}", e)))?;

        if response.status() == StatusCode::NOT_FOUND {
            tracing::debug!("No dataset at {}", url);
            return Ok(None);
        }

        if !response.status().is_success() {
            return Err(self.provider_error(format!("HTTP {}", response.status())));
        }

        let records: Vec<CutoffRecord> = response
            .json()
            .await
            .map_err(|e| self.provider_error(format!("Invalid JSON: {}", e)))?;

        Ok(Some(admit_records(self.name(), records)))
    }

    fn name(&self) -> &str {
        "http"
    }
}
