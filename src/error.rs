use thiserror::Error;

/// Main error type for the prediction engine
#[derive(Error, Debug)]
pub enum PredictorError {
    /// Query input rejected before matching (rank missing, non-numeric or non-positive)
    #[error("Invalid {field}: {message}")]
    Validation { field: String, message: String },

    /// Cutoff dataset could not be fetched or does not exist
    #[error("Cutoff data unavailable for {dataset}: {reason}")]
    DataUnavailable { dataset: String, reason: String },

    /// History delete/reuse with an out-of-range position
    #[error("History index {index} out of range (history holds {len} entries)")]
    HistoryIndex { index: usize, len: usize },

    /// Provider errors
    #[error("Provider '{provider}' error: {message}")]
    Provider { provider: String, message: String },

    /// History persistence errors
    #[error("History storage error: {0}")]
    HistoryStorage(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Database errors
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// HTTP request errors
    #[error("HTTP request failed: {0}")]
    HttpRequest(#[from] reqwest::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Filesystem errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PredictorError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        PredictorError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn data_unavailable(dataset: impl ToString, reason: impl Into<String>) -> Self {
        PredictorError::DataUnavailable {
            dataset: dataset.to_string(),
            reason: reason.into(),
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, PredictorError::Validation { .. })
    }

    pub fn is_data_unavailable(&self) -> bool {
        matches!(self, PredictorError::DataUnavailable { .. })
    }

    pub fn is_history_index(&self) -> bool {
        matches!(self, PredictorError::HistoryIndex { .. })
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, PredictorError>;
