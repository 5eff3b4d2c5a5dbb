use thiserror::Error;

/// Application-wide error types for Jobscout.
#[derive(Error, Debug)]
pub enum AppError {
    /// HTTP request failed or returned a non-success status.
    #[error("HTTP error: {0}")]
    HttpError(String),

    /// Network/connection error.
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Request timed out.
    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    /// Fetched document could not be parsed into a queryable tree.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Extraction schema is malformed (bad file, unknown field, invalid selector).
    #[error("Schema error: {0}")]
    SchemaError(String),

    /// Invalid configuration value.
    #[error("Config error: {0}")]
    ConfigError(String),

    /// The worker pool could not be started with the configured size.
    #[error("Worker pool startup failed: {0}")]
    PoolStartup(String),

    /// An item was pushed after the work queue was closed.
    #[error("Work queue is closed")]
    QueueClosed,

    /// JSON serialization/deserialization failed.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl AppError {
    /// Returns true if this error only affects a single URL of a batch.
    ///
    /// Per-URL failures drop that URL's record; everything else fails the
    /// batch (or the process, at startup).
    pub fn is_per_url(&self) -> bool {
        matches!(
            self,
            AppError::HttpError(_)
                | AppError::NetworkError(_)
                | AppError::Timeout(_)
                | AppError::ParseError(_)
        )
    }
}
