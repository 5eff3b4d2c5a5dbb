use jobscout_client::{ReqwestFetcher, SelectorExtractor};
use jobscout_core::{AppError, BatchProcessor, ExtractionSchema};

use crate::config::ServerConfig;

pub type JobProcessor = BatchProcessor<ReqwestFetcher, SelectorExtractor>;

/// Shared application state, available to all route handlers via `State<Arc<AppState>>`.
///
/// Holds only read-only configuration; every request builds its own worker pool.
pub struct AppState {
    pub processor: JobProcessor,
    pub schema_name: String,
}

impl AppState {
    /// Load the schema and build the fetch/extract pipeline.
    pub fn from_config(config: &ServerConfig) -> Result<Self, AppError> {
        let schema = match &config.schema_path {
            Some(path) => ExtractionSchema::from_file(path)?,
            None => ExtractionSchema::indeed(),
        };
        let extractor = SelectorExtractor::new(&schema)?;

        let fetcher = ReqwestFetcher::with_timeout(config.fetch_timeout)?;
        let fetcher = if config.allow_private_urls {
            fetcher.allow_private_urls()?
        } else {
            fetcher
        };

        Ok(Self {
            processor: BatchProcessor::new(fetcher, extractor, config.pipeline.clone()),
            schema_name: schema.name,
        })
    }
}
