pub mod aggregator;
pub mod batch;
pub mod config;
pub mod error;
pub mod models;
pub mod pool;
pub mod queue;
pub mod schema;
pub mod traits;

#[cfg(test)]
mod testutil;

pub use aggregator::ResultAggregator;
pub use batch::BatchProcessor;
pub use config::PipelineConfig;
pub use error::AppError;
pub use models::{BatchOutcome, JobRecord, RecordField, UrlFailure};
pub use pool::{PoolEvent, PoolReporter, TracingPoolReporter};
pub use schema::{ExtractionSchema, FieldSelector};
pub use traits::{Extractor, Fetcher};
