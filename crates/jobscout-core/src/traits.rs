use std::future::Future;

use crate::error::AppError;
use crate::models::JobRecord;

/// Fetches the raw bytes of a document.
///
/// One attempt per call: implementations must not retry, and must release
/// any connection they hold before returning.
pub trait Fetcher: Send + Sync + Clone {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<Vec<u8>, AppError>> + Send;
}

/// Extracts a [`JobRecord`] from a fetched document.
///
/// Implementations carry their own extraction schema and must be pure:
/// the same bytes always produce the same record. A field whose target is
/// missing is left empty; only an unparseable document is an error.
pub trait Extractor: Send + Sync + Clone {
    fn extract(&self, document: &[u8], source_url: &str) -> Result<JobRecord, AppError>;
}
