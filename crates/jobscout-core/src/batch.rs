use std::sync::Arc;

use crate::aggregator::ResultAggregator;
use crate::config::PipelineConfig;
use crate::error::AppError;
use crate::models::{BatchOutcome, JobRecord, UrlFailure};
use crate::pool::{PoolReporter, TracingPoolReporter, WorkerPool};
use crate::queue::WorkQueue;
use crate::traits::{Extractor, Fetcher};

/// Runs one batch of URLs through the fetch → extract pipeline.
///
/// Generic over the fetcher and extractor so tests can inject fakes. Each
/// [`process`](Self::process) call builds its own queue, aggregator and
/// worker set, so concurrent calls share nothing mutable.
pub struct BatchProcessor<F, E>
where
    F: Fetcher,
    E: Extractor,
{
    fetcher: F,
    extractor: E,
    config: PipelineConfig,
    reporter: Arc<dyn PoolReporter>,
}

impl<F, E> BatchProcessor<F, E>
where
    F: Fetcher + 'static,
    E: Extractor + 'static,
{
    pub fn new(fetcher: F, extractor: E, config: PipelineConfig) -> Self {
        Self {
            fetcher,
            extractor,
            config,
            reporter: Arc::new(TracingPoolReporter),
        }
    }

    /// Replace the default tracing reporter.
    pub fn with_reporter(mut self, reporter: Arc<dyn PoolReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Fetch and extract every URL, returning once all workers have stopped.
    ///
    /// URLs whose fetch or parse fails are left out of `records` and listed
    /// in `failures`. Only a pool startup failure fails the call.
    pub async fn process(&self, urls: Vec<String>) -> Result<BatchOutcome, AppError> {
        let submitted = urls.len();
        tracing::info!(
            submitted,
            pool_size = self.config.pool_size,
            "Processing batch"
        );

        let (queue, consumer) = WorkQueue::bounded(self.config.queue_capacity);
        let aggregator = ResultAggregator::new();
        let pool = WorkerPool::start(
            self.config.pool_size,
            consumer,
            aggregator.clone(),
            self.fetcher.clone(),
            self.extractor.clone(),
            Arc::clone(&self.reporter),
        )?;

        // Only fails if every worker died, leaving nobody to take the rest.
        let mut unsent = Vec::new();
        let mut pending = urls.into_iter();
        while let Some(url) = pending.next() {
            if queue.push(url.clone()).await.is_err() {
                unsent.push(url);
                unsent.extend(pending.by_ref());
                tracing::error!(
                    unsent = unsent.len(),
                    "All workers stopped before the batch was enqueued"
                );
                break;
            }
        }
        queue.close();

        let report = pool.wait().await;

        let mut failures = report.failures;
        failures.extend(unsent.into_iter().map(|url| UrlFailure {
            url,
            error: "worker pool stopped before the URL was processed".to_string(),
        }));
        let records = aggregator.snapshot();

        tracing::info!(
            submitted,
            records = records.len(),
            failed = failures.len(),
            panicked = report.workers_panicked,
            "Batch complete"
        );

        Ok(BatchOutcome {
            records,
            failures,
            submitted,
        })
    }

    /// [`process`](Self::process), keeping only the records.
    pub async fn process_records(&self, urls: Vec<String>) -> Result<Vec<JobRecord>, AppError> {
        Ok(self.process(urls).await?.records)
    }
}
