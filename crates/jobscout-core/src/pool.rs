use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::task::JoinSet;

use crate::aggregator::ResultAggregator;
use crate::error::AppError;
use crate::models::{JobRecord, UrlFailure};
use crate::queue::QueueConsumer;
use crate::traits::{Extractor, Fetcher};

/// Events emitted by pool workers for monitoring/logging.
#[derive(Debug, Clone)]
pub enum PoolEvent<'a> {
    WorkerStarted {
        worker_id: usize,
    },
    UrlStarted {
        worker_id: usize,
        url: &'a str,
    },
    RecordAppended {
        worker_id: usize,
        url: &'a str,
    },
    UrlFailed {
        worker_id: usize,
        url: &'a str,
        error: &'a str,
    },
    WorkerStopped {
        worker_id: usize,
        processed: usize,
    },
}

/// Trait for receiving pool events (decoupled logging).
pub trait PoolReporter: Send + Sync {
    fn report(&self, event: PoolEvent<'_>) {
        let _ = event;
    }
}

/// Reporter that uses the `tracing` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingPoolReporter;

impl PoolReporter for TracingPoolReporter {
    fn report(&self, event: PoolEvent<'_>) {
        match event {
            PoolEvent::WorkerStarted { worker_id } => {
                tracing::debug!(%worker_id, "Worker started");
            }
            PoolEvent::UrlStarted { worker_id, url } => {
                tracing::debug!(%worker_id, %url, "Fetching");
            }
            PoolEvent::RecordAppended { worker_id, url } => {
                tracing::debug!(%worker_id, %url, "Record extracted");
            }
            PoolEvent::UrlFailed {
                worker_id,
                url,
                error,
            } => {
                tracing::warn!(%worker_id, %url, %error, "Dropping URL");
            }
            PoolEvent::WorkerStopped {
                worker_id,
                processed,
            } => {
                tracing::debug!(%worker_id, %processed, "Worker stopped");
            }
        }
    }
}

/// What one worker did before the queue ran dry.
#[derive(Debug, Default)]
struct WorkerSummary {
    processed: usize,
    appended: usize,
    failures: Vec<UrlFailure>,
}

/// Result of waiting on the completion barrier.
#[derive(Debug, Default)]
pub struct PoolReport {
    pub workers_started: usize,
    /// Workers that ended by panicking. Their in-progress URL is lost.
    pub workers_panicked: usize,
    pub processed: usize,
    pub appended: usize,
    pub failures: Vec<UrlFailure>,
}

/// URL a worker is currently processing, if any. Left set when it dies.
type InProgress = Arc<Mutex<Option<String>>>;

fn lock_slot(slot: &InProgress) -> MutexGuard<'_, Option<String>> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Fixed-size pool of workers draining one batch's queue.
pub struct WorkerPool;

impl WorkerPool {
    /// Start exactly `pool_size` workers on the current tokio runtime.
    ///
    /// Each worker takes URLs from `consumer` until the queue is closed and
    /// drained, fetching, extracting, and appending each record to
    /// `aggregator`. Fails with [`AppError::PoolStartup`] if `pool_size` is
    /// zero or there is no runtime to run the workers on; in that case no
    /// worker is started.
    pub fn start<F, E>(
        pool_size: usize,
        consumer: QueueConsumer,
        aggregator: ResultAggregator,
        fetcher: F,
        extractor: E,
        reporter: Arc<dyn PoolReporter>,
    ) -> Result<PoolHandle, AppError>
    where
        F: Fetcher + 'static,
        E: Extractor + 'static,
    {
        if pool_size == 0 {
            return Err(AppError::PoolStartup(
                "pool size must be at least 1".to_string(),
            ));
        }
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| AppError::PoolStartup(format!("no tokio runtime available: {e}")))?;

        let mut tasks = JoinSet::new();
        let mut in_progress = Vec::with_capacity(pool_size);
        for worker_id in 0..pool_size {
            let current = InProgress::default();
            in_progress.push(Arc::clone(&current));
            let worker = Worker {
                id: worker_id,
                consumer: consumer.clone(),
                aggregator: aggregator.clone(),
                fetcher: fetcher.clone(),
                extractor: extractor.clone(),
                reporter: Arc::clone(&reporter),
                current,
            };
            tasks.spawn_on(worker.run(), &runtime);
        }

        Ok(PoolHandle {
            tasks,
            started: pool_size,
            in_progress,
        })
    }
}

/// Completion barrier of a started pool.
pub struct PoolHandle {
    tasks: JoinSet<WorkerSummary>,
    started: usize,
    in_progress: Vec<InProgress>,
}

impl PoolHandle {
    pub fn workers_started(&self) -> usize {
        self.started
    }

    /// Wait until every started worker has terminated.
    ///
    /// Resolves only after the queue has been closed and drained (or every
    /// worker has died). A panicking worker is counted, never propagated,
    /// and the URL it was holding is reported as a failure.
    pub async fn wait(mut self) -> PoolReport {
        let mut report = PoolReport {
            workers_started: self.started,
            ..PoolReport::default()
        };

        while let Some(joined) = self.tasks.join_next().await {
            match joined {
                Ok(summary) => {
                    report.processed += summary.processed;
                    report.appended += summary.appended;
                    report.failures.extend(summary.failures);
                }
                Err(e) => {
                    tracing::error!(error = %e, "Worker terminated abnormally");
                    report.workers_panicked += 1;
                }
            }
        }

        // Every worker has stopped, so any URL still held belongs to a dead one.
        for slot in &self.in_progress {
            if let Some(url) = lock_slot(slot).take() {
                report.failures.push(UrlFailure {
                    url,
                    error: "worker terminated while processing the URL".to_string(),
                });
            }
        }

        report
    }
}

struct Worker<F, E> {
    id: usize,
    consumer: QueueConsumer,
    aggregator: ResultAggregator,
    fetcher: F,
    extractor: E,
    reporter: Arc<dyn PoolReporter>,
    current: InProgress,
}

impl<F, E> Worker<F, E>
where
    F: Fetcher,
    E: Extractor + 'static,
{
    async fn run(self) -> WorkerSummary {
        self.reporter.report(PoolEvent::WorkerStarted { worker_id: self.id });

        let mut summary = WorkerSummary::default();
        while let Some(url) = self.consumer.next().await {
            summary.processed += 1;
            *lock_slot(&self.current) = Some(url.clone());
            self.reporter.report(PoolEvent::UrlStarted {
                worker_id: self.id,
                url: &url,
            });

            match self.fetch_and_extract(&url).await {
                Ok(record) => {
                    self.aggregator.append(record);
                    summary.appended += 1;
                    self.reporter.report(PoolEvent::RecordAppended {
                        worker_id: self.id,
                        url: &url,
                    });
                }
                Err(e) => {
                    let error = e.to_string();
                    self.reporter.report(PoolEvent::UrlFailed {
                        worker_id: self.id,
                        url: &url,
                        error: &error,
                    });
                    summary.failures.push(UrlFailure { url, error });
                }
            }
            *lock_slot(&self.current) = None;
        }

        self.reporter.report(PoolEvent::WorkerStopped {
            worker_id: self.id,
            processed: summary.processed,
        });
        summary
    }

    async fn fetch_and_extract(&self, url: &str) -> Result<JobRecord, AppError> {
        let document = self.fetcher.fetch(url).await?;

        // HTML parsing is CPU-bound; keep it off the async worker threads.
        let extractor = self.extractor.clone();
        let source_url = url.to_string();
        let mut record = tokio::task::spawn_blocking(move || {
            extractor.extract(&document, &source_url)
        })
        .await
        .map_err(|e| AppError::ParseError(format!("Extraction of {url} aborted: {e}")))??;
        // The record always belongs to the URL that produced it.
        record.source_url = url.to_string();
        Ok(record)
    }
}
