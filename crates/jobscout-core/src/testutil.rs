//! Test utilities: mock implementations of the core traits.
//!
//! Handwritten mocks for dependency injection in unit tests. Shared state
//! lives behind `Arc` so clones handed to workers record into the same place.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::error::AppError;
use crate::models::JobRecord;
use crate::pool::{PoolEvent, PoolReporter};
use crate::traits::{Extractor, Fetcher};

// ---------------------------------------------------------------------------
// MockFetcher
// ---------------------------------------------------------------------------

/// Mock fetcher serving canned documents per URL.
///
/// Unknown URLs fail with `HTTP 404`. Tracks how many fetches are in flight
/// at once so tests can assert the pool bound.
#[derive(Clone, Default)]
pub struct MockFetcher {
    pages: Arc<HashMap<String, Result<Vec<u8>, String>>>,
    delay: Duration,
    vary_delay: bool,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
    calls: Arc<Mutex<Vec<String>>>,
    panic_on: Option<String>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, url: &str, body: impl Into<Vec<u8>>) -> Self {
        Arc::make_mut(&mut self.pages).insert(url.to_string(), Ok(body.into()));
        self
    }

    /// Make `url` fail like a transport error.
    pub fn with_failure(mut self, url: &str, message: &str) -> Self {
        Arc::make_mut(&mut self.pages).insert(url.to_string(), Err(message.to_string()));
        self
    }

    /// Panic when fetching `url`, killing the worker that holds it.
    pub fn panicking_on(mut self, url: &str) -> Self {
        self.panic_on = Some(url.to_string());
        self
    }

    /// Sleep this long inside every fetch.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Scale the delay by a per-URL factor (1x–4x) to shuffle completion order.
    pub fn with_varied_delay(mut self, base: Duration) -> Self {
        self.delay = base;
        self.vary_delay = true;
        self
    }

    /// Highest number of fetches observed running at the same time.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    /// URLs fetched so far, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn delay_for(&self, url: &str) -> Duration {
        if !self.vary_delay {
            return self.delay;
        }
        let factor = url.bytes().map(u32::from).sum::<u32>() % 4 + 1;
        self.delay * factor
    }
}

impl Fetcher for MockFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, AppError> {
        self.calls.lock().unwrap().push(url.to_string());
        if self.panic_on.as_deref() == Some(url) {
            panic!("fetcher blew up on {url}");
        }

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let delay = self.delay_for(url);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        match self.pages.get(url) {
            Some(Ok(body)) => Ok(body.clone()),
            Some(Err(message)) => Err(AppError::NetworkError(message.clone())),
            None => Err(AppError::HttpError(format!("HTTP 404 for {url}"))),
        }
    }
}

// ---------------------------------------------------------------------------
// MockExtractor
// ---------------------------------------------------------------------------

/// Build a mock document understood by [`MockExtractor`].
pub fn page(title: &str, location: &str, company: &str) -> String {
    format!("{title}|{location}|{company}")
}

/// Mock extractor reading `title|location|company` documents.
///
/// Missing segments become empty fields. Invalid UTF-8 is a parse error.
#[derive(Clone, Default)]
pub struct MockExtractor {
    panic_on: Option<String>,
}

impl MockExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Panic when extracting the document of `url`.
    pub fn panicking_on(url: &str) -> Self {
        Self {
            panic_on: Some(url.to_string()),
        }
    }
}

impl Extractor for MockExtractor {
    fn extract(&self, document: &[u8], source_url: &str) -> Result<JobRecord, AppError> {
        if self.panic_on.as_deref() == Some(source_url) {
            panic!("extractor blew up on {source_url}");
        }

        let text = std::str::from_utf8(document)
            .map_err(|e| AppError::ParseError(format!("invalid UTF-8: {e}")))?;
        let mut parts = text.split('|');

        let mut record = JobRecord::new(source_url);
        record.title = parts.next().unwrap_or_default().to_string();
        record.location = parts.next().unwrap_or_default().to_string();
        record.company = parts.next().unwrap_or_default().to_string();
        Ok(record)
    }
}

// ---------------------------------------------------------------------------
// MockReporter
// ---------------------------------------------------------------------------

/// Mock pool reporter that records event labels.
#[derive(Default)]
pub struct MockReporter {
    pub events: Mutex<Vec<String>>,
}

impl MockReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, label: &str) -> usize {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.as_str() == label)
            .count()
    }
}

impl PoolReporter for MockReporter {
    fn report(&self, event: PoolEvent<'_>) {
        let label = match &event {
            PoolEvent::WorkerStarted { .. } => "WorkerStarted",
            PoolEvent::UrlStarted { .. } => "UrlStarted",
            PoolEvent::RecordAppended { .. } => "RecordAppended",
            PoolEvent::UrlFailed { .. } => "UrlFailed",
            PoolEvent::WorkerStopped { .. } => "WorkerStopped",
        };
        self.events.lock().unwrap().push(label.to_string());
    }
}

// ---------------------------------------------------------------------------
// Test helpers
// ---------------------------------------------------------------------------

/// `n` distinct URLs under `https://site/`.
pub fn urls(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("https://site/{i}")).collect()
}

/// A fetcher serving a full job page for every URL in `urls`.
pub fn fetcher_for(urls: &[String]) -> MockFetcher {
    urls.iter().fold(MockFetcher::new(), |fetcher, url| {
        fetcher.with_page(url, page(&format!("Job {url}"), "Remote", "Acme"))
    })
}
