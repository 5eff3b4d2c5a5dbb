use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::models::JobRecord;

/// Mutex-guarded accumulation buffer for one batch's records.
///
/// Cloning yields another handle to the same buffer. Every [`append`](Self::append)
/// pushes one whole record while holding the lock, so concurrent appends never
/// interleave. Order is completion order, not input order.
#[derive(Debug, Clone, Default)]
pub struct ResultAggregator {
    records: Arc<Mutex<Vec<JobRecord>>>,
}

impl ResultAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&self, record: JobRecord) {
        self.lock().push(record);
    }

    /// Current contents. Only meaningful once every producer has finished.
    pub fn snapshot(&self) -> Vec<JobRecord> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // A push cannot leave the vector half-written, so a poisoned lock is still consistent.
    fn lock(&self) -> MutexGuard<'_, Vec<JobRecord>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
