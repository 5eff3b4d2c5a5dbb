use crate::error::AppError;

/// Number of concurrent workers per batch when not configured.
pub const DEFAULT_POOL_SIZE: usize = 10;

/// Configuration of the per-batch worker pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Number of workers started for every batch. Bounds in-flight fetches.
    pub pool_size: usize,
    /// Maximum number of URLs waiting in the work queue.
    pub queue_capacity: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::with_pool_size(DEFAULT_POOL_SIZE)
    }
}

impl PipelineConfig {
    /// Config with `pool_size` workers and a queue of the same capacity.
    pub fn with_pool_size(pool_size: usize) -> Self {
        Self {
            pool_size,
            queue_capacity: pool_size.max(1),
        }
    }

    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    /// Read configuration from environment variables.
    ///
    /// - `JOBSCOUT_POOL_SIZE` (optional, defaults to 10)
    /// - `JOBSCOUT_QUEUE_CAPACITY` (optional, defaults to the pool size)
    pub fn from_env() -> Result<Self, AppError> {
        let pool_size = positive_env("JOBSCOUT_POOL_SIZE")?.unwrap_or(DEFAULT_POOL_SIZE);
        let config = Self::with_pool_size(pool_size);

        Ok(match positive_env("JOBSCOUT_QUEUE_CAPACITY")? {
            Some(capacity) => config.with_queue_capacity(capacity),
            None => config,
        })
    }
}

/// Parse an optional environment variable as an integer of at least 1.
pub fn positive_env(name: &str) -> Result<Option<usize>, AppError> {
    match std::env::var(name) {
        Err(_) => Ok(None),
        Ok(raw) => parse_positive(name, &raw).map(Some),
    }
}

fn parse_positive(name: &str, raw: &str) -> Result<usize, AppError> {
    let parsed: usize = raw.trim().parse().map_err(|_| {
        AppError::ConfigError(format!(
            "Invalid {name} '{raw}': must be a positive integer"
        ))
    })?;
    if parsed == 0 {
        return Err(AppError::ConfigError(format!("{name} must be at least 1")));
    }
    Ok(parsed)
}

/// Parse an optional boolean environment variable (`1/0`, `true/false`, `yes/no`).
pub fn bool_env(name: &str) -> Result<Option<bool>, AppError> {
    let Ok(raw) = std::env::var(name) else {
        return Ok(None);
    };
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(Some(true)),
        "0" | "false" | "no" | "off" | "" => Ok(Some(false)),
        _ => Err(AppError::ConfigError(format!(
            "Invalid {name} '{raw}': expected true or false"
        ))),
    }
}
