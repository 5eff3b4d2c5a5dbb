use std::path::PathBuf;
use std::time::Duration;

use jobscout_client::DEFAULT_FETCH_TIMEOUT;
use jobscout_core::AppError;
use jobscout_core::config::{PipelineConfig, bool_env, positive_env};

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub pipeline: PipelineConfig,
    pub fetch_timeout: Duration,
    /// Selector schema file; the built-in Indeed schema when unset.
    pub schema_path: Option<PathBuf>,
    pub allow_private_urls: bool,
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            pipeline: PipelineConfig::default(),
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            schema_path: None,
            allow_private_urls: false,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

impl ServerConfig {
    /// Read configuration from environment variables.
    ///
    /// - `JOBSCOUT_SERVER_PORT` (optional, defaults to 8080)
    /// - `JOBSCOUT_POOL_SIZE`, `JOBSCOUT_QUEUE_CAPACITY` (see [`PipelineConfig::from_env`])
    /// - `JOBSCOUT_FETCH_TIMEOUT_SECS` (optional, defaults to 30)
    /// - `JOBSCOUT_SCHEMA` (optional path to a selector schema file)
    /// - `JOBSCOUT_ALLOW_PRIVATE_URLS` (optional, defaults to false)
    /// - `JOBSCOUT_MAX_BODY_BYTES` (optional, defaults to 1 MiB)
    pub fn from_env() -> Result<Self, AppError> {
        let defaults = Self::default();

        let port = match std::env::var("JOBSCOUT_SERVER_PORT") {
            Err(_) => defaults.port,
            Ok(raw) => raw.trim().parse().map_err(|_| {
                AppError::ConfigError(format!(
                    "Invalid JOBSCOUT_SERVER_PORT '{raw}': must be a port number"
                ))
            })?,
        };

        let fetch_timeout = positive_env("JOBSCOUT_FETCH_TIMEOUT_SECS")?
            .map(|secs| Duration::from_secs(secs as u64))
            .unwrap_or(defaults.fetch_timeout);

        let schema_path = std::env::var("JOBSCOUT_SCHEMA")
            .ok()
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from);

        Ok(Self {
            port,
            pipeline: PipelineConfig::from_env()?,
            fetch_timeout,
            schema_path,
            allow_private_urls: bool_env("JOBSCOUT_ALLOW_PRIVATE_URLS")?.unwrap_or(false),
            max_body_bytes: positive_env("JOBSCOUT_MAX_BODY_BYTES")?
                .unwrap_or(defaults.max_body_bytes),
        })
    }
}
