use serde::Serialize;

use jobscout_core::JobRecord;

// ---------------------------------------------------------------------------
// Jobs
// ---------------------------------------------------------------------------

/// One extracted job posting. Fields whose markup was missing are empty strings.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct JobResponse {
    pub title: String,
    pub location: String,
    pub company: String,
    /// The URL the record was extracted from.
    pub url: String,
}

impl From<JobRecord> for JobResponse {
    fn from(record: JobRecord) -> Self {
        Self {
            title: record.title,
            location: record.location,
            company: record.company,
            url: record.source_url,
        }
    }
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct HealthResponse {
    pub status: &'static str,
    pub pool_size: usize,
    pub schema: String,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}
