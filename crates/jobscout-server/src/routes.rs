use std::sync::Arc;

use axum::Router;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::dto::{HealthResponse, JobResponse};
use crate::error::ApiError;
use crate::openapi::ApiDoc;
use crate::state::AppState;

/// Response header carrying the number of URLs dropped from the batch.
pub const FAILED_URLS_HEADER: &str = "x-failed-urls";

/// Build the full router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/get_jobs", post(get_jobs))
        .route("/health", get(health))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Jobs
// ---------------------------------------------------------------------------

#[utoipa::path(
    post,
    path = "/get_jobs",
    request_body = [String],
    responses(
        (
            status = 200,
            description = "Records of every URL that could be fetched and parsed, in no particular order",
            body = [JobResponse],
            headers(
                ("x-failed-urls" = usize, description = "Number of URLs dropped from the result")
            )
        ),
        (status = 400, description = "Malformed URL list"),
        (status = 500, description = "Worker pool could not start", body = crate::dto::ErrorResponse),
    ),
    tag = "jobs"
)]
pub async fn get_jobs(
    State(state): State<Arc<AppState>>,
    axum::Json(urls): axum::Json<Vec<String>>,
) -> Result<impl IntoResponse, ApiError> {
    let outcome = state.processor.process(urls).await?;

    let failed = outcome.failed_count().to_string();
    let records: Vec<JobResponse> = outcome.records.into_iter().map(JobResponse::from).collect();

    Ok(([(FAILED_URLS_HEADER, failed)], axum::Json(records)))
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
    ),
    tag = "system"
)]
pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    axum::Json(HealthResponse {
        status: "healthy",
        pool_size: state.processor.config().pool_size,
        schema: state.schema_name.clone(),
    })
}
