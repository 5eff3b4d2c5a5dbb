use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Jobscout API",
        version = "0.1.0",
        description = "Batch job posting scraper: POST a list of URLs, get back title, location and company for each."
    ),
    paths(crate::routes::get_jobs, crate::routes::health),
    components(schemas(
        crate::dto::JobResponse,
        crate::dto::HealthResponse,
        crate::dto::ErrorResponse,
    )),
    tags(
        (name = "jobs", description = "Batch job posting extraction"),
        (name = "system", description = "Health and system status"),
    )
)]
pub struct ApiDoc;
