use utoipa::OpenApi;

use crate::api::handlers::HealthResponse;
use crate::errors::{ErrorKind, ErrorResponse};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Agent Backend",
        version = "0.1.0",
        description = "Backend for the multi-agent content service. Every failure is returned as an ErrorResponse whose `error` field is one of the ErrorKind tags.",
    ),
    paths(
        crate::api::handlers::health,
    ),
    components(
        schemas(
            HealthResponse,
            ErrorResponse,
            ErrorKind,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
    )
)]
pub struct ApiDoc;
