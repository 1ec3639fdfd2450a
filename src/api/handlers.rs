use axum::{
    extract::State,
    http::{header, StatusCode, Uri},
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use std::any::Any;
use std::sync::Arc;
use std::time::Instant;
use tracing::error;
use utoipa::ToSchema;

use crate::config::Config;
use crate::errors::{AppError, ErrorKind};

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub config: Config,
    pub started_at: Instant,
}

impl AppStateInner {
    pub fn new(config: Config) -> AppState {
        Arc::new(Self {
            config,
            started_at: Instant::now(),
        })
    }
}

/// Health check response
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Always "healthy" when the service answers
    pub status: String,
    pub service: String,
    pub version: String,
    /// Deployment environment (development, test, production)
    pub environment: String,
    pub instance_id: String,
    pub uptime_seconds: u64,
}

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    )
)]
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        environment: state.config.environment.to_string(),
        instance_id: state.config.server.instance_id.clone(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
    })
}

/// Fallback for requests that match no route
pub async fn route_not_found(uri: Uri) -> AppError {
    AppError::new(ErrorKind::NotFound).with_detail("path", uri.path())
}

/// Replaces axum's empty 405 with a `METHOD_NOT_ALLOWED` body.
///
/// Responses that already carry a content type were rendered by a handler and
/// pass through untouched. The `Allow` header is kept and echoed in details.
pub async fn render_method_not_allowed(response: Response) -> Response {
    if response.status() != StatusCode::METHOD_NOT_ALLOWED
        || response.headers().contains_key(header::CONTENT_TYPE)
    {
        return response;
    }

    let allow = response.headers().get(header::ALLOW).cloned();

    let mut err = AppError::new(ErrorKind::MethodNotAllowed);
    if let Some(methods) = allow.as_ref().and_then(|v| v.to_str().ok()) {
        err = err.with_detail("allow", methods);
    }

    let mut rendered = err.into_response();
    if let Some(value) = allow {
        rendered.headers_mut().insert(header::ALLOW, value);
    }
    rendered
}

/// Renders a handler panic as `INTERNAL_ERROR`; the payload is only logged
pub fn handle_panic(payload: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic payload".to_string()
    };

    error!(panic = %detail, "Handler panicked");

    AppError::new(ErrorKind::Internal).into_response()
}
