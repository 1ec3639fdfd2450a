use axum::{
    middleware,
    routing::get,
    Router,
};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::handlers::{
    handle_panic, health, render_method_not_allowed, route_not_found, AppState,
};
use super::middleware::logging_middleware;
use super::openapi::ApiDoc;
use crate::config::CorsOrigin;
use crate::metrics;

pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.server.cors_allow_origin);

    let router = Router::new()
        // Health check
        .route("/health", get(health))
        // Metrics endpoint (Prometheus)
        .route("/metrics", get(metrics::metrics_handler))
        // OpenAPI documentation
        .merge(SwaggerUi::new("/api-docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(state);

    with_error_boundary(router).layer(cors)
}

/// Wrap a router so that every failure leaves it as a structured error body.
///
/// Unknown routes render `NOT_FOUND`, unsupported methods render
/// `METHOD_NOT_ALLOWED`, panics render `INTERNAL_ERROR`, and handler errors
/// render through `AppError`'s `IntoResponse`.
pub fn with_error_boundary(router: Router) -> Router {
    // Order matters: rendering layers innermost so logging and metrics see the final status
    router
        .fallback(route_not_found)
        .layer(middleware::map_response(render_method_not_allowed))
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(middleware::from_fn(logging_middleware))
        .layer(middleware::from_fn(metrics::middleware::track_metrics))
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(allow_origin: &CorsOrigin) -> CorsLayer {
    let origin = match allow_origin {
        CorsOrigin::Any => AllowOrigin::from(Any),
        CorsOrigin::Exact(value) => AllowOrigin::exact(value.clone()),
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods(Any)
        .allow_headers(Any)
}
