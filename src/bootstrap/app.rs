use axum::{Router, http::StatusCode, middleware};
use harbor_core::{filter::exception_filter, interceptor::logging_interceptor};

use super::cors::cors_layer;
use crate::docs;

/// Every controller route lives under this prefix.
pub const GLOBAL_PREFIX: &str = "/api/v1";

/// Builds the HTTP application around controller routes whose state is already applied.
///
/// Layers, outermost first: CORS, request logging, exception filter. Request
/// bodies are validated by the `ValidatedJson` extractor in each handler.
pub fn application(routes: Router, openapi: utoipa::openapi::OpenApi) -> Router {
    Router::new()
        .nest(GLOBAL_PREFIX, routes)
        .merge(docs::swagger_ui(openapi))
        .fallback(not_found)
        .layer(middleware::from_fn(exception_filter))
        .layer(middleware::from_fn(logging_interceptor))
        .layer(cors_layer())
}

async fn not_found() -> StatusCode {
    StatusCode::NOT_FOUND
}
