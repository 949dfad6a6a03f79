use axum::http::{HeaderName, Method, header};
use tower_http::cors::{AllowOrigin, CorsLayer};

pub const ALLOWED_METHODS: [Method; 6] = [
    Method::GET,
    Method::POST,
    Method::PUT,
    Method::DELETE,
    Method::PATCH,
    Method::OPTIONS,
];

const X_REQUESTED_WITH: HeaderName = HeaderName::from_static("x-requested-with");
const BEARER: HeaderName = HeaderName::from_static("bearer");

pub const ALLOWED_HEADERS: [HeaderName; 6] = [
    header::ORIGIN,
    X_REQUESTED_WITH,
    header::CONTENT_TYPE,
    header::ACCEPT,
    header::AUTHORIZATION,
    BEARER,
];

/// Any origin, a fixed method and header allow-list, never credentials.
///
/// A wildcard origin and credentialed requests cannot be combined, so
/// `allow_credentials` stays off.
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::any())
        .allow_methods(ALLOWED_METHODS)
        .allow_headers(ALLOWED_HEADERS)
        .allow_credentials(false)
}
