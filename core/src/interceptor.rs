use std::time::Instant;

use axum::{extract::Request, middleware::Next, response::Response};

/// Logs every request with its outcome and latency.
pub async fn logging_interceptor(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let started = Instant::now();

    tracing::debug!(%method, %uri, "incoming request");

    let response = next.run(request).await;

    tracing::info!(
        %method,
        %uri,
        status = response.status().as_u16(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "{} {} {}",
        method,
        uri.path(),
        response.status().as_u16(),
    );

    response
}

#[cfg(test)]
mod tests {
    use axum::{Router, body::Body, http::StatusCode, middleware, routing::get};
    use tower::ServiceExt;

    use super::*;
    use axum::http::Request;

    #[tokio::test]
    async fn response_is_returned_untouched() {
        let app = Router::new()
            .route("/created", get(|| async { (StatusCode::CREATED, "made") }))
            .layer(middleware::from_fn(logging_interceptor));

        let response = app
            .oneshot(Request::get("/created").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
    }
}
