use axum::{
    Json,
    body,
    extract::Request,
    http::{Method, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::response::{ErrorBody, ErrorMessage, reason};

/// Error bodies larger than this are not echoed back as the message.
const MAX_ERROR_BODY: usize = 16 * 1024;

/// Rewrites every 4xx/5xx response into the [`ErrorBody`] envelope.
///
/// Responses produced by [`crate::HttpException`] keep their message; plain
/// rejections from axum contribute their text body; empty responses get a
/// generic message derived from the status.
pub async fn exception_filter(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_owned();

    let response = next.run(request).await;
    let status = response.status();
    if !status.is_client_error() && !status.is_server_error() {
        return response;
    }

    let (mut parts, original) = response.into_parts();
    let mut error = match parts.extensions.remove::<ErrorBody>() {
        Some(error) => error,
        None => {
            let text = match body::to_bytes(original, MAX_ERROR_BODY).await {
                Ok(bytes) => String::from_utf8_lossy(&bytes).trim().to_owned(),
                Err(_) => String::new(),
            };

            ErrorBody::new(status, fallback_message(status, &method, &path, text))
        }
    };

    error.status_code = status.as_u16();
    error.error = reason(status);
    error.timestamp = Some(chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true));
    error.path = Some(path);

    if status.is_server_error() {
        tracing::error!(%method, path = ?error.path, status = status.as_u16(), "request failed");
    } else {
        tracing::warn!(%method, path = ?error.path, status = status.as_u16(), message = ?error.message, "request rejected");
    }

    let mut filtered = Json(&error).into_response();
    *filtered.status_mut() = status;

    parts.headers.remove(header::CONTENT_TYPE);
    parts.headers.remove(header::CONTENT_LENGTH);
    filtered.headers_mut().extend(parts.headers);
    filtered.extensions_mut().insert(error);

    filtered
}

fn fallback_message(status: StatusCode, method: &Method, path: &str, text: String) -> ErrorMessage {
    if !text.is_empty() {
        return ErrorMessage::Single(text);
    }

    if status == StatusCode::NOT_FOUND {
        ErrorMessage::Single(format!("Cannot {method} {path}"))
    } else {
        ErrorMessage::Single(reason(status))
    }
}
