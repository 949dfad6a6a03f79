use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::response::{ErrorBody, ErrorMessage};

/// Errors a handler or extractor can turn into an HTTP response.
///
/// The response carries the resolved [`ErrorBody`] as an extension so the
/// exception filter can complete it with the request path and timestamp.
#[derive(Debug, Error)]
pub enum HttpException {
    #[error("{0}")]
    BadRequest(String),

    #[error("validation failed: {}", .0.join(", "))]
    Validation(Vec<String>),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    UnsupportedMediaType(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl HttpException {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) | Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The client-facing message. Internal errors never expose their cause.
    pub fn message(&self) -> ErrorMessage {
        match self {
            Self::Validation(messages) => ErrorMessage::List(messages.clone()),
            Self::Internal(_) => ErrorMessage::Single("Internal server error".to_owned()),
            other => ErrorMessage::Single(other.to_string()),
        }
    }

    pub fn body(&self) -> ErrorBody {
        ErrorBody::new(self.status(), self.message())
    }
}

impl IntoResponse for HttpException {
    fn into_response(self) -> Response {
        if let Self::Internal(err) = &self {
            tracing::error!("internal error: {:?}", err);
        }

        let body = self.body();
        let mut response = body.clone().into_response();
        response.extensions_mut().insert(body);
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn internal_errors_hide_their_cause() {
        let err = HttpException::Internal(anyhow::anyhow!("db password rejected"));

        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            err.message(),
            ErrorMessage::Single("Internal server error".to_owned())
        );
    }

    #[test]
    fn validation_errors_keep_every_message() {
        let err = HttpException::Validation(vec!["a".into(), "b".into()]);
        let body = err.body();

        assert_eq!(body.status_code, 400);
        assert_eq!(body.error, "Bad Request");
        assert_eq!(body.message, ErrorMessage::List(vec!["a".into(), "b".into()]));
    }

    #[test]
    fn response_carries_body_extension() {
        let response = HttpException::NotFound("no such user".into()).into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = response.extensions().get::<ErrorBody>().unwrap();
        assert_eq!(body.message, ErrorMessage::Single("no such user".into()));
    }
}
