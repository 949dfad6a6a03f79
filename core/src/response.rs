use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::{Deserialize, Serialize};

/// `message` is a single string for most errors and a list for validation
/// failures.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(untagged)]
pub enum ErrorMessage {
    Single(String),
    List(Vec<String>),
}

impl From<String> for ErrorMessage {
    fn from(message: String) -> Self {
        ErrorMessage::Single(message)
    }
}

impl From<Vec<String>> for ErrorMessage {
    fn from(messages: Vec<String>) -> Self {
        ErrorMessage::List(messages)
    }
}

/// JSON envelope of every error response.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub status_code: u16,
    pub message: ErrorMessage,
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl ErrorBody {
    pub fn new(status: StatusCode, message: impl Into<ErrorMessage>) -> Self {
        ErrorBody {
            status_code: status.as_u16(),
            message: message.into(),
            error: reason(status),
            timestamp: None,
            path: None,
        }
    }

    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl IntoResponse for ErrorBody {
    fn into_response(self) -> axum::response::Response {
        (self.status(), Json(self)).into_response()
    }
}

pub(crate) fn reason(status: StatusCode) -> String {
    status
        .canonical_reason()
        .unwrap_or("Unknown Error")
        .to_owned()
}

/// Error responses any route may produce, for OpenAPI documentation.
#[derive(utoipa::IntoResponses)]
pub enum StandardErrors {
    #[response(status = 400, description = "Bad request or validation failure")]
    BadRequest(ErrorBody),

    #[response(status = 404, description = "Not found")]
    NotFound(ErrorBody),

    #[response(status = 500, description = "Internal server error")]
    InternalServerError(ErrorBody),
}
