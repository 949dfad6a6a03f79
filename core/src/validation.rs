//! Request body validation.
//!
//! [`ValidatedJson`] is the global validation stage: it transforms the JSON
//! body into its declared shape, refuses undeclared properties and then runs
//! the shape's own constraints. Shapes opt in through [`Dto`], normally via
//! `#[harbor_macros::dto]`, which also turns on `deny_unknown_fields`.

use std::ops::Deref;

use axum::{
    Json,
    extract::{FromRequest, Request, rejection::JsonRejection},
};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::HttpException;

/// Constraint violations collected while validating a body.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ValidationErrors(Vec<String>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, message: impl Into<String>) {
        self.0.push(message.into());
    }

    /// Records `message` unless `condition` holds.
    pub fn check(&mut self, condition: bool, message: impl Into<String>) -> &mut Self {
        if !condition {
            self.add(message);
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn messages(&self) -> &[String] {
        &self.0
    }

    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl From<ValidationErrors> for HttpException {
    fn from(errors: ValidationErrors) -> Self {
        HttpException::Validation(errors.0)
    }
}

/// A request body shape.
pub trait Dto: DeserializeOwned + Send {
    fn validate(&self) -> Result<(), ValidationErrors> {
        Ok(())
    }
}

/// JSON body extractor that enforces the declared shape of `T`.
#[derive(Clone, Debug)]
pub struct ValidatedJson<T>(pub T);

impl<T> Deref for ValidatedJson<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    T: Dto,
    S: Send + Sync,
{
    type Rejection = HttpException;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(mut body) = Json::<Value>::from_request(req, state).await?;
        let mut errors = ValidationErrors::new();

        // Each pass strips the undeclared property serde stopped at, so every
        // one of them gets reported.
        let value = loop {
            let bytes = serde_json::to_vec(&body).map_err(anyhow::Error::from)?;

            match Json::<T>::from_bytes(&bytes) {
                Ok(Json(value)) => break value,
                Err(JsonRejection::JsonDataError(err)) => {
                    let text = err.body_text();
                    match undeclared_property(&text) {
                        Some(path) if remove_path(&mut body, &path) => {
                            errors.add(format!("property {} should not exist", path));
                        }
                        _ => {
                            errors.add(describe_data_error(&text));
                            return Err(errors.into());
                        }
                    }
                }
                Err(other) if errors.is_empty() => return Err(other.into()),
                Err(_) => return Err(errors.into()),
            }
        };

        errors.into_result()?;
        value.validate()?;

        Ok(ValidatedJson(value))
    }
}

impl From<JsonRejection> for HttpException {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::JsonDataError(err) => {
                HttpException::Validation(vec![describe_data_error(&err.body_text())])
            }
            JsonRejection::MissingJsonContentType(err) => {
                HttpException::UnsupportedMediaType(err.body_text())
            }
            other => HttpException::BadRequest(other.body_text()),
        }
    }
}

const DATA_ERROR_PREFIX: &str = "Failed to deserialize the JSON body into the target type: ";
const UNKNOWN_FIELD: &str = "unknown field `";

/// Turns a serde data error into a client-facing message.
///
/// Undeclared properties are reported as `property <path> should not exist`;
/// any other error keeps serde's wording without the axum preamble.
fn describe_data_error(text: &str) -> String {
    match undeclared_property(text) {
        Some(path) => format!("property {} should not exist", path),
        None => text.strip_prefix(DATA_ERROR_PREFIX).unwrap_or(text).to_owned(),
    }
}

/// Full path of the property an `unknown field` error points at.
fn undeclared_property(text: &str) -> Option<String> {
    let detail = text.strip_prefix(DATA_ERROR_PREFIX).unwrap_or(text);

    let start = detail.find(UNKNOWN_FIELD)?;
    let rest = &detail[start + UNKNOWN_FIELD.len()..];
    let field = &rest[..rest.find('`')?];

    let parent = detail[..start].trim_end_matches(|c: char| c == ':' || c.is_whitespace());
    let mut segments: Vec<&str> = if parent.is_empty()
        || parent == "."
        || parent.chars().any(char::is_whitespace)
    {
        Vec::new()
    } else {
        parent.split('.').filter(|s| !s.is_empty()).collect()
    };
    if segments.last() == Some(&field) {
        segments.pop();
    }
    segments.push(field);

    Some(segments.join("."))
}

enum Segment<'a> {
    Key(&'a str),
    Index(usize),
}

/// Removes the property at `path` (`address.zip`, `items[0].sku`) from
/// `body`. Returns `false` when nothing was removed.
fn remove_path(body: &mut Value, path: &str) -> bool {
    let mut segments = Vec::new();
    for part in path.split('.') {
        let (key, indexes) = match part.find('[') {
            Some(at) => part.split_at(at),
            None => (part, ""),
        };
        if !key.is_empty() {
            segments.push(Segment::Key(key));
        }
        for index in indexes.split('[').skip(1) {
            let Some(Ok(index)) = index.strip_suffix(']').map(str::parse::<usize>) else {
                return false;
            };
            segments.push(Segment::Index(index));
        }
    }

    let Some((Segment::Key(last), parents)) = segments.split_last() else {
        return false;
    };

    let mut node = body;
    for segment in parents {
        let next = match (segment, node) {
            (Segment::Key(key), Value::Object(map)) => map.get_mut(*key),
            (Segment::Index(index), Value::Array(items)) => items.get_mut(*index),
            _ => None,
        };
        match next {
            Some(next) => node = next,
            None => return false,
        }
    }

    match node {
        Value::Object(map) => map.remove(*last).is_some(),
        _ => false,
    }
}
