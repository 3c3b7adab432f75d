//! HTTP error taxonomy and response mapping.
//!
//! Every error renders as `{"error": "<message>"}`; conflicts also carry the
//! id of the existing word.

use axum::extract::rejection::QueryRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use lexicon_core::{RepoError, ServiceError, WordId};
use log::error;
use serde::Serialize;
use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum ApiError {
    Unauthorized,
    MethodNotAllowed,
    /// Request body is not valid JSON.
    InvalidBody,
    Validation(String),
    NotFound(String),
    Conflict(WordId),
    /// Backend call failed; message is surfaced verbatim.
    Storage(String),
    /// Any fault outside the taxonomy above.
    Unexpected,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::InvalidBody | Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Storage(_) | Self::Unexpected => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl Display for ApiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unauthorized => write!(f, "unauthorized"),
            Self::MethodNotAllowed => write!(f, "method not allowed"),
            Self::InvalidBody => write!(f, "invalid JSON body"),
            Self::Validation(message) | Self::NotFound(message) | Self::Storage(message) => {
                write!(f, "{message}")
            }
            Self::Conflict(_) => write!(f, "already exists"),
            Self::Unexpected => write!(f, "unexpected error"),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<ServiceError> for ApiError {
    fn from(value: ServiceError) -> Self {
        match value {
            ServiceError::Validation(err) => Self::Validation(err.to_string()),
            ServiceError::NotFound(_) => Self::NotFound("word not found".to_string()),
            ServiceError::Conflict(id) => Self::Conflict(id),
            ServiceError::Storage(err) => Self::Storage(err.to_string()),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<WordId>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(
                "event=http_error module=http status=error http_status={} error={}",
                status.as_u16(),
                self
            );
        }

        let id = match &self {
            Self::Conflict(id) => Some(*id),
            _ => None,
        };
        let body = ErrorBody {
            error: self.to_string(),
            id,
        };
        (status, Json(body)).into_response()
    }
}

/// Fallback for unsupported methods on a known route.
pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

impl From<RepoError> for ApiError {
    fn from(value: RepoError) -> Self {
        ServiceError::from(value).into()
    }
}

impl From<QueryRejection> for ApiError {
    fn from(value: QueryRejection) -> Self {
        Self::Validation(value.body_text())
    }
}
