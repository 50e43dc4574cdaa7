//! API error taxonomy and its HTTP mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use greenledger_core::{EntryId, EntryValidationError, FieldViolation, RepoError};
use log::{error, warn};
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

const STORAGE_FAILURE_MESSAGE: &str = "internal storage error";

pub type ApiResult<T> = Result<T, ApiError>;

/// Errors surfaced to HTTP clients.
#[derive(Debug)]
pub enum ApiError {
    /// Target entry id does not exist.
    NotFound(EntryId),
    /// One or more field rules failed.
    Validation(EntryValidationError),
    /// Request could not be decoded (body or path).
    BadRequest(String),
    /// Storage failure; details are logged, never returned.
    Storage(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Validation(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn category(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::Validation(_) => "validation",
            Self::BadRequest(_) => "bad_request",
            Self::Storage(_) => "storage",
        }
    }
}

impl Display for ApiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(id) => write!(f, "carbon entry not found: {id}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::BadRequest(message) => write!(f, "bad request: {message}"),
            Self::Storage(message) => write!(f, "storage failure: {message}"),
        }
    }
}

impl Error for ApiError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::NotFound(_) | Self::BadRequest(_) | Self::Storage(_) => None,
        }
    }
}

impl From<RepoError> for ApiError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::NotFound(id),
            RepoError::Validation(err) => Self::Validation(err),
            other => Self::Storage(other.to_string()),
        }
    }
}

#[derive(Serialize)]
struct ErrorEnvelope<'a> {
    error: ErrorBody<'a>,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    category: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    violations: Option<&'a [FieldViolation]>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let category = self.category();

        match &self {
            Self::Storage(details) => error!(
                "event=api_error module=api status=error category={category} error={details}"
            ),
            other => warn!("event=api_error module=api status=error category={category} error={other}"),
        }

        let (message, violations) = match &self {
            Self::Validation(err) => (
                "entry validation failed".to_string(),
                Some(err.violations.as_slice()),
            ),
            Self::Storage(_) => (STORAGE_FAILURE_MESSAGE.to_string(), None),
            other => (other.to_string(), None),
        };

        let body = ErrorEnvelope {
            error: ErrorBody {
                category,
                message,
                violations,
            },
        };
        (status, Json(body)).into_response()
    }
}
