//! HTTP mapping for ledger errors.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use crate::error::LedgerError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("authentication required")]
    Unauthenticated,

    /// Body that could not be parsed into the expected JSON shape.
    #[error("{message}")]
    Body { status: StatusCode, message: String },
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: &'static str,
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Body {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ApiError::Ledger(err) => match err {
                LedgerError::InvalidInput(_) => (StatusCode::BAD_REQUEST, "INVALID_INPUT"),
                LedgerError::DuplicateEmail => (StatusCode::CONFLICT, "DUPLICATE_EMAIL"),
                LedgerError::DuplicateName(_) => (StatusCode::CONFLICT, "DUPLICATE_NAME"),
                LedgerError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "INVALID_CREDENTIALS"),
                LedgerError::NotFound => (StatusCode::NOT_FOUND, "NOT_FOUND"),
                LedgerError::CategoryNotFound(_) => (StatusCode::NOT_FOUND, "CATEGORY_NOT_FOUND"),
                LedgerError::CategoryOwnershipMismatch(_) => {
                    (StatusCode::FORBIDDEN, "CATEGORY_OWNERSHIP_MISMATCH")
                }
                LedgerError::StoreUnavailable(_) => {
                    (StatusCode::SERVICE_UNAVAILABLE, "STORE_UNAVAILABLE")
                }
            },
            ApiError::Unauthenticated => (StatusCode::UNAUTHORIZED, "UNAUTHENTICATED"),
            ApiError::Body { status, .. } => (*status, "INVALID_INPUT"),
        };

        // store details stay in the log
        let error = match &self {
            ApiError::Ledger(LedgerError::StoreUnavailable(cause)) => {
                tracing::error!(error = %cause, "store failure while handling request");
                "service temporarily unavailable".to_string()
            }
            other => other.to_string(),
        };

        (status, Json(ErrorResponse { error, code })).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
