//! Error responses.
//!
//! # Responsibilities
//! - Map service errors to HTTP status codes
//! - Render every error as `{"error": "<message>"}`

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::transaction::TransactionError;

/// Error returned from handlers.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

/// HTTP status for a service error.
pub fn status_for(err: &TransactionError) -> StatusCode {
    match err {
        TransactionError::Validation(_) => StatusCode::BAD_REQUEST,
        TransactionError::NotFound => StatusCode::NOT_FOUND,
        TransactionError::Conflict => StatusCode::CONFLICT,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<TransactionError> for ApiError {
    fn from(err: TransactionError) -> Self {
        Self::new(status_for(&err), err.to_string())
    }
}

/// Any body that cannot be decoded into the request type is a 422.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorBody { error: &self.message })).into_response()
    }
}
