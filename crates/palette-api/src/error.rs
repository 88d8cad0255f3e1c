use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

use palette_core::{ExtractError, StreakError};
use palette_types::api::ErrorResponse;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    PayloadTooLarge(String),

    /// The image could not be fetched or decoded.
    #[error("{0}")]
    UnprocessableImage(String),

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl From<ExtractError> for ApiError {
    fn from(err: ExtractError) -> Self {
        match err {
            ExtractError::ImageLoad { .. } => ApiError::UnprocessableImage(err.to_string()),
            ExtractError::InvalidColor(_) | ExtractError::InvalidParameter { .. } => {
                ApiError::BadRequest(err.to_string())
            }
        }
    }
}

/// Bodies that fail to parse are client errors, never image errors.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

/// Only reached for dates already in storage; request dates are validated
/// before they get that far.
impl From<StreakError> for ApiError {
    fn from(err: StreakError) -> Self {
        ApiError::Internal(anyhow::Error::new(err).context("corrupt game attempt row"))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::UnprocessableImage(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Internal(ref e) => {
                error!("Internal error: {:#}", e);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (status, Json(ErrorResponse { error: self.to_string() })).into_response()
    }
}
