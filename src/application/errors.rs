use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::error;

use crate::application::services::ReportError;
use crate::domain::errors::{AggregationError, SourceError};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Aggregation(#[from] AggregationError),
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error("{0}")]
    Unexpected(String),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        AppError::Validation(message.into())
    }

    pub fn unexpected(message: impl Into<String>) -> Self {
        AppError::Unexpected(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::Aggregation(_) => StatusCode::BAD_REQUEST,
            AppError::Source(SourceError::InvalidChannel(_) | SourceError::MissingApiKey) => {
                StatusCode::BAD_REQUEST
            }
            AppError::Source(SourceError::ChannelNotFound(_)) => StatusCode::NOT_FOUND,
            AppError::Source(_) => StatusCode::BAD_GATEWAY,
            AppError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show to the user.
    pub fn public_message(&self) -> String {
        match self {
            AppError::Unexpected(_) => "internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<ReportError> for AppError {
    fn from(err: ReportError) -> Self {
        match err {
            ReportError::Aggregation(err) => AppError::Aggregation(err),
            ReportError::Source(err) => AppError::Source(err),
        }
    }
}

impl From<askama::Error> for AppError {
    fn from(err: askama::Error) -> Self {
        AppError::unexpected(format!("failed to render template: {err}"))
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// JSON error body for the `/api/v1` routes.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        ApiError(err)
    }
}

impl From<AggregationError> for ApiError {
    fn from(err: AggregationError) -> Self {
        ApiError(err.into())
    }
}

impl From<ReportError> for ApiError {
    fn from(err: ReportError) -> Self {
        ApiError(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.0.status();
        if status.is_server_error() {
            error!(error = %self.0, "request failed");
        }
        let body = ErrorResponse {
            error: self.0.public_message(),
        };
        (status, Json(body)).into_response()
    }
}
