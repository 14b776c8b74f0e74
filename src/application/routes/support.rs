use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Json, Request};
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::application::errors::{ApiError, AppError};
use crate::domain::errors::AggregationError;

const THRESHOLD_FIELD: &str = "short_long_threshold_seconds";

/// JSON body extractor for the `/api/v1` routes. Malformed bodies are
/// rejected with the same `{"error": ...}` shape as every other API error.
#[derive(Debug)]
pub(crate) struct ApiPayload<T>(pub T);

impl<S, T> FromRequest<S> for ApiPayload<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(payload) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| {
                warn!(error = %rejection.body_text(), "failed to parse JSON payload");
                ApiError::from(rejection_error(&rejection))
            })?;
        Ok(Self(payload))
    }
}

fn rejection_error(rejection: &JsonRejection) -> AppError {
    match rejection {
        JsonRejection::JsonDataError(_) => data_error(&rejection.body_text()),
        JsonRejection::MissingJsonContentType(_) => {
            AppError::validation("expected a request with Content-Type: application/json")
        }
        _ => AppError::validation(format!(
            "invalid JSON payload: {}",
            detail(&rejection.body_text())
        )),
    }
}

/// A body that is valid JSON but has the wrong shape. A bad threshold is
/// reported as a threshold error so API and form clients see the same message.
fn data_error(text: &str) -> AppError {
    let detail = detail(text);
    if detail.contains(THRESHOLD_FIELD) {
        AggregationError::InvalidThreshold(detail.to_string()).into()
    } else {
        AppError::validation(format!("invalid request: {detail}"))
    }
}

// axum prefixes the serde message with a fixed sentence.
fn detail(text: &str) -> &str {
    text.split_once(": ").map_or(text, |(_, rest)| rest)
}
