mod home;
mod report;

use axum::response::IntoResponse;
use axum::routing::{get, post};

use crate::application::state::AppState;

pub(super) fn router() -> axum::Router<AppState> {
    axum::Router::new()
        .route("/", get(home::home_page))
        .route("/report", post(report::report_page))
        .route("/health", get(health))
}

async fn health() -> impl IntoResponse {
    ([("content-type", "application/json")], r#"{"status":"ok"}"#)
}
