mod report;

use axum::routing::post;

use crate::application::state::AppState;

pub(super) fn router() -> axum::Router<AppState> {
    axum::Router::new()
        .route("/report", post(report::create_report))
        .route("/channel-report", post(report::create_channel_report))
}
