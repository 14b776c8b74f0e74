use axum::Json;
use axum::extract::State;
use chrono::{NaiveDate, Utc};
use serde::Deserialize;

use crate::application::errors::{ApiError, AppError};
use crate::application::routes::support::ApiPayload;
use crate::application::services::{ChannelRequest, build_report, channel_report};
use crate::application::state::AppState;
use crate::domain::config::ReportConfig;
use crate::domain::errors::SourceError;
use crate::domain::report::Report;
use crate::domain::sources::ChannelRef;
use crate::domain::videos::{DateRange, VideoRecord};
use crate::presentation::web::views::DEFAULT_RANGE_START;

#[derive(Debug, Deserialize)]
pub(crate) struct ReportRequest {
    videos: Vec<VideoRecord>,
    #[serde(default)]
    config: ReportConfig,
}

/// Channel reports fetch from the video API. Omitting both dates means the
/// entire upload history.
#[derive(Debug, Deserialize)]
pub(crate) struct ChannelReportRequest {
    channel: String,
    #[serde(default)]
    api_key: Option<String>,
    #[serde(default)]
    start_date: Option<NaiveDate>,
    #[serde(default)]
    end_date: Option<NaiveDate>,
    #[serde(default)]
    config: ReportConfig,
}

#[tracing::instrument(skip(payload), fields(videos = payload.videos.len()))]
pub(crate) async fn create_report(
    ApiPayload(payload): ApiPayload<ReportRequest>,
) -> Result<Json<Report>, ApiError> {
    let report = build_report(&payload.videos, &payload.config)?;
    Ok(Json(report))
}

#[tracing::instrument(skip(state, payload), fields(channel = %payload.channel))]
pub(crate) async fn create_channel_report(
    State(state): State<AppState>,
    ApiPayload(payload): ApiPayload<ChannelReportRequest>,
) -> Result<Json<Report>, ApiError> {
    let channel = ChannelRef::parse(&payload.channel).map_err(AppError::from)?;
    let api_key = state
        .api_key_for(payload.api_key.as_deref())
        .ok_or(AppError::Source(SourceError::MissingApiKey))?;

    let published = match (payload.start_date, payload.end_date) {
        (None, None) => None,
        (start, end) => Some(
            DateRange::new(
                start.unwrap_or(DEFAULT_RANGE_START),
                end.unwrap_or_else(|| Utc::now().date_naive()),
            )
            .map_err(AppError::from)?,
        ),
    };

    let request = ChannelRequest {
        api_key,
        channel,
        published,
    };
    let report = channel_report(state.video_source.as_ref(), &request, &payload.config).await?;
    Ok(Json(report))
}
