use std::time::Instant;

use thiserror::Error;
use tracing::{info, warn};

use crate::domain::analytics::{monthly_summary, monthly_view_brackets, rank_top, view_brackets};
use crate::domain::config::ReportConfig;
use crate::domain::errors::{AggregationError, SourceError};
use crate::domain::report::{Report, ReportBuilder};
use crate::domain::sources::{ChannelRef, VideoSource};
use crate::domain::videos::{DateRange, VideoRecord, classify_with, published_within};

#[derive(Debug, Error)]
pub enum ReportError {
    #[error(transparent)]
    Aggregation(#[from] AggregationError),
    #[error(transparent)]
    Source(#[from] SourceError),
}

/// What to fetch for a channel report.
#[derive(Debug, Clone)]
pub struct ChannelRequest {
    pub api_key: String,
    pub channel: ChannelRef,
    /// `None` means the channel's entire history.
    pub published: Option<DateRange>,
}

/// Turn a fully fetched video list into the four-sheet report.
///
/// The configuration is validated before any record is touched, so an
/// invalid threshold or bracket list fails without doing partial work.
pub fn build_report(
    videos: &[VideoRecord],
    config: &ReportConfig,
) -> Result<Report, AggregationError> {
    let start = Instant::now();
    let config = config.validate()?;

    if config.require_videos && videos.is_empty() {
        return Err(AggregationError::EmptyInput);
    }

    let classified = classify_with(videos, config.threshold_seconds);
    let monthly = monthly_summary(&classified, config.month_fill);
    let brackets = view_brackets(&classified, &config.boundaries);
    let brackets_by_month =
        monthly_view_brackets(&classified, &config.boundaries, config.month_fill);
    let top = rank_top(&classified, config.top_n);

    let report = ReportBuilder::new(config.top_n)
        .all_videos(classified)
        .monthly_summary(monthly)
        .view_brackets(brackets)
        .view_brackets_by_month(brackets_by_month)
        .top_videos(top)
        .build()?;

    info!(
        duration_ms = start.elapsed().as_millis(),
        videos = report.video_count(),
        months = report.monthly_summary.len(),
        "report computed"
    );
    Ok(report)
}

/// Fetch a channel's uploads and build its report.
pub async fn channel_report(
    source: &dyn VideoSource,
    request: &ChannelRequest,
    config: &ReportConfig,
) -> Result<Report, ReportError> {
    // Fail before spending API quota on a configuration we would reject.
    config.validate()?;

    let start = Instant::now();
    let videos = source
        .channel_videos(&request.api_key, &request.channel)
        .await
        .inspect_err(|err| warn!(error = %err, channel = %request.channel, "video fetch failed"))?;
    let fetched = videos.len();

    let videos = match &request.published {
        Some(range) => published_within(videos, range),
        None => videos,
    };

    info!(
        duration_ms = start.elapsed().as_millis(),
        channel = %request.channel,
        fetched,
        in_range = videos.len(),
        "channel videos fetched"
    );

    Ok(build_report(&videos, config)?)
}
