use chrono::NaiveDate;
use thiserror::Error;

/// Failures raised by the aggregation pipeline. Every variant is detected
/// before any record is processed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AggregationError {
    #[error("invalid short/long threshold: {0}")]
    InvalidThreshold(String),
    #[error("invalid view bracket boundaries: {0}")]
    InvalidBracketBoundaries(String),
    #[error("no videos to report on")]
    EmptyInput,
    #[error("report is missing the {missing} sheet")]
    IncompleteReport { missing: &'static str },
    #[error("invalid date range: {start} is after {end}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },
}

/// Failures fetching videos from the upstream source.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    #[error("invalid channel reference: {0}")]
    InvalidChannel(String),
    #[error("channel not found: {0}")]
    ChannelNotFound(String),
    #[error("missing API key")]
    MissingApiKey,
    #[error("video API returned status {status}: {message}")]
    Api { status: u16, message: String },
    #[error("video API request failed: {0}")]
    Transport(String),
    #[error("failed to decode video API response: {0}")]
    Decode(String),
}
