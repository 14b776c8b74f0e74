use serde::{Deserialize, Serialize};

use super::analytics::{BracketBoundaries, DEFAULT_BRACKET_BOUNDARIES, DEFAULT_TOP_N, MonthFill};
use super::errors::AggregationError;
use super::videos::{DEFAULT_SHORT_THRESHOLD_SECONDS, validate_threshold};

/// Knobs accepted by the aggregator. Missing JSON fields take the defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub short_long_threshold_seconds: i64,
    pub view_bracket_boundaries: Vec<i64>,
    pub top_n: usize,
    /// Treat an empty video list as an error instead of an empty report.
    pub require_videos: bool,
    pub month_fill: MonthFill,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            short_long_threshold_seconds: DEFAULT_SHORT_THRESHOLD_SECONDS,
            view_bracket_boundaries: DEFAULT_BRACKET_BOUNDARIES.to_vec(),
            top_n: DEFAULT_TOP_N,
            require_videos: false,
            month_fill: MonthFill::Sparse,
        }
    }
}

/// A `ReportConfig` that has passed validation.
#[derive(Debug, Clone)]
pub struct ValidatedConfig {
    pub threshold_seconds: u64,
    pub boundaries: BracketBoundaries,
    pub top_n: usize,
    pub require_videos: bool,
    pub month_fill: MonthFill,
}

impl ReportConfig {
    pub fn validate(&self) -> Result<ValidatedConfig, AggregationError> {
        Ok(ValidatedConfig {
            threshold_seconds: validate_threshold(self.short_long_threshold_seconds)?,
            boundaries: BracketBoundaries::new(&self.view_bracket_boundaries)?,
            top_n: self.top_n,
            require_videos: self.require_videos,
            month_fill: self.month_fill,
        })
    }
}
