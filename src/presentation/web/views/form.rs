use chrono::{NaiveDate, Utc};

use crate::domain::config::ReportConfig;
use crate::domain::analytics::MonthFill;

/// First day offered by the date picker when a range is used.
pub const DEFAULT_RANGE_START: NaiveDate = match NaiveDate::from_ymd_opt(2010, 1, 1) {
    Some(date) => date,
    None => NaiveDate::MIN,
};

/// Values shown in the analysis form, either defaults or what was submitted.
#[derive(Debug, Clone)]
pub struct ReportFormView {
    pub channel: String,
    pub full_history: bool,
    pub start_date: String,
    pub end_date: String,
    pub short_threshold: String,
    pub brackets: String,
    pub top_n: String,
    pub dense_months: bool,
}

impl ReportFormView {
    pub fn from_defaults(config: &ReportConfig) -> Self {
        Self {
            channel: String::new(),
            full_history: true,
            start_date: DEFAULT_RANGE_START.format("%Y-%m-%d").to_string(),
            end_date: Utc::now().date_naive().format("%Y-%m-%d").to_string(),
            short_threshold: config.short_long_threshold_seconds.to_string(),
            brackets: config
                .view_bracket_boundaries
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", "),
            top_n: config.top_n.to_string(),
            dense_months: config.month_fill == MonthFill::Dense,
        }
    }
}
