use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::errors::AggregationError;

/// Videos at or under this many seconds are Shorts.
pub const DEFAULT_SHORT_THRESHOLD_SECONDS: i64 = 180;

/// Metadata for a single uploaded video, as supplied by the video source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoRecord {
    pub id: String,
    pub title: String,
    pub published_at: DateTime<Utc>,
    pub duration_seconds: u64,
    pub view_count: u64,
}

impl VideoRecord {
    pub fn published_date(&self) -> NaiveDate {
        self.published_at.date_naive()
    }

    /// Short link to the video, e.g. `https://youtu.be/dQw4w9WgXcQ`.
    pub fn url(&self) -> String {
        format!("https://youtu.be/{}", self.id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Short,
    Long,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Short => "Short",
            Category::Long => "Long",
        }
    }

    /// Inclusive boundary: a duration equal to the threshold is a Short.
    pub fn for_duration(duration_seconds: u64, threshold_seconds: u64) -> Self {
        if duration_seconds <= threshold_seconds {
            Category::Short
        } else {
            Category::Long
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedRecord {
    #[serde(flatten)]
    pub video: VideoRecord,
    pub category: Category,
}

impl ClassifiedRecord {
    pub fn is_short(&self) -> bool {
        self.category == Category::Short
    }
}

/// Validate a threshold and convert it to the unsigned duration domain.
pub fn validate_threshold(threshold_seconds: i64) -> Result<u64, AggregationError> {
    u64::try_from(threshold_seconds).map_err(|_| {
        AggregationError::InvalidThreshold(format!(
            "{threshold_seconds} (must be zero or more seconds)"
        ))
    })
}

/// Parse a threshold typed by a user. Non-numeric input is an invalid threshold.
pub fn parse_threshold(value: &str) -> Result<i64, AggregationError> {
    let trimmed = value.trim();
    trimmed.parse::<i64>().map_err(|_| {
        AggregationError::InvalidThreshold(format!("{trimmed:?} is not a whole number of seconds"))
    })
}

/// Label every record Short or Long. Output has the same length and order
/// as the input.
pub fn classify(
    records: &[VideoRecord],
    threshold_seconds: i64,
) -> Result<Vec<ClassifiedRecord>, AggregationError> {
    let threshold = validate_threshold(threshold_seconds)?;
    Ok(classify_with(records, threshold))
}

/// `classify` for a threshold that has already been validated.
pub fn classify_with(records: &[VideoRecord], threshold_seconds: u64) -> Vec<ClassifiedRecord> {
    records
        .iter()
        .map(|video| ClassifiedRecord {
            video: video.clone(),
            category: Category::for_duration(video.duration_seconds, threshold_seconds),
        })
        .collect()
}

/// Inclusive range of publish dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, AggregationError> {
        if start > end {
            return Err(AggregationError::InvalidDateRange { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        (self.start..=self.end).contains(&date)
    }
}

/// Keep the records published inside `range`, preserving order.
pub fn published_within(records: Vec<VideoRecord>, range: &DateRange) -> Vec<VideoRecord> {
    records
        .into_iter()
        .filter(|video| range.contains(video.published_date()))
        .collect()
}
