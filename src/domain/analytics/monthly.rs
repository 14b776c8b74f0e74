use std::collections::BTreeMap;
use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::domain::videos::ClassifiedRecord;

/// Calendar month in UTC. Orders chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MonthKey {
    pub year: i32,
    pub month: u32,
}

impl MonthKey {
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn next(self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    /// Long label such as "March 2024".
    pub fn label(self) -> String {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).map_or_else(
            || format!("{}-{:02}", self.year, self.month),
            |d| d.format("%B %Y").to_string(),
        )
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:02}", self.year, self.month)
    }
}

/// Whether months without uploads appear in the summary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MonthFill {
    /// Only months with at least one video.
    #[default]
    Sparse,
    /// Every month between the first and last upload, empty ones included.
    Dense,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlySummary {
    pub month: MonthKey,
    pub videos: u64,
    pub shorts: u64,
    pub longs: u64,
    pub total_views: u64,
    pub average_views: f64,
}

impl MonthlySummary {
    fn empty(month: MonthKey) -> Self {
        Self {
            month,
            videos: 0,
            shorts: 0,
            longs: 0,
            total_views: 0,
            average_views: 0.0,
        }
    }

    fn add(&mut self, record: &ClassifiedRecord) {
        self.videos += 1;
        if record.is_short() {
            self.shorts += 1;
        } else {
            self.longs += 1;
        }
        self.total_views = self.total_views.saturating_add(record.video.view_count);
    }

    fn finish(mut self) -> Self {
        if self.videos > 0 {
            self.average_views = self.total_views as f64 / self.videos as f64;
        }
        self
    }
}

/// Group records by publish month, oldest month first.
pub fn monthly_summary(records: &[ClassifiedRecord], fill: MonthFill) -> Vec<MonthlySummary> {
    let mut buckets: BTreeMap<MonthKey, MonthlySummary> = BTreeMap::new();

    for record in records {
        let key = MonthKey::of(record.video.published_date());
        buckets
            .entry(key)
            .or_insert_with(|| MonthlySummary::empty(key))
            .add(record);
    }

    if fill == MonthFill::Dense {
        fill_gaps(&mut buckets, MonthlySummary::empty);
    }

    buckets.into_values().map(MonthlySummary::finish).collect()
}

/// Insert `empty(month)` for every missing month between the first and last key.
pub(crate) fn fill_gaps<V>(buckets: &mut BTreeMap<MonthKey, V>, empty: impl Fn(MonthKey) -> V) {
    let (Some(&first), Some(&last)) = (buckets.keys().next(), buckets.keys().next_back()) else {
        return;
    };
    let mut month = first;
    while month < last {
        buckets.entry(month).or_insert_with(|| empty(month));
        month = month.next();
    }
}
