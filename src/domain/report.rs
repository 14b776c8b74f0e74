//! The four-sheet channel report and its column schema.
//!
//! This is the only place that knows the report layout: sheet order is
//! All Videos, Monthly Summary, View Brackets, Top N, and each sheet's
//! columns are fixed by the `*_COLUMNS` constants below. The View Brackets
//! sheet also carries a month-by-bracket section whose count columns follow
//! the configured brackets.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::analytics::{MonthBrackets, MonthKey, MonthlySummary, RankedEntry, ViewBracket};
use super::errors::AggregationError;
use super::videos::ClassifiedRecord;

pub const ALL_VIDEOS_SHEET: &str = "All Videos";
pub const MONTHLY_SUMMARY_SHEET: &str = "Monthly Summary";
pub const VIEW_BRACKETS_SHEET: &str = "View Brackets";
pub const TOP_VIDEOS_SHEET: &str = "Top N";
pub const VIEW_BRACKETS_BY_MONTH_SECTION: &str = "View Brackets by Month";

pub const ALL_VIDEOS_COLUMNS: &[&str] = &[
    "video_id",
    "title",
    "published_date",
    "month",
    "view_count",
    "duration_seconds",
    "form",
];
pub const MONTHLY_SUMMARY_COLUMNS: &[&str] = &[
    "month",
    "total_videos",
    "shorts",
    "longs",
    "total_views",
    "avg_views",
];
pub const VIEW_BRACKETS_COLUMNS: &[&str] = &["bracket", "min_views", "max_views", "videos"];
pub const TOP_VIDEOS_COLUMNS: &[&str] = &["rank", "title", "view_count", "video_id", "month", "url"];
/// Followed by one column per bracket label.
pub const VIEW_BRACKETS_BY_MONTH_LEAD_COLUMN: &str = "month";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub top_n: usize,
    pub all_videos: Vec<ClassifiedRecord>,
    pub monthly_summary: Vec<MonthlySummary>,
    pub view_brackets: Vec<ViewBracket>,
    pub view_brackets_by_month: Vec<MonthBrackets>,
    pub top_videos: Vec<RankedEntry>,
}

/// A spreadsheet cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Text(String),
    Integer(u64),
    /// A length in seconds.
    Duration(u64),
    Date(NaiveDate),
    Empty,
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Text(text) => f.write_str(text),
            Cell::Integer(n) | Cell::Duration(n) => write!(f, "{n}"),
            Cell::Date(date) => write!(f, "{}", date.format("%Y-%m-%d")),
            Cell::Empty => Ok(()),
        }
    }
}

/// One rendered sheet: a name, its column headers and typed rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Table {
    pub name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

fn column_names(names: &[&str]) -> Vec<String> {
    names.iter().map(ToString::to_string).collect()
}

impl Report {
    /// "Top 20" with the default configuration.
    pub fn top_sheet_name(&self) -> String {
        format!("Top {}", self.top_n)
    }

    pub fn video_count(&self) -> usize {
        self.all_videos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.all_videos.is_empty()
            && self.monthly_summary.is_empty()
            && self.view_brackets.is_empty()
            && self.view_brackets_by_month.is_empty()
            && self.top_videos.is_empty()
    }

    /// All four sheets in their fixed order.
    pub fn tables(&self) -> [Table; 4] {
        [
            self.all_videos_table(),
            self.monthly_summary_table(),
            self.view_brackets_table(),
            self.top_videos_table(),
        ]
    }

    /// The four sheets with the month-by-bracket section placed after the
    /// bracket totals, in page order.
    pub fn sections(&self) -> Vec<Table> {
        let [all_videos, monthly, brackets, top] = self.tables();
        vec![
            all_videos,
            monthly,
            brackets,
            self.view_brackets_by_month_table(),
            top,
        ]
    }

    pub fn all_videos_table(&self) -> Table {
        let rows = self
            .all_videos
            .iter()
            .map(|record| {
                let video = &record.video;
                vec![
                    Cell::Text(video.id.clone()),
                    Cell::Text(video.title.clone()),
                    Cell::Date(video.published_date()),
                    Cell::Text(MonthKey::of(video.published_date()).label()),
                    Cell::Integer(video.view_count),
                    Cell::Duration(video.duration_seconds),
                    Cell::Text(record.category.to_string()),
                ]
            })
            .collect();

        Table {
            name: ALL_VIDEOS_SHEET.to_string(),
            columns: column_names(ALL_VIDEOS_COLUMNS),
            rows,
        }
    }

    pub fn monthly_summary_table(&self) -> Table {
        let rows = self
            .monthly_summary
            .iter()
            .map(|summary| {
                vec![
                    Cell::Text(summary.month.label()),
                    Cell::Integer(summary.videos),
                    Cell::Integer(summary.shorts),
                    Cell::Integer(summary.longs),
                    Cell::Integer(summary.total_views),
                    Cell::Integer(summary.average_views.trunc() as u64),
                ]
            })
            .collect();

        Table {
            name: MONTHLY_SUMMARY_SHEET.to_string(),
            columns: column_names(MONTHLY_SUMMARY_COLUMNS),
            rows,
        }
    }

    pub fn view_brackets_table(&self) -> Table {
        let rows = self
            .view_brackets
            .iter()
            .map(|bracket| {
                vec![
                    Cell::Text(bracket.label.clone()),
                    Cell::Integer(bracket.lower),
                    bracket
                        .upper
                        .map_or(Cell::Empty, |upper| Cell::Integer(upper - 1)),
                    Cell::Integer(bracket.videos),
                ]
            })
            .collect();

        Table {
            name: VIEW_BRACKETS_SHEET.to_string(),
            columns: column_names(VIEW_BRACKETS_COLUMNS),
            rows,
        }
    }

    pub fn view_brackets_by_month_table(&self) -> Table {
        let columns = std::iter::once(VIEW_BRACKETS_BY_MONTH_LEAD_COLUMN.to_string())
            .chain(self.view_brackets.iter().map(|bracket| bracket.label.clone()))
            .collect();
        let rows = self
            .view_brackets_by_month
            .iter()
            .map(|month| {
                std::iter::once(Cell::Text(month.month.label()))
                    .chain(month.counts.iter().map(|&count| Cell::Integer(count)))
                    .collect()
            })
            .collect();

        Table {
            name: VIEW_BRACKETS_BY_MONTH_SECTION.to_string(),
            columns,
            rows,
        }
    }

    pub fn top_videos_table(&self) -> Table {
        let rows = self
            .top_videos
            .iter()
            .map(|entry| {
                let video = &entry.record.video;
                vec![
                    Cell::Integer(entry.rank as u64),
                    Cell::Text(video.title.clone()),
                    Cell::Integer(video.view_count),
                    Cell::Text(video.id.clone()),
                    Cell::Text(MonthKey::of(video.published_date()).label()),
                    Cell::Text(video.url()),
                ]
            })
            .collect();

        Table {
            name: self.top_sheet_name(),
            columns: column_names(TOP_VIDEOS_COLUMNS),
            rows,
        }
    }
}

/// Collects the sub-results. Every one is required, even when empty.
#[derive(Debug, Default)]
pub struct ReportBuilder {
    top_n: usize,
    all_videos: Option<Vec<ClassifiedRecord>>,
    monthly_summary: Option<Vec<MonthlySummary>>,
    view_brackets: Option<Vec<ViewBracket>>,
    view_brackets_by_month: Option<Vec<MonthBrackets>>,
    top_videos: Option<Vec<RankedEntry>>,
}

impl ReportBuilder {
    pub fn new(top_n: usize) -> Self {
        Self {
            top_n,
            ..Self::default()
        }
    }

    pub fn all_videos(mut self, records: Vec<ClassifiedRecord>) -> Self {
        self.all_videos = Some(records);
        self
    }

    pub fn monthly_summary(mut self, summary: Vec<MonthlySummary>) -> Self {
        self.monthly_summary = Some(summary);
        self
    }

    pub fn view_brackets(mut self, brackets: Vec<ViewBracket>) -> Self {
        self.view_brackets = Some(brackets);
        self
    }

    pub fn view_brackets_by_month(mut self, months: Vec<MonthBrackets>) -> Self {
        self.view_brackets_by_month = Some(months);
        self
    }

    pub fn top_videos(mut self, entries: Vec<RankedEntry>) -> Self {
        self.top_videos = Some(entries);
        self
    }

    pub fn build(self) -> Result<Report, AggregationError> {
        let missing = |sheet: &'static str| AggregationError::IncompleteReport { missing: sheet };

        Ok(Report {
            top_n: self.top_n,
            all_videos: self.all_videos.ok_or_else(|| missing(ALL_VIDEOS_SHEET))?,
            monthly_summary: self
                .monthly_summary
                .ok_or_else(|| missing(MONTHLY_SUMMARY_SHEET))?,
            view_brackets: self
                .view_brackets
                .ok_or_else(|| missing(VIEW_BRACKETS_SHEET))?,
            view_brackets_by_month: self
                .view_brackets_by_month
                .ok_or_else(|| missing(VIEW_BRACKETS_BY_MONTH_SECTION))?,
            top_videos: self.top_videos.ok_or_else(|| missing(TOP_VIDEOS_SHEET))?,
        })
    }
}
