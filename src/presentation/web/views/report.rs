use crate::domain::formatting::{format_duration, format_number, format_video_count};
use crate::domain::report::{Cell, Report, Table};

/// Rows shown per sheet in the HTML preview. The JSON export has them all.
pub const PREVIEW_ROWS: usize = 50;

pub struct SheetView {
    pub name: String,
    pub anchor: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<CellView>>,
    pub total_rows: usize,
}

impl SheetView {
    pub fn from_table(table: Table) -> Self {
        let total_rows = table.rows.len();
        let anchor = table.name.to_lowercase().replace(' ', "-");
        let rows = table
            .rows
            .into_iter()
            .take(PREVIEW_ROWS)
            .map(|row| row.into_iter().map(CellView::from_cell).collect())
            .collect();

        Self {
            name: table.name,
            anchor,
            columns: table.columns,
            rows,
            total_rows,
        }
    }

    pub fn is_truncated(&self) -> bool {
        self.total_rows > self.rows.len()
    }
}

pub struct CellView {
    pub text: String,
    pub numeric: bool,
}

impl CellView {
    fn from_cell(cell: Cell) -> Self {
        match cell {
            Cell::Integer(n) => Self {
                text: format_number(n),
                numeric: true,
            },
            Cell::Duration(seconds) => Self {
                text: format_duration(seconds),
                numeric: true,
            },
            other => Self {
                text: other.to_string(),
                numeric: false,
            },
        }
    }
}

/// Headline numbers shown above the sheets.
pub struct ReportSummaryView {
    pub channel: String,
    pub period: String,
    pub videos: String,
    pub shorts: String,
    pub longs: String,
    pub total_views: String,
    pub is_empty: bool,
}

impl ReportSummaryView {
    pub fn new(report: &Report, channel: String, period: String) -> Self {
        let shorts = report.all_videos.iter().filter(|r| r.is_short()).count();
        let total_views = report
            .all_videos
            .iter()
            .map(|r| r.video.view_count)
            .fold(0u64, u64::saturating_add);

        Self {
            channel,
            period,
            videos: format_video_count(report.video_count()),
            shorts: format_number(shorts as u64),
            longs: format_number((report.video_count() - shorts) as u64),
            total_views: format_number(total_views),
            is_empty: report.is_empty(),
        }
    }
}
