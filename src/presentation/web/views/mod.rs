mod form;
mod report;

pub use form::{DEFAULT_RANGE_START, ReportFormView};
pub use report::{CellView, PREVIEW_ROWS, ReportSummaryView, SheetView};
