use askama::Template;

use super::views::{ReportFormView, ReportSummaryView, SheetView};

#[derive(Template)]
#[template(path = "pages/home.html")]
pub struct HomeTemplate {
    pub version: &'static str,
    pub form: ReportFormView,
    pub error: Option<String>,
    /// The server holds a default API key, so the field may be left blank.
    pub has_default_key: bool,
}

#[derive(Template)]
#[template(path = "pages/report.html")]
pub struct ReportTemplate {
    pub version: &'static str,
    pub form: ReportFormView,
    pub has_default_key: bool,
    pub summary: ReportSummaryView,
    pub sheets: Vec<SheetView>,
}

pub fn render_template<T: Template>(template: T) -> Result<String, askama::Error> {
    template.render()
}
