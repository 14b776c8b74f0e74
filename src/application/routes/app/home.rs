use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Html;

use crate::application::routes::render_html;
use crate::application::state::AppState;
use crate::presentation::web::templates::HomeTemplate;
use crate::presentation::web::views::ReportFormView;

#[tracing::instrument(skip(state))]
pub(crate) async fn home_page(State(state): State<AppState>) -> Result<Html<String>, StatusCode> {
    render_html(HomeTemplate {
        version: crate::VERSION,
        form: ReportFormView::from_defaults(&state.report_defaults),
        error: None,
        has_default_key: state.default_api_key.is_some(),
    })
}
