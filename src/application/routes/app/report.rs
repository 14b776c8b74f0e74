use axum::extract::{Form, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Json, Response};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use tracing::warn;

use crate::application::errors::AppError;
use crate::application::routes::render_html;
use crate::application::services::{ChannelRequest, channel_report};
use crate::application::state::AppState;
use crate::domain::analytics::{MonthFill, parse_boundary_list};
use crate::domain::config::ReportConfig;
use crate::domain::errors::SourceError;
use crate::domain::sources::ChannelRef;
use crate::domain::videos::{DateRange, parse_threshold};
use crate::presentation::web::templates::{HomeTemplate, ReportTemplate};
use crate::presentation::web::views::{
    DEFAULT_RANGE_START, ReportFormView, ReportSummaryView, SheetView,
};

const DOWNLOAD_DISPOSITION: &str = "attachment; filename=\"youtube_report.json\"";

/// Raw form submission. Every field is optional so a missing value can be
/// reported next to the form instead of as an extractor rejection.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ReportForm {
    api_key: Option<String>,
    channel: Option<String>,
    full_history: Option<String>,
    start_date: Option<String>,
    end_date: Option<String>,
    short_threshold: Option<String>,
    brackets: Option<String>,
    top_n: Option<String>,
    dense_months: Option<String>,
    format: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExportFormat {
    Html,
    Json,
}

struct ParsedForm {
    request: ChannelRequest,
    config: ReportConfig,
    format: ExportFormat,
}

impl ReportForm {
    /// Echo the submission back into the form, falling back to defaults for
    /// blank fields.
    fn view(&self, defaults: &ReportConfig) -> ReportFormView {
        let fallback = ReportFormView::from_defaults(defaults);
        let or_default = |value: Option<&String>, default: String| {
            non_empty(value.map(String::as_str)).map_or(default, str::to_string)
        };

        ReportFormView {
            channel: self.channel.clone().unwrap_or_default(),
            full_history: self.full_history.is_some(),
            start_date: or_default(self.start_date.as_ref(), fallback.start_date),
            end_date: or_default(self.end_date.as_ref(), fallback.end_date),
            short_threshold: or_default(self.short_threshold.as_ref(), fallback.short_threshold),
            brackets: or_default(self.brackets.as_ref(), fallback.brackets),
            top_n: or_default(self.top_n.as_ref(), fallback.top_n),
            dense_months: self.dense_months.is_some(),
        }
    }

    fn parse(&self, state: &AppState) -> Result<ParsedForm, AppError> {
        let channel = non_empty(self.channel.as_deref())
            .ok_or_else(|| AppError::validation("channel ID or URL is required"))?;
        let channel = ChannelRef::parse(channel)?;
        let api_key = state
            .api_key_for(self.api_key.as_deref())
            .ok_or(SourceError::MissingApiKey)?;

        let published = if self.full_history.is_some() {
            None
        } else {
            let start = parse_date(self.start_date.as_deref(), "start date")?
                .unwrap_or(DEFAULT_RANGE_START);
            let end = parse_date(self.end_date.as_deref(), "end date")?
                .unwrap_or_else(|| Utc::now().date_naive());
            Some(DateRange::new(start, end)?)
        };

        let mut config = state.report_defaults.clone();
        if let Some(value) = non_empty(self.short_threshold.as_deref()) {
            config.short_long_threshold_seconds = parse_threshold(value)?;
        }
        if let Some(value) = non_empty(self.brackets.as_deref()) {
            config.view_bracket_boundaries = parse_boundary_list(value)?;
        }
        if let Some(value) = non_empty(self.top_n.as_deref()) {
            config.top_n = value.parse().map_err(|_| {
                AppError::validation(format!(
                    "top videos must be a non-negative whole number, got {value:?}"
                ))
            })?;
        }
        config.month_fill = if self.dense_months.is_some() {
            MonthFill::Dense
        } else {
            MonthFill::Sparse
        };

        let format = match self.format.as_deref() {
            Some("json") => ExportFormat::Json,
            _ => ExportFormat::Html,
        };

        Ok(ParsedForm {
            request: ChannelRequest {
                api_key,
                channel,
                published,
            },
            config,
            format,
        })
    }
}

#[tracing::instrument(skip(state, form))]
pub(crate) async fn report_page(
    State(state): State<AppState>,
    Form(form): Form<ReportForm>,
) -> Result<Response, StatusCode> {
    let view = form.view(&state.report_defaults);

    let parsed = match form.parse(&state) {
        Ok(parsed) => parsed,
        Err(err) => return form_error(&state, view, &err),
    };

    let report = match channel_report(
        state.video_source.as_ref(),
        &parsed.request,
        &parsed.config,
    )
    .await
    {
        Ok(report) => report,
        Err(err) => return form_error(&state, view, &err.into()),
    };

    match parsed.format {
        ExportFormat::Json => {
            Ok(([(header::CONTENT_DISPOSITION, DOWNLOAD_DISPOSITION)], Json(report)).into_response())
        }
        ExportFormat::Html => {
            let summary = ReportSummaryView::new(
                &report,
                parsed.request.channel.to_string(),
                period_label(parsed.request.published.as_ref()),
            );
            let sheets = report.sections().into_iter().map(SheetView::from_table).collect();

            let page = render_html(ReportTemplate {
                version: crate::VERSION,
                form: view,
                has_default_key: state.default_api_key.is_some(),
                summary,
                sheets,
            })?;
            Ok(page.into_response())
        }
    }
}

/// Re-render the form with the error message above it.
fn form_error(
    state: &AppState,
    form: ReportFormView,
    err: &AppError,
) -> Result<Response, StatusCode> {
    let status = err.status();
    if status.is_server_error() {
        warn!(error = %err, "report request failed");
    }

    let page = render_html(HomeTemplate {
        version: crate::VERSION,
        form,
        error: Some(err.public_message()),
        has_default_key: state.default_api_key.is_some(),
    })?;
    Ok((status, page).into_response())
}

fn period_label(range: Option<&DateRange>) -> String {
    match range {
        Some(range) => format!("{} to {}", range.start(), range.end()),
        None => "Entire history".to_string(),
    }
}

fn parse_date(value: Option<&str>, field: &str) -> Result<Option<NaiveDate>, AppError> {
    non_empty(value)
        .map(|text| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d").map_err(|_| {
                AppError::validation(format!("{field} must be a YYYY-MM-DD date, got {text:?}"))
            })
        })
        .transpose()
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
