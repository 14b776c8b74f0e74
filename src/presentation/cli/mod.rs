pub mod report;

use std::io::Write;
use std::net::SocketAddr;
use std::path::Path;

use anyhow::Context;
use chrono::{NaiveDate, Utc};
use clap::{Args, Parser, Subcommand};

use crate::domain::analytics::{DEFAULT_TOP_N, MonthFill, parse_boundary_list};
use crate::domain::config::ReportConfig;
use crate::domain::videos::{DEFAULT_SHORT_THRESHOLD_SECONDS, DateRange, parse_threshold};
use crate::infrastructure::youtube::YOUTUBE_API_URL;
use crate::presentation::web::views::DEFAULT_RANGE_START;
use report::{AnalyzeCommand, FetchCommand};

#[derive(Debug, Parser)]
#[command(author, version, about = "Summarize the uploads of a YouTube channel", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the HTTP server
    Serve(ServeCommand),

    /// Fetch a channel's uploads and print the report as JSON
    Fetch(FetchCommand),

    /// Build a report from a JSON file of video records
    Analyze(AnalyzeCommand),
}

#[derive(Debug, Args)]
pub struct ServeCommand {
    #[arg(long, env = "TUBESTATS_BIND_ADDRESS", default_value = "127.0.0.1:3000")]
    pub bind_address: SocketAddr,

    #[arg(long, env = "TUBESTATS_YOUTUBE_API_URL", default_value = YOUTUBE_API_URL)]
    pub youtube_api_url: String,

    /// Key used when a form submission leaves the API key blank
    #[arg(long, env = "TUBESTATS_YOUTUBE_API_KEY", hide_env_values = true)]
    pub youtube_api_key: Option<String>,

    #[command(flatten)]
    pub report: ReportArgs,
}

/// Aggregation options shared by every command that builds a report.
#[derive(Debug, Clone, Args)]
pub struct ReportArgs {
    /// Videos at or under this many seconds count as Shorts
    #[arg(
        long,
        default_value_t = DEFAULT_SHORT_THRESHOLD_SECONDS,
        allow_negative_numbers = true,
        value_parser = parse_threshold
    )]
    pub short_threshold: i64,

    /// Comma separated lower bounds of the view brackets, e.g. 0,1000,10000
    #[arg(long)]
    pub brackets: Option<String>,

    /// Number of most viewed videos to rank
    #[arg(long, default_value_t = DEFAULT_TOP_N)]
    pub top_n: usize,

    /// Fail instead of producing an empty report when no videos match
    #[arg(long)]
    pub require_videos: bool,

    /// Emit a zero row for every month between the first and last upload
    #[arg(long)]
    pub dense_months: bool,
}

impl ReportArgs {
    pub fn into_config(self) -> anyhow::Result<ReportConfig> {
        let mut config = ReportConfig {
            short_long_threshold_seconds: self.short_threshold,
            top_n: self.top_n,
            require_videos: self.require_videos,
            month_fill: if self.dense_months {
                MonthFill::Dense
            } else {
                MonthFill::Sparse
            },
            ..ReportConfig::default()
        };
        if let Some(brackets) = self.brackets {
            config.view_bracket_boundaries = parse_boundary_list(&brackets)?;
        }
        config.validate()?;
        Ok(config)
    }
}

/// Build the optional publish-date window from `--from` / `--to`.
pub(crate) fn date_range(
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> anyhow::Result<Option<DateRange>> {
    if from.is_none() && to.is_none() {
        return Ok(None);
    }
    let range = DateRange::new(
        from.unwrap_or(DEFAULT_RANGE_START),
        to.unwrap_or_else(|| Utc::now().date_naive()),
    )?;
    Ok(Some(range))
}

pub(crate) fn print_json<T>(value: &T) -> anyhow::Result<()>
where
    T: serde::Serialize,
{
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}

/// Write pretty JSON to `path`, or stdout when no path is given.
pub(crate) fn write_json<T>(value: &T, path: Option<&Path>) -> anyhow::Result<()>
where
    T: serde::Serialize,
{
    let Some(path) = path else {
        return print_json(value);
    };
    let mut file = std::fs::File::create(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    serde_json::to_writer_pretty(&mut file, value)?;
    writeln!(file)?;
    Ok(())
}
