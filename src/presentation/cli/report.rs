use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Args;

use super::{ReportArgs, date_range, write_json};
use crate::application::services::{ChannelRequest, build_report, channel_report};
use crate::domain::report::Report;
use crate::domain::sources::ChannelRef;
use crate::domain::videos::VideoRecord;
use crate::infrastructure::youtube::{YOUTUBE_API_URL, YouTubeClient};

#[derive(Debug, Args)]
pub struct FetchCommand {
    /// Channel ID, @handle, or channel URL
    #[arg(long)]
    pub channel: String,

    #[arg(long, env = "TUBESTATS_YOUTUBE_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    #[arg(long, env = "TUBESTATS_YOUTUBE_API_URL", default_value = YOUTUBE_API_URL)]
    pub youtube_api_url: String,

    /// Earliest publish date to include (YYYY-MM-DD)
    #[arg(long)]
    pub from: Option<NaiveDate>,

    /// Latest publish date to include (YYYY-MM-DD)
    #[arg(long)]
    pub to: Option<NaiveDate>,

    /// Write the report here instead of stdout
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub report: ReportArgs,
}

#[derive(Debug, Args)]
pub struct AnalyzeCommand {
    /// JSON array of video records
    #[arg(long, short)]
    pub input: PathBuf,

    /// Write the report here instead of stdout
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub report: ReportArgs,
}

pub async fn fetch(command: FetchCommand) -> Result<()> {
    let config = command.report.into_config()?;
    let api_key = command
        .api_key
        .filter(|key| !key.trim().is_empty())
        .context("missing API key: pass --api-key or set TUBESTATS_YOUTUBE_API_KEY")?;
    let request = ChannelRequest {
        api_key,
        channel: ChannelRef::parse(&command.channel)?,
        published: date_range(command.from, command.to)?,
    };

    let client = YouTubeClient::new(&command.youtube_api_url)?;
    let report = channel_report(&client, &request, &config).await?;

    finish(&report, command.output)
}

pub fn analyze(command: AnalyzeCommand) -> Result<()> {
    let config = command.report.into_config()?;
    let contents = std::fs::read_to_string(&command.input)
        .with_context(|| format!("failed to read {}", command.input.display()))?;
    let videos: Vec<VideoRecord> = serde_json::from_str(&contents)
        .with_context(|| format!("{} is not a JSON array of videos", command.input.display()))?;

    let report = build_report(&videos, &config)?;

    finish(&report, command.output)
}

fn finish(report: &Report, output: Option<PathBuf>) -> Result<()> {
    write_json(report, output.as_deref())?;
    if let Some(path) = output {
        eprintln!(
            "Wrote report for {} videos to {}",
            report.video_count(),
            path.display()
        );
    }
    Ok(())
}
