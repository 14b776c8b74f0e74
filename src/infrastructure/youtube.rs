//! YouTube Data API v3 video source.

use std::collections::HashSet;
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt, TryStreamExt};
use reqwest::{Client, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::domain::errors::SourceError;
use crate::domain::sources::{ChannelRef, VideoSource};
use crate::domain::videos::VideoRecord;

pub const YOUTUBE_API_URL: &str = "https://www.googleapis.com/youtube/v3/";
const USER_AGENT: &str = "tubestats/1.0";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
/// Largest page and id batch the API accepts.
const PAGE_SIZE: usize = 50;
/// 50,000 uploads.
const MAX_PAGES: usize = 1_000;
/// `videos` requests in flight at once.
const MAX_CONCURRENT_BATCHES: usize = 5;

pub struct YouTubeClient {
    base_url: Url,
    http: Client,
}

impl YouTubeClient {
    pub fn new(base_url: &str) -> anyhow::Result<Self> {
        let mut url =
            Url::parse(base_url).with_context(|| format!("invalid YouTube API url: {base_url}"))?;
        if !url.path().ends_with('/') {
            url.set_path(&format!("{}/", url.path().trim_end_matches('/')));
        }

        let http = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("failed to configure HTTP client")?;

        Ok(Self {
            base_url: url,
            http,
        })
    }

    /// Id of the playlist holding every upload of the channel.
    pub async fn uploads_playlist(
        &self,
        api_key: &str,
        channel: &ChannelRef,
    ) -> Result<String, SourceError> {
        let selector = match channel {
            ChannelRef::Id(id) => ("id", id.as_str()),
            ChannelRef::Handle(handle) => ("forHandle", handle.as_str()),
            ChannelRef::Username(name) => ("forUsername", name.as_str()),
        };

        let response: ChannelListResponse = self
            .get_json("channels", api_key, &[("part", "contentDetails"), selector])
            .await?;

        response
            .items
            .unwrap_or_default()
            .into_iter()
            .next()
            .and_then(|item| item.content_details)
            .map(|details| details.related_playlists.uploads)
            .ok_or_else(|| SourceError::ChannelNotFound(channel.to_string()))
    }

    /// Every video id in the playlist, following `nextPageToken`.
    pub async fn playlist_video_ids(
        &self,
        api_key: &str,
        playlist_id: &str,
    ) -> Result<Vec<String>, SourceError> {
        let page_size = PAGE_SIZE.to_string();
        let mut ids = Vec::new();
        let mut page_token: Option<String> = None;

        for page in 1..=MAX_PAGES {
            let mut query = vec![
                ("part", "contentDetails"),
                ("playlistId", playlist_id),
                ("maxResults", page_size.as_str()),
            ];
            if let Some(token) = page_token.as_deref() {
                query.push(("pageToken", token));
            }

            let response: PlaylistItemListResponse =
                self.get_json("playlistItems", api_key, &query).await?;

            ids.extend(
                response
                    .items
                    .unwrap_or_default()
                    .into_iter()
                    .map(|item| item.content_details.video_id),
            );
            debug!(page, total = ids.len(), "fetched playlist page");

            match response.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => return Ok(ids),
            }
        }

        warn!(
            playlist_id,
            pages = MAX_PAGES,
            "playlist page limit reached; remaining uploads skipped"
        );
        Ok(ids)
    }

    /// Details for the given ids, fetched in batches of 50 with at most
    /// `MAX_CONCURRENT_BATCHES` requests outstanding. Output follows input
    /// order. Ids the API does not return (private or deleted videos) are
    /// skipped.
    pub async fn video_details(
        &self,
        api_key: &str,
        video_ids: &[String],
    ) -> Result<Vec<VideoRecord>, SourceError> {
        let batches: Vec<_> = video_ids
            .chunks(PAGE_SIZE)
            .map(|batch| async move {
                let ids = batch.join(",");
                let response: VideoListResponse = self
                    .get_json(
                        "videos",
                        api_key,
                        &[
                            ("part", "snippet,statistics,contentDetails"),
                            ("id", ids.as_str()),
                        ],
                    )
                    .await?;
                Ok::<_, SourceError>(response.items.unwrap_or_default())
            })
            .collect();

        let results: Vec<Vec<VideoResource>> = stream::iter(batches)
            .buffered(MAX_CONCURRENT_BATCHES)
            .try_collect()
            .await?;

        Ok(results
            .into_iter()
            .flatten()
            .map(VideoResource::into_record)
            .collect())
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        api_key: &str,
        query: &[(&str, &str)],
    ) -> Result<T, SourceError> {
        let url = self
            .base_url
            .join(path)
            .map_err(|e| SourceError::Transport(format!("invalid API path {path}: {e}")))?;

        let response = self
            .http
            .get(url)
            .query(query)
            .query(&[("key", api_key)])
            .send()
            .await
            .map_err(|e| SourceError::Transport(e.without_url().to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| SourceError::Transport(e.without_url().to_string()))?;

        if !status.is_success() {
            return Err(SourceError::Api {
                status: status.as_u16(),
                message: api_error_message(&body),
            });
        }

        serde_json::from_str(&body).map_err(|e| SourceError::Decode(format!("{path}: {e}")))
    }
}

#[async_trait]
impl VideoSource for YouTubeClient {
    async fn channel_videos(
        &self,
        api_key: &str,
        channel: &ChannelRef,
    ) -> Result<Vec<VideoRecord>, SourceError> {
        if api_key.trim().is_empty() {
            return Err(SourceError::MissingApiKey);
        }

        let playlist_id = self.uploads_playlist(api_key, channel).await?;
        let ids = dedup_preserving_order(self.playlist_video_ids(api_key, &playlist_id).await?);
        self.video_details(api_key, &ids).await
    }
}

fn dedup_preserving_order(ids: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::with_capacity(ids.len());
    ids.into_iter()
        .filter(|id| seen.insert(id.clone()))
        .collect()
}

/// Prefer the API's own error message over the raw body.
fn api_error_message(body: &str) -> String {
    serde_json::from_str::<ApiErrorResponse>(body).map_or_else(
        |_| {
            let trimmed = body.trim();
            if trimmed.is_empty() {
                "(empty body)".to_string()
            } else {
                trimmed.to_string()
            }
        },
        |response| response.error.message,
    )
}

/// Parse an ISO 8601 duration such as `PT1H2M3S` or `P1DT30M` into seconds.
/// Fractional seconds are truncated.
pub fn parse_iso8601_duration(value: &str) -> Option<u64> {
    let rest = value.strip_prefix('P')?;
    let mut total: u64 = 0;
    let mut number = String::new();
    let mut in_time = false;
    let mut seen_unit = false;

    for c in rest.chars() {
        match c {
            '0'..='9' | '.' => number.push(c),
            'T' if !in_time && number.is_empty() => in_time = true,
            _ => {
                let whole: u64 = number.split('.').next()?.parse().ok()?;
                let unit_seconds = match (in_time, c) {
                    (false, 'W') => 604_800,
                    (false, 'D') => 86_400,
                    (true, 'H') => 3_600,
                    (true, 'M') => 60,
                    (true, 'S') => 1,
                    _ => return None,
                };
                total = total.checked_add(whole.checked_mul(unit_seconds)?)?;
                number.clear();
                seen_unit = true;
            }
        }
    }

    (number.is_empty() && seen_unit).then_some(total)
}

// --- YouTube Data API types ---

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

#[derive(Debug, Deserialize)]
struct ChannelListResponse {
    items: Option<Vec<ChannelResource>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChannelResource {
    content_details: Option<ChannelContentDetails>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChannelContentDetails {
    related_playlists: RelatedPlaylists,
}

#[derive(Debug, Deserialize)]
struct RelatedPlaylists {
    uploads: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaylistItemListResponse {
    items: Option<Vec<PlaylistItemResource>>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaylistItemResource {
    content_details: PlaylistItemContentDetails,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaylistItemContentDetails {
    video_id: String,
}

#[derive(Debug, Deserialize)]
struct VideoListResponse {
    items: Option<Vec<VideoResource>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoResource {
    id: String,
    snippet: VideoSnippet,
    statistics: Option<VideoStatistics>,
    content_details: Option<VideoContentDetails>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoSnippet {
    title: String,
    published_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoStatistics {
    /// Counts arrive as strings; hidden counts are absent.
    view_count: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VideoContentDetails {
    duration: String,
}

impl VideoResource {
    fn into_record(self) -> VideoRecord {
        let view_count = self
            .statistics
            .and_then(|s| s.view_count)
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(0);

        let duration_seconds = match self.content_details {
            Some(details) => parse_iso8601_duration(&details.duration).unwrap_or_else(|| {
                warn!(video_id = %self.id, duration = %details.duration, "unparseable duration");
                0
            }),
            None => 0,
        };

        VideoRecord {
            id: self.id,
            title: self.snippet.title,
            published_at: self.snippet.published_at,
            duration_seconds,
            view_count,
        }
    }
}
