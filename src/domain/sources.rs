use std::fmt;

use async_trait::async_trait;
use url::Url;

use super::errors::SourceError;
use super::videos::VideoRecord;

/// A channel as typed by a user: a raw id, an `@handle`, or a youtube.com URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelRef {
    Id(String),
    /// Stored with its leading `@`.
    Handle(String),
    /// Legacy `/user/<name>` channel name.
    Username(String),
}

impl ChannelRef {
    pub fn parse(input: &str) -> Result<Self, SourceError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(SourceError::InvalidChannel(
                "channel id or URL is required".to_string(),
            ));
        }

        if trimmed.contains("youtube.com") || trimmed.contains("://") {
            from_url(trimmed)
        } else {
            from_segment(trimmed, trimmed)
        }
    }
}

const CHANNEL_TABS: &[&str] = &[
    "about",
    "featured",
    "playlists",
    "shorts",
    "streams",
    "videos",
];

fn from_url(raw: &str) -> Result<ChannelRef, SourceError> {
    let with_scheme = if raw.contains("://") {
        raw.to_string()
    } else {
        format!("https://{raw}")
    };
    let url = Url::parse(&with_scheme)
        .map_err(|e| SourceError::InvalidChannel(format!("{raw:?}: {e}")))?;

    let mut segments: Vec<&str> = url
        .path_segments()
        .map(|segments| segments.filter(|s| !s.is_empty()).collect())
        .unwrap_or_default();

    // `/channel/<id>/videos` and friends point at a tab of the channel page
    if segments.len() > 1 && segments.last().is_some_and(|tab| CHANNEL_TABS.contains(tab)) {
        segments.pop();
    }

    match segments.as_slice() {
        ["user", name] => {
            check_name(name, raw)?;
            Ok(ChannelRef::Username((*name).to_string()))
        }
        ["c", _] => Err(SourceError::InvalidChannel(format!(
            "{raw:?} is a custom channel URL, which the video API cannot look up; \
             use the channel's @handle or /channel/ URL instead"
        ))),
        [.., last] => from_segment(last, raw),
        [] => Err(SourceError::InvalidChannel(format!(
            "{raw:?} has no channel in its path"
        ))),
    }
}

fn from_segment(segment: &str, raw: &str) -> Result<ChannelRef, SourceError> {
    match segment.strip_prefix('@') {
        Some(name) => {
            check_name(name, raw)?;
            Ok(ChannelRef::Handle(segment.to_string()))
        }
        None => {
            check_name(segment, raw)?;
            Ok(ChannelRef::Id(segment.to_string()))
        }
    }
}

fn check_name(name: &str, raw: &str) -> Result<(), SourceError> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    if valid {
        Ok(())
    } else {
        Err(SourceError::InvalidChannel(format!(
            "{raw:?} is not a channel id, handle or URL"
        )))
    }
}

impl fmt::Display for ChannelRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelRef::Id(id) => f.write_str(id),
            ChannelRef::Handle(handle) => f.write_str(handle),
            ChannelRef::Username(name) => write!(f, "user/{name}"),
        }
    }
}

/// Supplies every upload of a channel, fully materialized and de-duplicated
/// by video id.
#[async_trait]
pub trait VideoSource: Send + Sync {
    async fn channel_videos(
        &self,
        api_key: &str,
        channel: &ChannelRef,
    ) -> Result<Vec<VideoRecord>, SourceError>;
}
