use std::sync::Arc;

use crate::domain::config::ReportConfig;
use crate::domain::sources::VideoSource;
use crate::infrastructure::youtube::YouTubeClient;

/// Everything that varies between production and test environments.
pub struct AppStateConfig {
    pub youtube_api_url: String,
    /// Used when the form leaves the API key blank.
    pub default_api_key: Option<String>,
    pub report_defaults: ReportConfig,
}

#[derive(Clone)]
pub struct AppState {
    pub video_source: Arc<dyn VideoSource>,
    pub default_api_key: Option<String>,
    pub report_defaults: ReportConfig,
}

impl AppState {
    pub fn from_config(config: AppStateConfig) -> anyhow::Result<Self> {
        let client = YouTubeClient::new(&config.youtube_api_url)?;
        Ok(Self::with_source(Arc::new(client), config))
    }

    /// Build state around an arbitrary video source.
    pub fn with_source(video_source: Arc<dyn VideoSource>, config: AppStateConfig) -> Self {
        Self {
            video_source,
            default_api_key: config.default_api_key.filter(|k| !k.trim().is_empty()),
            report_defaults: config.report_defaults,
        }
    }

    /// The key typed into the form, falling back to the server's default.
    pub fn api_key_for(&self, submitted: Option<&str>) -> Option<String> {
        submitted
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(str::to_string)
            .or_else(|| self.default_api_key.clone())
    }
}
