use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use reqwest::Client;
use tokio::net::TcpListener;
use tokio::task::AbortHandle;
use tubestats::application::routes::app_router;
use tubestats::application::state::{AppState, AppStateConfig};
use tubestats::domain::config::ReportConfig;
use tubestats::domain::errors::SourceError;
use tubestats::domain::sources::{ChannelRef, VideoSource};
use tubestats::domain::videos::VideoRecord;

pub const TEST_API_KEY: &str = "test-key";

/// Handle that no stub channel answers to.
pub const UNKNOWN_HANDLE: &str = "@nobody";

pub struct TestApp {
    pub address: String,
    /// Calls the stub source received, as `(api_key, channel)`.
    pub calls: Arc<Mutex<Vec<(String, String)>>>,
    pub mock_server: Option<wiremock::MockServer>,
    server_handle: AbortHandle,
}

impl TestApp {
    pub fn api_url(&self, path: &str) -> String {
        format!("{}/api/v1{}", self.address, path)
    }

    pub fn page_url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    pub fn recorded_calls(&self) -> Vec<(String, String)> {
        self.calls.lock().expect("stub call log poisoned").clone()
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        self.server_handle.abort();
    }
}

struct StubSource {
    videos: Vec<VideoRecord>,
    calls: Arc<Mutex<Vec<(String, String)>>>,
}

#[async_trait]
impl VideoSource for StubSource {
    async fn channel_videos(
        &self,
        api_key: &str,
        channel: &ChannelRef,
    ) -> Result<Vec<VideoRecord>, SourceError> {
        self.calls
            .lock()
            .expect("stub call log poisoned")
            .push((api_key.to_string(), channel.to_string()));

        match channel {
            ChannelRef::Handle(handle) if handle == UNKNOWN_HANDLE => {
                Err(SourceError::ChannelNotFound(channel.to_string()))
            }
            _ => Ok(self.videos.clone()),
        }
    }
}

pub fn video(id: &str, (y, m, d): (i32, u32, u32), duration: u64, views: u64) -> VideoRecord {
    VideoRecord {
        id: id.to_string(),
        title: format!("Video {id}"),
        published_at: Utc
            .with_ymd_and_hms(y, m, d, 12, 0, 0)
            .single()
            .expect("valid fixture date"),
        duration_seconds: duration,
        view_count: views,
    }
}

/// Two Shorts and two long videos across January and March 2024.
pub fn sample_videos() -> Vec<VideoRecord> {
    vec![
        video("a", (2024, 1, 5), 45, 1_500),
        video("b", (2024, 1, 20), 600, 12_000),
        video("c", (2024, 3, 2), 180, 800),
        video("d", (2024, 3, 15), 1_200, 250_000),
    ]
}

fn state_config(youtube_api_url: String, default_api_key: Option<&str>) -> AppStateConfig {
    AppStateConfig {
        youtube_api_url,
        default_api_key: default_api_key.map(str::to_string),
        report_defaults: ReportConfig::default(),
    }
}

/// App backed by an in-memory source that always returns [`sample_videos`].
pub async fn spawn_app() -> TestApp {
    spawn_app_with_key(Some(TEST_API_KEY)).await
}

pub async fn spawn_app_with_key(default_api_key: Option<&str>) -> TestApp {
    let calls = Arc::new(Mutex::new(Vec::new()));
    let source = StubSource {
        videos: sample_videos(),
        calls: Arc::clone(&calls),
    };
    let state = AppState::with_source(
        Arc::new(source),
        state_config("http://unused.invalid/".to_string(), default_api_key),
    );

    spawn_state(state, calls, None).await
}

/// App backed by the real YouTube client, pointed at a wiremock server.
pub async fn spawn_app_with_youtube_mock() -> TestApp {
    let mock_server = wiremock::MockServer::start().await;
    let state = AppState::from_config(state_config(
        format!("{}/youtube/v3", mock_server.uri()),
        Some(TEST_API_KEY),
    ))
    .expect("Failed to build app state");

    spawn_state(state, Arc::new(Mutex::new(Vec::new())), Some(mock_server)).await
}

async fn spawn_state(
    state: AppState,
    calls: Arc<Mutex<Vec<(String, String)>>>,
    mock_server: Option<wiremock::MockServer>,
) -> TestApp {
    let app = app_router(state);

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind to random port");

    let local_addr = listener.local_addr().expect("Failed to get local address");
    let address = format!("http://{local_addr}");

    let server_handle = tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
        )
        .await
        .expect("Server failed to start");
    })
    .abort_handle();

    TestApp {
        address,
        calls,
        mock_server,
        server_handle,
    }
}

pub fn client() -> Client {
    Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .expect("Failed to build client")
}
