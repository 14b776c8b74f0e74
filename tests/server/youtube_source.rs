use std::time::{Duration, Instant};

use serde_json::{Value, json};
use tubestats::domain::sources::{ChannelRef, VideoSource};
use tubestats::infrastructure::youtube::YouTubeClient;
use wiremock::matchers::{method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

use crate::helpers::{TEST_API_KEY, client, spawn_app_with_youtube_mock};

fn video_resource(id: &str, published_at: &str, duration: &str, views: Option<&str>) -> Value {
    let mut statistics = json!({});
    if let Some(views) = views {
        statistics["viewCount"] = json!(views);
    }
    json!({
        "id": id,
        "snippet": { "title": format!("Title {id}"), "publishedAt": published_at },
        "statistics": statistics,
        "contentDetails": { "duration": duration }
    })
}

/// Answers a `videos` call with one resource per requested id, after `delay`.
struct EchoVideos {
    delay: Duration,
}

impl Respond for EchoVideos {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let ids = request
            .url
            .query_pairs()
            .find(|(key, _)| key == "id")
            .map(|(_, value)| value.into_owned())
            .unwrap_or_default();
        let items: Vec<Value> = ids
            .split(',')
            .map(|id| video_resource(id, "2024-01-05T10:00:00Z", "PT1M", Some("10")))
            .collect();
        ResponseTemplate::new(200)
            .set_body_json(json!({ "items": items }))
            .set_delay(self.delay)
    }
}

async fn mount_channel(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/youtube/v3/channels"))
        .and(query_param("forHandle", "@somechannel"))
        .and(query_param("key", TEST_API_KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{ "contentDetails": { "relatedPlaylists": { "uploads": "UU123" } } }]
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/youtube/v3/playlistItems"))
        .and(query_param("playlistId", "UU123"))
        .and(query_param_is_missing("pageToken"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [
                { "contentDetails": { "videoId": "v1" } },
                { "contentDetails": { "videoId": "v2" } }
            ],
            "nextPageToken": "page-2"
        })))
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/youtube/v3/playlistItems"))
        .and(query_param("pageToken", "page-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [
                { "contentDetails": { "videoId": "v2" } },
                { "contentDetails": { "videoId": "v3" } }
            ]
        })))
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/youtube/v3/videos"))
        .and(query_param("id", "v1,v2,v3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [
                video_resource("v1", "2024-01-05T10:00:00Z", "PT45S", Some("1500")),
                video_resource("v2", "2024-02-10T10:00:00Z", "PT1H2M3S", Some("98000")),
                video_resource("v3", "2024-02-20T10:00:00Z", "PT3M", None)
            ]
        })))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn client_follows_pages_and_drops_duplicates() {
    let server = MockServer::start().await;
    mount_channel(&server).await;

    let youtube = YouTubeClient::new(&format!("{}/youtube/v3", server.uri()))
        .expect("Failed to build client");
    let channel = ChannelRef::parse("@somechannel").expect("valid handle");

    let videos = youtube
        .channel_videos(TEST_API_KEY, &channel)
        .await
        .expect("Failed to fetch videos");

    let ids: Vec<&str> = videos.iter().map(|v| v.id.as_str()).collect();
    assert_eq!(ids, vec!["v1", "v2", "v3"]);
    assert_eq!(videos[1].duration_seconds, 3_723);
    assert_eq!(videos[2].duration_seconds, 180);
    assert_eq!(videos[2].view_count, 0, "hidden view counts become zero");
}

#[tokio::test]
async fn channel_report_through_the_api() {
    let app = spawn_app_with_youtube_mock().await;
    mount_channel(app.mock_server.as_ref().unwrap()).await;

    let response = client()
        .post(app.api_url("/channel-report"))
        .json(&json!({ "channel": "youtube.com/@somechannel" }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), 200);
    let report: Value = response.json().await.expect("invalid JSON body");

    let categories: Vec<&str> = report["all_videos"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["category"].as_str().unwrap())
        .collect();
    assert_eq!(categories, vec!["Short", "Long", "Short"]);

    let months = report["monthly_summary"].as_array().unwrap();
    assert_eq!(months.len(), 2);
    assert_eq!(months[1]["videos"], 2);
    assert_eq!(months[1]["total_views"], 98_000);

    assert_eq!(report["top_videos"][0]["id"], "v2");
}

#[tokio::test]
async fn quota_errors_surface_as_bad_gateway() {
    let app = spawn_app_with_youtube_mock().await;
    let server = app.mock_server.as_ref().unwrap();

    Mock::given(method("GET"))
        .and(path("/youtube/v3/channels"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "error": { "code": 403, "message": "The request cannot be completed because you have exceeded your quota." }
        })))
        .mount(server)
        .await;

    let response = client()
        .post(app.api_url("/channel-report"))
        .json(&json!({ "channel": "@somechannel" }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), 502);
    let body: Value = response.json().await.expect("invalid JSON body");
    let message = body["error"].as_str().unwrap();
    assert!(message.contains("403"));
    assert!(message.contains("exceeded your quota"));
}

#[tokio::test]
async fn channel_without_items_is_not_found() {
    let app = spawn_app_with_youtube_mock().await;
    let server = app.mock_server.as_ref().unwrap();

    Mock::given(method("GET"))
        .and(path("/youtube/v3/channels"))
        .and(query_param("id", "UCmissing"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "items": [] })))
        .mount(server)
        .await;

    let response = client()
        .post(app.api_url("/channel-report"))
        .json(&json!({ "channel": "https://www.youtube.com/channel/UCmissing" }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn detail_batches_are_limited_and_keep_order() {
    let server = MockServer::start().await;
    let delay = Duration::from_millis(100);
    Mock::given(method("GET"))
        .and(path("/youtube/v3/videos"))
        .respond_with(EchoVideos { delay })
        .expect(12)
        .mount(&server)
        .await;

    let youtube = YouTubeClient::new(&format!("{}/youtube/v3", server.uri()))
        .expect("Failed to build client");
    let ids: Vec<String> = (0..600).map(|n| format!("id-{n:03}")).collect();

    let started = Instant::now();
    let videos = youtube
        .video_details(TEST_API_KEY, &ids)
        .await
        .expect("Failed to fetch details");
    let elapsed = started.elapsed();

    let returned: Vec<&str> = videos.iter().map(|v| v.id.as_str()).collect();
    assert_eq!(returned, ids.iter().map(String::as_str).collect::<Vec<_>>());
    // 12 batches, 5 at a time, need at least three rounds.
    assert!(elapsed >= delay * 3, "batches ran unbounded in {elapsed:?}");
}

#[tokio::test]
async fn legacy_user_url_resolves_by_username() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/youtube/v3/channels"))
        .and(query_param("forUsername", "oldname"))
        .and(query_param_is_missing("forHandle"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{ "contentDetails": { "relatedPlaylists": { "uploads": "UUold" } } }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let youtube = YouTubeClient::new(&format!("{}/youtube/v3", server.uri()))
        .expect("Failed to build client");
    let channel = ChannelRef::parse("https://www.youtube.com/user/oldname").expect("valid URL");

    let playlist = youtube
        .uploads_playlist(TEST_API_KEY, &channel)
        .await
        .expect("Failed to resolve channel");

    assert_eq!(playlist, "UUold");
}

#[tokio::test]
async fn custom_channel_url_is_rejected_before_fetching() {
    let app = spawn_app_with_youtube_mock().await;

    let response = client()
        .post(app.api_url("/channel-report"))
        .json(&json!({ "channel": "https://www.youtube.com/c/SomeCreator" }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.expect("invalid JSON body");
    assert!(body["error"].as_str().unwrap().contains("custom channel URL"));
    let received = app
        .mock_server
        .as_ref()
        .unwrap()
        .received_requests()
        .await
        .unwrap_or_default();
    assert!(received.is_empty());
}
