use compare_backend::build_rocket;
use compare_backend::config::Settings;
use compare_backend::models::ComparisonResult;
use rocket::http::{ContentType, Status};
use rocket::local::asynchronous::Client;
use serde_json::{json, Value};
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct TestApp {
    client: Client,
    data_dir: TempDir,
}

async fn spawn_app(upstream_uri: String) -> TestApp {
    let data_dir = TempDir::new().unwrap();
    let settings = Settings {
        youtube_api_key: "test-key".to_string(),
        youtube_api_base_url: upstream_uri,
        data_dir: data_dir.path().join("data"),
        port: 0,
        allowed_origins: None,
        upstream_timeout: None,
    };
    let client = Client::tracked(build_rocket(&settings).unwrap())
        .await
        .unwrap();
    TestApp { client, data_dir }
}

async fn mount_search(server: &MockServer, term: &str, total: u64, ids: &[&str]) {
    let items: Vec<Value> = ids
        .iter()
        .map(|id| {
            json!({
                "id": { "kind": "youtube#video", "videoId": id },
                "snippet": { "title": format!("Video {id}"), "publishedAt": "2024-03-01T12:00:00Z" }
            })
        })
        .collect();
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", term))
        .and(query_param("key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "pageInfo": { "totalResults": total, "resultsPerPage": 50 },
            "items": items
        })))
        .expect(1)
        .mount(server)
        .await;
}

async fn mount_videos(server: &MockServer, ids: &[&str], views: &[&str]) {
    let items: Vec<Value> = ids
        .iter()
        .zip(views)
        .map(|(id, views)| {
            json!({
                "id": id,
                "statistics": { "viewCount": views, "likeCount": "1" },
                "snippet": { "title": format!("Video {id}"), "publishedAt": "2024-03-01T12:00:00Z" }
            })
        })
        .collect();
    Mock::given(method("GET"))
        .and(path("/videos"))
        .and(query_param("id", ids.join(",").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "items": items })))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn compare_returns_aggregated_statistics() {
    let server = MockServer::start().await;
    mount_search(&server, "cats", 1_000_000, &["c1", "c2", "c3"]).await;
    mount_search(&server, "dogs", 0, &[]).await;
    mount_videos(&server, &["c1", "c2", "c3"], &["100", "200", "300"]).await;
    let app = spawn_app(server.uri()).await;

    let response = app
        .client
        .get("/api/compare?term1=cats&term2=dogs")
        .dispatch()
        .await;

    assert_eq!(response.status(), Status::Ok);
    let body: Value = response.into_json().await.unwrap();
    assert_eq!(body["term1"], "cats");
    assert_eq!(body["term2"], "dogs");
    assert_eq!(body["totalResults1"], 1_000_000);
    assert_eq!(body["totalResults2"], 0);
    assert_eq!(body["stats1"]["totalViews"], 600);
    assert_eq!(body["stats1"]["totalLikes"], 3);
    assert_eq!(body["stats1"]["count"], 3);
    assert_eq!(body["stats1"]["videos"][0]["videoId"], "c1");
    assert_eq!(body["stats1"]["videos"][2]["viewCount"], 300);
    assert_eq!(body["stats2"]["totalViews"], 0);
    assert_eq!(body["stats2"]["count"], 0);
    assert_eq!(body["stats2"]["videos"], json!([]));
}

#[tokio::test]
async fn compare_without_both_terms_is_bad_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    let app = spawn_app(server.uri()).await;

    for uri in [
        "/api/compare",
        "/api/compare?term1=cats",
        "/api/compare?term2=dogs",
        "/api/compare?term1=&term2=dogs",
    ] {
        let response = app.client.get(uri).dispatch().await;
        assert_eq!(response.status(), Status::BadRequest, "{uri}");
        let body: Value = response.into_json().await.unwrap();
        assert_eq!(body, json!({ "error": "Both term1 and term2 are required" }));
    }
}

#[tokio::test]
async fn compare_surfaces_upstream_error_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": { "code": 400, "message": "API key not valid. Please pass a valid API key." }
        })))
        .mount(&server)
        .await;
    let app = spawn_app(server.uri()).await;

    let response = app
        .client
        .get("/api/compare?term1=cats&term2=dogs")
        .dispatch()
        .await;

    assert_eq!(response.status(), Status::InternalServerError);
    let body: Value = response.into_json().await.unwrap();
    assert_eq!(
        body,
        json!({ "error": "API key not valid. Please pass a valid API key." })
    );
}

#[tokio::test]
async fn compare_fails_when_statistics_call_fails() {
    let server = MockServer::start().await;
    mount_search(&server, "cats", 1, &["c1"]).await;
    mount_search(&server, "dogs", 0, &[]).await;
    Mock::given(method("GET"))
        .and(path("/videos"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    let app = spawn_app(server.uri()).await;

    let response = app
        .client
        .get("/api/compare?term1=cats&term2=dogs")
        .dispatch()
        .await;

    assert_eq!(response.status(), Status::InternalServerError);
    let body: Value = response.into_json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("503"));
    assert!(body.get("stats1").is_none());
}

#[tokio::test]
async fn saved_comparison_is_listed_and_loads_back() {
    let app = spawn_app("http://127.0.0.1:9".to_string()).await;
    let comparison = json!({
        "term1": "cats",
        "term2": "dogs",
        "totalResults1": 3,
        "totalResults2": 0,
        "stats1": {
            "totalViews": 600, "totalLikes": 3, "count": 3,
            "videos": [
                { "videoId": "c1", "title": "Video c1", "viewCount": 100, "likeCount": 1, "publishedAt": "2024-03-01T12:00:00Z" },
                { "videoId": "c2", "title": "Video c2", "viewCount": 200, "likeCount": 1, "publishedAt": "2024-03-01T12:00:00Z" },
                { "videoId": "c3", "title": "Video c3", "viewCount": 300, "likeCount": 1, "publishedAt": "2024-03-01T12:00:00Z" }
            ]
        },
        "stats2": { "totalViews": 0, "totalLikes": 0, "count": 0, "videos": [] }
    });

    let mut saved = Vec::new();
    for _ in 0..2 {
        let response = app
            .client
            .post("/api/save-json")
            .header(ContentType::JSON)
            .body(comparison.to_string())
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);
        let body: Value = response.into_json().await.unwrap();
        let filename = body["filename"].as_str().unwrap().to_string();
        assert!(filename.starts_with("comparison-cats-vs-dogs-"));
        assert!(filename.ends_with(".json"));
        saved.push(filename);
    }
    assert_ne!(saved[0], saved[1]);

    let response = app.client.get("/api/list-json").dispatch().await;
    assert_eq!(response.status(), Status::Ok);
    let listed: Vec<String> = response.into_json().await.unwrap();
    assert!(saved.iter().all(|name| listed.contains(name)));

    let response = app
        .client
        .get(format!("/api/load-json/{}", saved[0]))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);
    let loaded: ComparisonResult = response.into_json().await.unwrap();
    let expected: ComparisonResult = serde_json::from_value(comparison).unwrap();
    assert_eq!(loaded, expected);
}

#[tokio::test]
async fn arbitrary_json_can_be_saved() {
    let app = spawn_app("http://127.0.0.1:9".to_string()).await;

    let response = app
        .client
        .post("/api/save-json")
        .header(ContentType::JSON)
        .body(r#"[1, 2, 3]"#)
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);
    let body: Value = response.into_json().await.unwrap();
    let filename = body["filename"].as_str().unwrap();

    let response = app
        .client
        .get(format!("/api/load-json/{filename}"))
        .dispatch()
        .await;
    let loaded: Value = response.into_json().await.unwrap();
    assert_eq!(loaded, json!([1, 2, 3]));
}

#[tokio::test]
async fn loading_missing_file_is_not_found() {
    let app = spawn_app("http://127.0.0.1:9".to_string()).await;

    let response = app
        .client
        .get("/api/load-json/nonexistent.json")
        .dispatch()
        .await;

    assert_eq!(response.status(), Status::NotFound);
    let body: Value = response.into_json().await.unwrap();
    assert_eq!(body, json!({ "error": "Failed to load JSON" }));
}

#[tokio::test]
async fn loading_outside_the_archive_is_refused() {
    let app = spawn_app("http://127.0.0.1:9".to_string()).await;
    std::fs::write(app.data_dir.path().join("secret.json"), r#"{"secret":true}"#).unwrap();

    let response = app
        .client
        .get("/api/load-json/..%2Fsecret.json")
        .dispatch()
        .await;

    assert_eq!(response.status(), Status::NotFound);
}

#[tokio::test]
async fn loading_corrupt_file_is_server_error() {
    let app = spawn_app("http://127.0.0.1:9".to_string()).await;
    std::fs::write(
        app.data_dir.path().join("data").join("broken.json"),
        "{ definitely not json",
    )
    .unwrap();

    let response = app.client.get("/api/load-json/broken.json").dispatch().await;

    assert_eq!(response.status(), Status::InternalServerError);
    let body: Value = response.into_json().await.unwrap();
    assert_eq!(body, json!({ "error": "Failed to load JSON" }));
}

#[tokio::test]
async fn storage_failures_are_server_errors() {
    let app = spawn_app("http://127.0.0.1:9".to_string()).await;
    std::fs::remove_dir_all(app.data_dir.path().join("data")).unwrap();

    let response = app
        .client
        .post("/api/save-json")
        .header(ContentType::JSON)
        .body(r#"{"term1":"a","term2":"b"}"#)
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::InternalServerError);
    let body: Value = response.into_json().await.unwrap();
    assert_eq!(body, json!({ "error": "Failed to save JSON" }));

    let response = app.client.get("/api/list-json").dispatch().await;
    assert_eq!(response.status(), Status::InternalServerError);
    let body: Value = response.into_json().await.unwrap();
    assert_eq!(body, json!({ "error": "Failed to list JSON files" }));
}
