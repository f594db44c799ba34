use std::time::Duration;

use trackpath::{ClientConfig, DetectionClient, Error};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> DetectionClient {
    DetectionClient::new(ClientConfig {
        base_url: server.uri(),
        timeout: Duration::from_secs(5),
        max_retries: 1,
    })
    .unwrap()
}

#[tokio::test]
async fn fetches_and_builds_store() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/videos/task-1/trajectories"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"{"detections":[
                {"frame":0,"boxes":[{"id":1,"x":0,"y":0},{"id":2,"x":"bad","y":0}]},
                {"frame":12,"boxes":[{"id":1,"x":3,"y":4}]}
            ]}"#,
        ))
        .mount(&server)
        .await;

    let store = client(&server).fetch_store("task-1").await;

    assert_eq!(store.total_frames(), 12);
    assert_eq!(store.len(), 1);
    assert_eq!(store.get("1").map(|p| p.len()), Some(2));
}

#[tokio::test]
async fn backend_errors_give_empty_store() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/videos/task-2/trajectories"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = client(&server);

    let err = client.fetch_detections("task-2").await.unwrap_err();
    assert!(matches!(err, Error::Status { status: 500, .. }));

    let store = client.fetch_store("task-2").await;
    assert!(store.is_empty());
    assert_eq!(store.total_frames(), 0);
}

#[tokio::test]
async fn unreachable_backend_gives_empty_store() {
    let client = DetectionClient::new(ClientConfig {
        base_url: "http://127.0.0.1:9".into(),
        timeout: Duration::from_secs(2),
        max_retries: 0,
    })
    .unwrap();

    assert!(client.fetch_store("task-3").await.is_empty());
}

#[tokio::test]
async fn fetches_metrics() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/videos/task-4/metrics"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"{"processed_resolution":{"width":640,"height":360},"processed_fps":15.0,"frames":120}"#,
        ))
        .mount(&server)
        .await;

    let metrics = client(&server).fetch_metrics("task-4").await.unwrap();

    assert_eq!(metrics.resolution().width, 640);
    assert_eq!(metrics.frames_per_second(), Some(15.0));
}
