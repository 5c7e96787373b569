//! Playback gateway integration tests.

mod common;

use axum::http::StatusCode;
use axum::{body::Body, http::Request};
use common::media::MockMediaStore;
use common::{TestServer, body_bytes, body_json};
use tower::ServiceExt;

async fn play(
    server: &TestServer,
    uri: &str,
    range: Option<&str>,
) -> axum::http::Response<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(range) = range {
        builder = builder.header("range", range);
    }
    let request = builder.body(Body::empty()).unwrap();
    server.router.clone().oneshot(request).await.unwrap()
}

fn header<'a>(response: &'a axum::http::Response<Body>, name: &str) -> &'a str {
    response
        .headers()
        .get(name)
        .unwrap_or_else(|| panic!("missing header {name}"))
        .to_str()
        .unwrap()
}

#[tokio::test]
async fn missing_range_header_is_rejected_without_upstream_calls() {
    let media = MockMediaStore::new(5_000_000);
    let server = TestServer::with_media(media.clone()).await;

    let response = play(&server, "/v1/videos/play?url=clip.mp4", None).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert_eq!(body["code"], "bad_request");
    assert_eq!(media.probes(), 0);
    assert_eq!(media.fetches(), 0);
}

#[tokio::test]
async fn missing_url_is_rejected_without_upstream_calls() {
    let media = MockMediaStore::new(5_000_000);
    let server = TestServer::with_media(media.clone()).await;

    for uri in ["/v1/videos/play", "/v1/videos/play?url="] {
        let response = play(&server, uri, Some("bytes=0-")).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "uri: {uri}");
    }
    assert_eq!(media.probes(), 0);
    assert_eq!(media.fetches(), 0);
}

#[tokio::test]
async fn malformed_range_is_rejected_before_probe() {
    let media = MockMediaStore::new(5_000_000);
    let server = TestServer::with_media(media.clone()).await;

    for range in ["bytes=", "bytes=-500", "items=0-1", "0-100", "bytes=abc-"] {
        let response = play(&server, "/v1/videos/play?url=clip.mp4", Some(range)).await;
        assert_eq!(
            response.status(),
            StatusCode::BAD_REQUEST,
            "range: {range}"
        );
    }
    assert_eq!(media.probes(), 0);
}

#[tokio::test]
async fn first_chunk_of_large_object_is_capped_at_one_mib() {
    let media = MockMediaStore::new(5_000_000);
    let server = TestServer::with_media(media.clone()).await;

    let response = play(&server, "/v1/videos/play?url=clip.mp4", Some("bytes=0-")).await;
    assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
    assert_eq!(header(&response, "content-type"), "video/mp4");
    assert_eq!(header(&response, "accept-ranges"), "bytes");
    assert_eq!(header(&response, "content-length"), "1048576");
    assert_eq!(
        header(&response, "content-range"),
        "bytes 0-1048575/5000000"
    );

    let body = body_bytes(response).await;
    assert_eq!(body.len(), 1_048_576);

    assert_eq!(media.probes(), 1);
    assert_eq!(media.fetches(), 1);
}

#[tokio::test]
async fn tail_chunk_is_clamped_to_object_end() {
    let media = MockMediaStore::new(500_000);
    let server = TestServer::with_media(media.clone()).await;

    let response = play(
        &server,
        "/v1/videos/play?url=clip.mp4",
        Some("bytes=499000-"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
    assert_eq!(header(&response, "content-length"), "1000");
    assert_eq!(
        header(&response, "content-range"),
        "bytes 499000-499999/500000"
    );

    let body = body_bytes(response).await;
    assert_eq!(body.len(), 1_000);
}

#[tokio::test]
async fn client_supplied_end_offset_is_ignored() {
    let media = MockMediaStore::new(5_000_000);
    let server = TestServer::with_media(media.clone()).await;

    // The client asks for 100 bytes; the gateway still serves the capped
    // chunk from the requested start.
    let response = play(&server, "/v1/videos/play?url=clip.mp4", Some("bytes=0-99")).await;
    assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
    assert_eq!(header(&response, "content-length"), "1048576");
    assert_eq!(
        header(&response, "content-range"),
        "bytes 0-1048575/5000000"
    );
}

#[tokio::test]
async fn start_beyond_total_is_416_with_probe_only() {
    let media = MockMediaStore::new(500_000);
    let server = TestServer::with_media(media.clone()).await;

    for range in ["bytes=500000-", "bytes=600000-"] {
        let response = play(&server, "/v1/videos/play?url=clip.mp4", Some(range)).await;
        assert_eq!(
            response.status(),
            StatusCode::RANGE_NOT_SATISFIABLE,
            "range: {range}"
        );
        assert_eq!(header(&response, "content-range"), "bytes */500000");
    }

    assert_eq!(media.probes(), 2);
    assert_eq!(media.fetches(), 0);
}

#[tokio::test]
async fn fetch_failure_after_probe_is_500() {
    let media = MockMediaStore::new(500_000);
    media.fail_fetch();
    let server = TestServer::with_media(media.clone()).await;

    let response = play(&server, "/v1/videos/play?url=clip.mp4", Some("bytes=0-")).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = body_json(response).await;
    assert_eq!(body["code"], "upstream_fetch_failed");

    assert_eq!(media.probes(), 1);
    assert_eq!(media.fetches(), 1);
}

#[tokio::test]
async fn probe_failure_is_500_without_fetch() {
    let media = MockMediaStore::new(500_000);
    media.fail_probe();
    let server = TestServer::with_media(media.clone()).await;

    let response = play(&server, "/v1/videos/play?url=absent.mp4", Some("bytes=0-")).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = body_json(response).await;
    assert_eq!(body["code"], "upstream_fetch_failed");

    assert_eq!(media.probes(), 1);
    assert_eq!(media.fetches(), 0);
}

#[tokio::test]
async fn repeated_requests_serve_identical_windows() {
    let media = MockMediaStore::new(5_000_000);
    let server = TestServer::with_media(media.clone()).await;

    for _ in 0..2 {
        let response = play(
            &server,
            "/v1/videos/play?url=clip.mp4",
            Some("bytes=1048576-"),
        )
        .await;
        assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
        assert_eq!(
            header(&response, "content-range"),
            "bytes 1048576-2097151/5000000"
        );
        assert_eq!(header(&response, "content-length"), "1048576");
    }
    assert_eq!(media.probes(), 2);
    assert_eq!(media.fetches(), 2);
}

#[tokio::test]
async fn gateway_streams_real_bytes_from_filesystem_media() {
    // End-to-end against the filesystem backend instead of the mock.
    let server = TestServer::new().await;
    let data: Vec<u8> = (0..200_000u32).map(|i| (i % 251) as u8).collect();

    let media_root = server.state.config.media.clone();
    let path = match media_root {
        telestream_core::config::MediaConfig::Filesystem { path } => path,
        _ => unreachable!(),
    };
    std::fs::create_dir_all(path.join("videos")).unwrap();
    std::fs::write(path.join("videos/clip.mp4"), &data).unwrap();

    let response = play(
        &server,
        "/v1/videos/play?url=videos/clip.mp4",
        Some("bytes=100000-"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
    assert_eq!(
        header(&response, "content-range"),
        "bytes 100000-199999/200000"
    );

    let body = body_bytes(response).await;
    assert_eq!(body, &data[100_000..]);
}
