//! Video catalog integration tests.

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::{TestServer, body_json, send};
use tower::ServiceExt;

const BOUNDARY: &str = "telestream-test-boundary";

/// Build a multipart upload body with the standard four fields.
fn multipart_body(title: &str, description: Option<&str>, video: &[u8], thumb: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    let mut text_part = |name: &str, value: &str| {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\ncontent-disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    };
    text_part("title", title);
    if let Some(description) = description {
        text_part("description", description);
    }

    for (name, filename, data) in [("video", "clip.mp4", video), ("thumbnail", "thumb.jpg", thumb)]
    {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\ncontent-disposition: form-data; name=\"{name}\"; \
                 filename=\"{filename}\"\r\ncontent-type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

async fn upload(
    server: &TestServer,
    token: &str,
    title: &str,
    description: Option<&str>,
) -> axum::http::Response<Body> {
    let body = multipart_body(title, description, b"fake mp4 payload", b"fake jpg payload");
    let request = Request::builder()
        .method("POST")
        .uri("/v1/videos")
        .header("authorization", format!("Bearer {token}"))
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap();
    server.router.clone().oneshot(request).await.unwrap()
}

#[tokio::test]
async fn upload_requires_authentication() {
    let server = TestServer::new().await;
    let body = multipart_body("My clip", None, b"v", b"t");
    let request = Request::builder()
        .method("POST")
        .uri("/v1/videos")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap();

    let response = server.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn upload_then_fetch_round_trip() {
    let server = TestServer::new().await;
    let (token, user_id) = server.signup_and_login("alice").await;

    let response = upload(&server, &token, "My first clip", Some("a description")).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    assert_eq!(created["title"], "My first clip");
    assert_eq!(created["description"], "a description");
    assert_eq!(created["user_id"], user_id.to_string());
    assert_eq!(created["views"], 0);
    assert_eq!(created["likes"], 0);
    assert!(created["video_url"].as_str().unwrap().ends_with(".mp4"));

    let video_id = created["video_id"].as_str().unwrap().to_string();
    let response = send(
        &server.router,
        "GET",
        &format!("/v1/videos/{video_id}"),
        None,
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = send(&server.router, "GET", "/v1/videos", None, None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let list = body_json(response).await;
    assert_eq!(list.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn upload_without_title_is_rejected() {
    let server = TestServer::new().await;
    let (token, _) = server.signup_and_login("bob").await;

    let response = upload(&server, &token, "   ", None).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn like_toggles_per_user() {
    let server = TestServer::new().await;
    let (owner_token, _) = server.signup_and_login("carol").await;
    let (viewer_token, _) = server.signup_and_login("dave").await;

    let created = body_json(upload(&server, &owner_token, "clip", None).await).await;
    let video_id = created["video_id"].as_str().unwrap().to_string();
    let like_uri = format!("/v1/videos/{video_id}/like");

    let body = body_json(send(&server.router, "POST", &like_uri, Some(&viewer_token), None).await)
        .await;
    assert_eq!(body["liked"], true);
    assert_eq!(body["likes"], 1);

    // Second like from the same user removes it
    let body = body_json(send(&server.router, "POST", &like_uri, Some(&viewer_token), None).await)
        .await;
    assert_eq!(body["liked"], false);
    assert_eq!(body["likes"], 0);

    // Two different users can both like
    send(&server.router, "POST", &like_uri, Some(&viewer_token), None).await;
    let body = body_json(send(&server.router, "POST", &like_uri, Some(&owner_token), None).await)
        .await;
    assert_eq!(body["likes"], 2);
}

#[tokio::test]
async fn views_increment_per_playback() {
    let server = TestServer::new().await;
    let (token, _) = server.signup_and_login("erin").await;
    let created = body_json(upload(&server, &token, "clip", None).await).await;
    let video_id = created["video_id"].as_str().unwrap().to_string();
    let view_uri = format!("/v1/videos/{video_id}/view");

    for expected in 1..=3 {
        let body = body_json(send(&server.router, "POST", &view_uri, None, None).await).await;
        assert_eq!(body["views"], expected);
    }

    let response = send(
        &server.router,
        "POST",
        &format!("/v1/videos/{}/view", uuid::Uuid::new_v4()),
        None,
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn search_covers_titles_and_channels() {
    let server = TestServer::new().await;
    let (token, _) = server.signup_and_login("frank").await;
    upload(&server, &token, "Rust tutorial", None).await;
    upload(&server, &token, "Cooking show", None).await;

    // Blank keyword
    for uri in ["/v1/videos/search", "/v1/videos/search?keyword=%20"] {
        let response = send(&server.router, "GET", uri, None, None).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "uri: {uri}");
    }

    // No match at all
    let response = send(
        &server.router,
        "GET",
        "/v1/videos/search?keyword=zzzzz",
        None,
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Title match
    let response = send(
        &server.router,
        "GET",
        "/v1/videos/search?keyword=rust",
        None,
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["videos"].as_array().unwrap().len(), 1);
    assert_eq!(body["videos"][0]["title"], "Rust tutorial");

    // Channel match with no video match
    let response = send(
        &server.router,
        "GET",
        "/v1/videos/search?keyword=frank",
        None,
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert!(body["videos"].as_array().unwrap().is_empty());
    assert_eq!(body["channels"][0]["channel"], "frank-channel");
}

#[tokio::test]
async fn only_the_owner_can_delete() {
    let server = TestServer::new().await;
    let (owner_token, _) = server.signup_and_login("grace").await;
    let (other_token, _) = server.signup_and_login("heidi").await;

    let created = body_json(upload(&server, &owner_token, "clip", None).await).await;
    let video_id = created["video_id"].as_str().unwrap().to_string();
    let uri = format!("/v1/videos/{video_id}");

    let response = send(&server.router, "DELETE", &uri, Some(&other_token), None).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = send(&server.router, "DELETE", &uri, Some(&owner_token), None).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = send(&server.router, "GET", &uri, None, None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
