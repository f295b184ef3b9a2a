//! Tests for the GitHub REST client against a local mock server.

use super::*;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> GithubClient {
    GithubClient::new("spair", "widget", "test_token_123", "RepoXBot-Test-Agent")
        .expect("client construction should succeed")
        .with_base_url(Url::parse(&server.uri()).unwrap().join("/").unwrap())
}

// ============================================================================
// Test: File Contents
// ============================================================================

#[tokio::test]
async fn test_get_file_decodes_content_and_sha() {
    let server = MockServer::start().await;

    // The contents API wraps base64 at 60 columns
    let wrapped = format!(
        "{}\n{}",
        &BASE64.encode(b"# Changelog\n\n## 1.0.0\n")[..20],
        &BASE64.encode(b"# Changelog\n\n## 1.0.0\n")[20..]
    );
    Mock::given(method("GET"))
        .and(path("/repos/spair/widget/contents/CHANGELOG.md"))
        .and(header("authorization", "token test_token_123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "content": wrapped,
            "sha": "abc123def456",
            "encoding": "base64",
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let file = client
        .get_file("CHANGELOG.md")
        .await
        .expect("request should succeed")
        .expect("file should exist");

    assert_eq!(file.content, "# Changelog\n\n## 1.0.0\n");
    assert_eq!(file.sha, "abc123def456");
}

#[tokio::test]
async fn test_get_file_returns_none_for_missing_file() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/repos/spair/widget/contents/.repoxbot.config.json"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let file = client
        .get_file(".repoxbot.config.json")
        .await
        .expect("404 is not an error");

    assert!(file.is_none());
}

#[tokio::test]
async fn test_get_file_maps_server_error_to_transient() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/repos/spair/widget/contents/CHANGELOG.md"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let error = client
        .get_file("CHANGELOG.md")
        .await
        .expect_err("503 should be an error");

    assert!(matches!(error, ApiError::Http { status: 503, .. }));
    assert!(error.is_transient());
}

#[tokio::test]
async fn test_put_file_sends_encoded_content_and_prior_sha() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/repos/spair/widget/contents/CHANGELOG.md"))
        .and(body_json(serde_json::json!({
            "message": "chore: update changelog",
            "content": BASE64.encode(b"new content"),
            "sha": "prior_sha_value",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "content": {"sha": "next_sha"},
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let result = client
        .put_file(&FileUpdateRequest {
            path: "CHANGELOG.md".to_string(),
            content: "new content".to_string(),
            prior_sha: Some("prior_sha_value".to_string()),
            message: "chore: update changelog".to_string(),
        })
        .await;

    assert!(result.is_ok());
}

#[tokio::test]
async fn test_put_file_conflict_is_not_transient() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/repos/spair/widget/contents/CHANGELOG.md"))
        .respond_with(ResponseTemplate::new(409))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let error = client
        .put_file(&FileUpdateRequest {
            path: "CHANGELOG.md".to_string(),
            content: "new content".to_string(),
            prior_sha: Some("stale_sha".to_string()),
            message: "chore: update changelog".to_string(),
        })
        .await
        .expect_err("stale SHA should conflict");

    assert!(matches!(error, ApiError::Conflict { ref path } if path == "CHANGELOG.md"));
    assert!(!error.is_transient());
}

// ============================================================================
// Test: Labels
// ============================================================================

#[tokio::test]
async fn test_list_labels_extracts_names() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/repos/spair/widget/issues/42/labels"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {"id": 1, "name": "bug", "color": "d73a4a"},
            {"id": 2, "name": "documentation", "color": "0075ca"},
        ])))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let labels = client.list_labels(42).await.expect("request should succeed");

    assert_eq!(labels, vec!["bug".to_string(), "documentation".to_string()]);
}

#[tokio::test]
async fn test_add_labels_posts_label_list() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/repos/spair/widget/issues/42/labels"))
        .and(body_json(serde_json::json!({
            "labels": ["bug", "needs-review"],
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let result = client
        .add_labels(&LabelUpdateRequest {
            number: 42,
            labels: vec!["bug".to_string(), "needs-review".to_string()],
        })
        .await;

    assert!(result.is_ok());
}

#[tokio::test]
async fn test_rate_limit_response_maps_to_rate_limited() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/repos/spair/widget/issues/42/labels"))
        .respond_with(
            ResponseTemplate::new(403).insert_header("x-ratelimit-remaining", "0"),
        )
        .mount(&server)
        .await;

    let client = client_for(&server);
    let error = client.list_labels(42).await.expect_err("should rate limit");

    assert!(matches!(error, ApiError::RateLimited));
    assert!(error.is_transient());
}

// ============================================================================
// Test: Comments
// ============================================================================

#[tokio::test]
async fn test_list_comments_flattens_author_login() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/repos/spair/widget/issues/7/comments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {"id": 100, "body": "LGTM", "user": {"login": "reviewer1"}},
            {"id": 101, "body": "Please update the changelog", "user": {"login": "repoxbot"}},
        ])))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let comments = client.list_comments(7).await.expect("request should succeed");

    assert_eq!(comments.len(), 2);
    assert_eq!(comments[0].author, "reviewer1");
    assert_eq!(comments[1].body, "Please update the changelog");
}

#[tokio::test]
async fn test_create_comment_posts_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/repos/spair/widget/issues/7/comments"))
        .and(body_json(serde_json::json!({
            "body": "Changelog entry is missing.",
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({"id": 200})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let result = client
        .create_comment(&CommentUpdateRequest {
            number: 7,
            body: "Changelog entry is missing.".to_string(),
        })
        .await;

    assert!(result.is_ok());
}

// ============================================================================
// Test: Pull Request Diffs
// ============================================================================

#[tokio::test]
async fn test_get_pull_diff_requests_diff_media_type() {
    let server = MockServer::start().await;

    let diff = "diff --git a/CHANGELOG.md b/CHANGELOG.md\n+- Fix widget (#42)\n";
    Mock::given(method("GET"))
        .and(path("/repos/spair/widget/pulls/42"))
        .and(header("accept", DIFF_MEDIA_TYPE))
        .respond_with(ResponseTemplate::new(200).set_body_string(diff))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let body = client.get_pull_diff(42).await.expect("request should succeed");

    assert_eq!(body, diff);
}

// ============================================================================
// Test: Debug Output Security
// ============================================================================

#[test]
fn test_debug_output_does_not_expose_token() {
    let client = GithubClient::new("spair", "widget", "ghp_supersecret", "RepoXBot-Test-Agent")
        .expect("client construction should succeed");

    let debug_output = format!("{:?}", client);

    assert!(!debug_output.contains("ghp_supersecret"));
    assert!(debug_output.contains("REDACTED"));
}
