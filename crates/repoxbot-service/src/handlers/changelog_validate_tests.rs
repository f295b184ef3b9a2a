//! Tests for the changelog validation handler.

use super::*;
use repoxbot_core::remote_config::ChangelogConfig;
use repoxbot_core::{EventId, PullRequestAction, PullRequestEvent, RepoXBotConfig};
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const AGENT: &str = "RepoXBot-Automation-Agent";

fn handler_for(server: &MockServer) -> ChangelogValidateHandler {
    let client = GithubClient::new("spair", "widget", "test_token", "RepoXBot-Test-Agent")
        .expect("client construction should succeed")
        .with_base_url(Url::parse(&server.uri()).unwrap().join("/").unwrap());
    ChangelogValidateHandler::new(client, AGENT)
}

fn opened_pr_envelope() -> Envelope {
    let config = RepoXBotConfig {
        changelog: ChangelogConfig {
            validate: true,
            ..ChangelogConfig::default()
        },
        ..RepoXBotConfig::default()
    };
    Envelope {
        event_id: EventId::new(),
        event: Event::PullRequest(PullRequestEvent {
            action: PullRequestAction::Opened,
            number: 42,
            title: "Add widget".to_string(),
            body: String::new(),
            author: "octocat".to_string(),
            head_sha: "abc123".to_string(),
            head_ref: "feature/widget".to_string(),
            diff_url: "https://example.test/42.diff".to_string(),
            html_url: "https://example.test/pull/42".to_string(),
            merged: false,
        }),
        config,
    }
}

async fn mount_diff(server: &MockServer, diff: &str) {
    Mock::given(method("GET"))
        .and(path("/repos/spair/widget/pulls/42"))
        .respond_with(ResponseTemplate::new(200).set_body_string(diff.to_string()))
        .mount(server)
        .await;
}

async fn mount_comments(server: &MockServer, comments: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/repos/spair/widget/issues/42/comments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(comments))
        .mount(server)
        .await;
}

// ============================================================================
// Test: Reminder Posting
// ============================================================================

#[tokio::test]
async fn test_posts_reminder_when_changelog_untouched() {
    let server = MockServer::start().await;
    mount_diff(
        &server,
        "diff --git a/src/widget.rs b/src/widget.rs\n+++ b/src/widget.rs\n+fn widget() {}\n",
    )
    .await;
    mount_comments(&server, serde_json::json!([])).await;

    Mock::given(method("POST"))
        .and(path("/repos/spair/widget/issues/42/comments"))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({"id": 1})))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = handler_for(&server)
        .handle(&opened_pr_envelope())
        .await
        .expect("handler should succeed");

    assert_eq!(outcome, HandlerOutcome::Completed);

    // The posted body carries the dedup marker and names the expected file
    let requests = server.received_requests().await.unwrap();
    let post = requests
        .iter()
        .find(|r| r.method.as_str() == "POST")
        .expect("a comment should have been posted");
    let body: serde_json::Value = serde_json::from_slice(&post.body).unwrap();
    let text = body["body"].as_str().unwrap();
    assert!(text.contains(&format!("<!-- {}: changelog-validate -->", AGENT)));
    assert!(text.contains("CHANGELOG.md"));
}

// ============================================================================
// Test: Skips
// ============================================================================

#[tokio::test]
async fn test_skips_when_diff_modifies_changelog() {
    let server = MockServer::start().await;
    mount_diff(
        &server,
        "diff --git a/CHANGELOG.md b/CHANGELOG.md\n--- a/CHANGELOG.md\n+++ b/CHANGELOG.md\n+- Add widget (#42)\n",
    )
    .await;

    let outcome = handler_for(&server)
        .handle(&opened_pr_envelope())
        .await
        .expect("handler should succeed");

    assert!(matches!(outcome, HandlerOutcome::Skipped { .. }));
    // Only the diff was fetched; comments were never touched
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_skips_when_reminder_already_posted() {
    let server = MockServer::start().await;
    mount_diff(
        &server,
        "diff --git a/src/widget.rs b/src/widget.rs\n+++ b/src/widget.rs\n",
    )
    .await;
    mount_comments(
        &server,
        serde_json::json!([
            {
                "id": 1,
                "body": format!("<!-- {}: changelog-validate -->\nThis pull request does not modify `CHANGELOG.md`.", AGENT),
                "user": {"login": "repoxbot"}
            }
        ]),
    )
    .await;

    let outcome = handler_for(&server)
        .handle(&opened_pr_envelope())
        .await
        .expect("handler should succeed");

    assert!(matches!(outcome, HandlerOutcome::Skipped { .. }));
}

#[tokio::test]
async fn test_unrelated_comments_do_not_suppress_reminder() {
    let server = MockServer::start().await;
    mount_diff(
        &server,
        "diff --git a/src/widget.rs b/src/widget.rs\n+++ b/src/widget.rs\n",
    )
    .await;
    mount_comments(
        &server,
        serde_json::json!([
            {"id": 1, "body": "LGTM", "user": {"login": "reviewer"}}
        ]),
    )
    .await;

    Mock::given(method("POST"))
        .and(path("/repos/spair/widget/issues/42/comments"))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({"id": 2})))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = handler_for(&server)
        .handle(&opened_pr_envelope())
        .await
        .expect("handler should succeed");

    assert_eq!(outcome, HandlerOutcome::Completed);
}

// ============================================================================
// Test: Diff Matching
// ============================================================================

#[test]
fn test_diff_touches_matches_exact_path_only() {
    let diff = "diff --git a/docs/CHANGELOG.md.bak b/docs/CHANGELOG.md.bak\n\
                +++ b/docs/CHANGELOG.md.bak\n";

    assert!(!diff_touches(diff, "CHANGELOG.md"));
}

#[test]
fn test_diff_touches_detects_removal_side() {
    let diff = "--- a/CHANGELOG.md\n+++ /dev/null\n";

    assert!(diff_touches(diff, "CHANGELOG.md"));
}
