//! Tests for typed event records and kind tagging.

use super::*;

// ============================================================================
// Test: Event Kind Header Parsing
// ============================================================================

#[test]
fn test_event_kind_from_known_headers() {
    assert_eq!(
        EventKind::from_header("pull_request"),
        Some(EventKind::PullRequest)
    );
    assert_eq!(EventKind::from_header("issues"), Some(EventKind::Issues));
}

#[test]
fn test_event_kind_from_unknown_header() {
    // Unknown kinds are acknowledged and dropped at the entry point
    assert_eq!(EventKind::from_header("push"), None);
    assert_eq!(EventKind::from_header("workflow_run"), None);
    assert_eq!(EventKind::from_header(""), None);
}

#[test]
fn test_event_kind_round_trips_through_header_value() {
    for kind in [EventKind::PullRequest, EventKind::Issues] {
        assert_eq!(EventKind::from_header(kind.as_str()), Some(kind));
    }
}

// ============================================================================
// Test: Action Wire Names
// ============================================================================

#[test]
fn test_pull_request_action_wire_names() {
    let action: PullRequestAction = serde_json::from_str("\"opened\"").unwrap();
    assert_eq!(action, PullRequestAction::Opened);

    let action: PullRequestAction = serde_json::from_str("\"ready_for_review\"").unwrap();
    assert_eq!(action, PullRequestAction::ReadyForReview);
}

#[test]
fn test_unknown_action_decodes_as_other() {
    // GitHub adds actions over time; they must not break decoding
    let action: PullRequestAction = serde_json::from_str("\"auto_merge_enabled\"").unwrap();
    assert_eq!(action, PullRequestAction::Other);

    let action: IssueAction = serde_json::from_str("\"milestoned\"").unwrap();
    assert_eq!(action, IssueAction::Other);
}

#[test]
fn test_action_display_matches_wire_name() {
    assert_eq!(PullRequestAction::Synchronize.to_string(), "synchronize");
    assert_eq!(IssueAction::Reopened.to_string(), "reopened");
}

// ============================================================================
// Test: Tagged Event Accessors
// ============================================================================

#[test]
fn test_event_accessors() {
    let event = Event::Issues(IssueEvent {
        action: IssueAction::Opened,
        number: 42,
        title: "Panic on empty input".to_string(),
        body: String::new(),
        author: "alice".to_string(),
        html_url: "https://github.com/org/repo/issues/42".to_string(),
    });

    assert_eq!(event.kind(), EventKind::Issues);
    assert_eq!(event.number(), 42);
    assert_eq!(event.action_name(), "opened");
}
