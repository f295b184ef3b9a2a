//! Typed event records decoded from GitHub webhook payloads.
//!
//! Events are immutable once decoded and travel between components by value.
//! They derive `Serialize`/`Deserialize` so the same record survives a
//! non-in-process transport unchanged; the codec guarantees
//! `decode(encode(x)) == x` for every declared field.

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Pull Request Events
// ============================================================================

/// A pull-request-related notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestEvent {
    /// Action that triggered this event
    pub action: PullRequestAction,

    /// Pull request number (repository-specific)
    pub number: u64,

    /// Pull request title
    pub title: String,

    /// Pull request body (Markdown), empty string when GitHub sends null
    pub body: String,

    /// Login of the user who opened the pull request
    pub author: String,

    /// SHA of the head commit
    pub head_sha: String,

    /// Name of the head branch
    pub head_ref: String,

    /// URL of the unified diff for this pull request
    pub diff_url: String,

    /// Web URL of the pull request
    pub html_url: String,

    /// Whether the pull request has been merged
    pub merged: bool,
}

/// Actions that can occur on pull requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PullRequestAction {
    Opened,
    Closed,
    Reopened,
    Synchronize,
    Edited,
    ReadyForReview,
    /// Any action this system has no trigger for; routed to no handler
    #[serde(other)]
    Other,
}

impl fmt::Display for PullRequestAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Opened => "opened",
            Self::Closed => "closed",
            Self::Reopened => "reopened",
            Self::Synchronize => "synchronize",
            Self::Edited => "edited",
            Self::ReadyForReview => "ready_for_review",
            Self::Other => "other",
        };
        write!(f, "{}", s)
    }
}

// ============================================================================
// Issue Events
// ============================================================================

/// An issue-related notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueEvent {
    /// Action that triggered this event
    pub action: IssueAction,

    /// Issue number (repository-specific)
    pub number: u64,

    /// Issue title
    pub title: String,

    /// Issue body (Markdown), empty string when GitHub sends null
    pub body: String,

    /// Login of the user who opened the issue
    pub author: String,

    /// Web URL of the issue
    pub html_url: String,
}

/// Actions that can occur on issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueAction {
    Opened,
    Closed,
    Reopened,
    Edited,
    /// Any action this system has no trigger for; routed to no handler
    #[serde(other)]
    Other,
}

impl fmt::Display for IssueAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Opened => "opened",
            Self::Closed => "closed",
            Self::Reopened => "reopened",
            Self::Edited => "edited",
            Self::Other => "other",
        };
        write!(f, "{}", s)
    }
}

// ============================================================================
// Event Kind Tagging
// ============================================================================

/// The webhook event kinds this system understands.
///
/// Matches the `X-GitHub-Event` header values. Anything else is acknowledged
/// at the entry point and dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    PullRequest,
    Issues,
}

impl EventKind {
    /// Parse an `X-GitHub-Event` header value.
    ///
    /// Returns `None` for event kinds the system does not handle.
    pub fn from_header(value: &str) -> Option<Self> {
        match value {
            "pull_request" => Some(Self::PullRequest),
            "issues" => Some(Self::Issues),
            _ => None,
        }
    }

    /// Header value for this kind
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PullRequest => "pull_request",
            Self::Issues => "issues",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A decoded event tagged with its kind.
///
/// This is the message contract between the entry point, the dispatcher, and
/// the handlers. The kind tag is the serde tag so an encoded event is
/// self-describing on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "event", rename_all = "snake_case")]
pub enum Event {
    PullRequest(PullRequestEvent),
    Issues(IssueEvent),
}

impl Event {
    /// Kind tag of this event
    pub fn kind(&self) -> EventKind {
        match self {
            Self::PullRequest(_) => EventKind::PullRequest,
            Self::Issues(_) => EventKind::Issues,
        }
    }

    /// Issue or pull request number the event refers to
    pub fn number(&self) -> u64 {
        match self {
            Self::PullRequest(pr) => pr.number,
            Self::Issues(issue) => issue.number,
        }
    }

    /// Action name for logging
    pub fn action_name(&self) -> String {
        match self {
            Self::PullRequest(pr) => pr.action.to_string(),
            Self::Issues(issue) => issue.action.to_string(),
        }
    }
}

#[cfg(test)]
#[path = "events_tests.rs"]
mod tests;
