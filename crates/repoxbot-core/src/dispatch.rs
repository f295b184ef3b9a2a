//! Capability routing rules.
//!
//! Pure functions that decide, for one decoded event and one resolved policy
//! document, which handler capabilities receive the event. Delivery itself
//! (addresses, channels, tasks) lives in the service crate; keeping the
//! decision pure makes the routing table directly testable.

use std::fmt;

use crate::events::{Event, EventKind, IssueAction, PullRequestAction};
use crate::remote_config::ResolvedConfig;

/// One discrete automation behavior a repository may enable.
///
/// Each capability is bound to exactly one event kind and a set of trigger
/// actions. Handlers for sibling capabilities act on disjoint concerns, so
/// delivery order between them is deliberately unspecified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Append a changelog entry for a merged pull request
    ChangelogUpdate,

    /// Comment on pull requests whose diff does not touch the changelog
    ChangelogValidate,

    /// Assign labels to pull requests from config-declared rules
    LabelPullRequest,

    /// Assign labels to issues from config-declared rules
    LabelIssue,
}

impl Capability {
    /// The event kind this capability subscribes to
    pub fn event_kind(&self) -> EventKind {
        match self {
            Self::ChangelogUpdate | Self::ChangelogValidate | Self::LabelPullRequest => {
                EventKind::PullRequest
            }
            Self::LabelIssue => EventKind::Issues,
        }
    }

    /// Stable name used for addresses and log fields
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ChangelogUpdate => "changelog-update",
            Self::ChangelogValidate => "changelog-validate",
            Self::LabelPullRequest => "label-pull-request",
            Self::LabelIssue => "label-issue",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Compute the capabilities an event is forwarded to.
///
/// A capability is selected when the repository's policy enables it and the
/// event's action matches the capability's trigger condition. A missing
/// policy document enables nothing. The returned order carries no meaning.
pub fn enabled_capabilities(resolved: &ResolvedConfig, event: &Event) -> Vec<Capability> {
    let Some(config) = resolved.config() else {
        return Vec::new();
    };

    let mut capabilities = Vec::new();

    match event {
        Event::PullRequest(pr) => {
            // A merge arrives as `closed` with the merged flag set.
            if config.changelog.update && pr.action == PullRequestAction::Closed && pr.merged {
                capabilities.push(Capability::ChangelogUpdate);
            }

            let content_changed = matches!(
                pr.action,
                PullRequestAction::Opened
                    | PullRequestAction::Synchronize
                    | PullRequestAction::Reopened
            );
            if config.changelog.validate && content_changed {
                capabilities.push(Capability::ChangelogValidate);
            }

            let metadata_relevant = matches!(
                pr.action,
                PullRequestAction::Opened
                    | PullRequestAction::Edited
                    | PullRequestAction::Reopened
                    | PullRequestAction::ReadyForReview
            );
            if config.labels.pull_request.enabled && metadata_relevant {
                capabilities.push(Capability::LabelPullRequest);
            }
        }
        Event::Issues(issue) => {
            let metadata_relevant = matches!(
                issue.action,
                IssueAction::Opened | IssueAction::Edited | IssueAction::Reopened
            );
            if config.labels.issue.enabled && metadata_relevant {
                capabilities.push(Capability::LabelIssue);
            }
        }
    }

    capabilities
}

#[cfg(test)]
#[path = "dispatch_tests.rs"]
mod tests;
