//! Changelog reminder comments for pull requests that skip the changelog.

use async_trait::async_trait;

use repoxbot_core::{Capability, Event};
use repoxbot_github::{ApiError, CommentUpdateRequest, GithubClient};

use crate::bus::{Envelope, HandlerOutcome};

use super::CapabilityHandler;

/// Posts a reminder comment when a pull request does not touch the
/// changelog. Never modifies pull request content.
pub struct ChangelogValidateHandler {
    client: GithubClient,
    agent_name: String,
}

impl ChangelogValidateHandler {
    pub fn new(client: GithubClient, agent_name: impl Into<String>) -> Self {
        Self {
            client,
            agent_name: agent_name.into(),
        }
    }

    /// Hidden marker line identifying this handler's own comments.
    fn marker(&self) -> String {
        format!("<!-- {}: changelog-validate -->", self.agent_name)
    }
}

#[async_trait]
impl CapabilityHandler for ChangelogValidateHandler {
    fn capability(&self) -> Capability {
        Capability::ChangelogValidate
    }

    /// Check the pull request diff for the changelog path and remind once.
    ///
    /// Idempotency precondition: an existing comment carrying this handler's
    /// marker means the reminder was already posted, regardless of which
    /// delivery or synchronize round produced it.
    async fn handle(&self, envelope: &Envelope) -> Result<HandlerOutcome, ApiError> {
        let Event::PullRequest(pr) = &envelope.event else {
            return Ok(HandlerOutcome::Skipped {
                reason: "not a pull request event".to_string(),
            });
        };

        let path = &envelope.config.changelog.path;

        let diff = self.client.get_pull_diff(pr.number).await?;
        if diff_touches(&diff, path) {
            return Ok(HandlerOutcome::Skipped {
                reason: format!("pull request already modifies {}", path),
            });
        }

        let marker = self.marker();
        let comments = self.client.list_comments(pr.number).await?;
        if comments.iter().any(|c| c.body.contains(&marker)) {
            return Ok(HandlerOutcome::Skipped {
                reason: "reminder already posted".to_string(),
            });
        }

        let body = format!(
            "{}\nThis pull request does not modify `{}`. \
             Please add a changelog entry, or disregard this reminder if the \
             change does not need one.",
            marker, path
        );
        self.client
            .create_comment(&CommentUpdateRequest {
                number: pr.number,
                body,
            })
            .await?;

        Ok(HandlerOutcome::Completed)
    }
}

/// Whether the unified diff contains a hunk for the given path.
fn diff_touches(diff: &str, path: &str) -> bool {
    let added = format!("+++ b/{}", path);
    let removed = format!("--- a/{}", path);
    diff.lines().any(|line| line == added || line == removed)
}

#[cfg(test)]
#[path = "changelog_validate_tests.rs"]
mod tests;
