//! Rule-based labeling of issues.

use async_trait::async_trait;

use repoxbot_core::{Capability, Event};
use repoxbot_github::{ApiError, GithubClient, LabelUpdateRequest};

use crate::bus::{Envelope, HandlerOutcome};

use super::CapabilityHandler;

/// Applies config-declared labels to issues by matching title and body
/// against the rule table. Issues have no branch, so branch patterns never
/// match here.
pub struct LabelIssueHandler {
    client: GithubClient,
}

impl LabelIssueHandler {
    pub fn new(client: GithubClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl CapabilityHandler for LabelIssueHandler {
    fn capability(&self) -> Capability {
        Capability::LabelIssue
    }

    async fn handle(&self, envelope: &Envelope) -> Result<HandlerOutcome, ApiError> {
        let Event::Issues(issue) = &envelope.event else {
            return Ok(HandlerOutcome::Skipped {
                reason: "not an issue event".to_string(),
            });
        };

        let rules = &envelope.config.labels.issue;
        let desired = rules.matching_labels(&issue.title, &issue.body, None);
        if desired.is_empty() {
            return Ok(HandlerOutcome::Skipped {
                reason: "no label rule matched".to_string(),
            });
        }

        let current = self.client.list_labels(issue.number).await?;
        let missing: Vec<String> = desired
            .into_iter()
            .filter(|label| !current.contains(label))
            .collect();
        if missing.is_empty() {
            return Ok(HandlerOutcome::Skipped {
                reason: "matched labels already present".to_string(),
            });
        }

        self.client
            .add_labels(&LabelUpdateRequest {
                number: issue.number,
                labels: missing,
            })
            .await?;

        Ok(HandlerOutcome::Completed)
    }
}

#[cfg(test)]
#[path = "label_issue_tests.rs"]
mod tests;
