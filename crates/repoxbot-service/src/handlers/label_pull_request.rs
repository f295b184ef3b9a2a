//! Rule-based labeling of pull requests.

use async_trait::async_trait;

use repoxbot_core::{Capability, Event};
use repoxbot_github::{ApiError, GithubClient, LabelUpdateRequest};

use crate::bus::{Envelope, HandlerOutcome};

use super::CapabilityHandler;

/// Applies config-declared labels to pull requests by matching title, body,
/// and head branch against the rule table.
pub struct LabelPullRequestHandler {
    client: GithubClient,
}

impl LabelPullRequestHandler {
    pub fn new(client: GithubClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl CapabilityHandler for LabelPullRequestHandler {
    fn capability(&self) -> Capability {
        Capability::LabelPullRequest
    }

    /// Add the matched labels that are not already present.
    ///
    /// Labels are only ever added, never removed: a maintainer's manual
    /// labels survive every redelivery. When the computed set is already a
    /// subset of the current labels there is nothing to write.
    async fn handle(&self, envelope: &Envelope) -> Result<HandlerOutcome, ApiError> {
        let Event::PullRequest(pr) = &envelope.event else {
            return Ok(HandlerOutcome::Skipped {
                reason: "not a pull request event".to_string(),
            });
        };

        let rules = &envelope.config.labels.pull_request;
        let desired = rules.matching_labels(&pr.title, &pr.body, Some(&pr.head_ref));
        if desired.is_empty() {
            return Ok(HandlerOutcome::Skipped {
                reason: "no label rule matched".to_string(),
            });
        }

        let current = self.client.list_labels(pr.number).await?;
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
                number: pr.number,
                labels: missing,
            })
            .await?;

        Ok(HandlerOutcome::Completed)
    }
}

#[cfg(test)]
#[path = "label_pull_request_tests.rs"]
mod tests;
