//! Changelog entry insertion for merged pull requests.

use async_trait::async_trait;
use tracing::debug;

use repoxbot_core::{Capability, Event};
use repoxbot_github::{ApiError, FileUpdateRequest, GithubClient};

use crate::bus::{Envelope, HandlerOutcome};

use super::CapabilityHandler;

/// Appends a rendered entry to the changelog when a pull request merges.
pub struct ChangelogUpdateHandler {
    client: GithubClient,
}

impl ChangelogUpdateHandler {
    pub fn new(client: GithubClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl CapabilityHandler for ChangelogUpdateHandler {
    fn capability(&self) -> Capability {
        Capability::ChangelogUpdate
    }

    /// Insert the rendered entry below the changelog's top heading.
    ///
    /// Idempotency precondition: the file already containing a `(#<number>)`
    /// reference for this pull request means the entry exists and the
    /// envelope is a repeat. The write carries the blob SHA that was read, so
    /// a concurrent edit surfaces as a conflict instead of overwriting it;
    /// the next delivery for this change re-reads and re-checks.
    async fn handle(&self, envelope: &Envelope) -> Result<HandlerOutcome, ApiError> {
        let Event::PullRequest(pr) = &envelope.event else {
            return Ok(HandlerOutcome::Skipped {
                reason: "not a pull request event".to_string(),
            });
        };

        let changelog = &envelope.config.changelog;
        let marker = format!("(#{})", pr.number);

        let existing = self.client.get_file(&changelog.path).await?;

        if let Some(file) = &existing {
            if file.content.contains(&marker) {
                return Ok(HandlerOutcome::Skipped {
                    reason: format!("changelog already references {}", marker),
                });
            }
        }

        let entry = changelog.render_entry(pr);
        let (content, prior_sha) = match existing {
            Some(file) => (insert_entry(&file.content, &entry), Some(file.sha)),
            None => {
                debug!(path = %changelog.path, "changelog file absent, creating it");
                (format!("# Changelog\n\n{}\n", entry), None)
            }
        };

        self.client
            .put_file(&FileUpdateRequest {
                path: changelog.path.clone(),
                content,
                prior_sha,
                message: format!("chore: changelog entry for #{}", pr.number),
            })
            .await?;

        Ok(HandlerOutcome::Completed)
    }
}

/// Place the new entry directly below the top-level heading, newest first.
/// Files without a heading get the entry prepended.
fn insert_entry(content: &str, entry: &str) -> String {
    match content.split_once('\n') {
        Some((first, rest)) if first.starts_with('#') => {
            format!("{}\n\n{}\n{}", first, entry, rest.trim_start_matches('\n'))
        }
        None if content.starts_with('#') => {
            format!("{}\n\n{}\n", content, entry)
        }
        _ => format!("{}\n{}", entry, content),
    }
}

#[cfg(test)]
#[path = "changelog_update_tests.rs"]
mod tests;
