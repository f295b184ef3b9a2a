//! # Remote Repository Configuration
//!
//! The automation policy document stored inside the target repository itself
//! (default path `.repoxbot.config.json`). It declares which capabilities are
//! enabled and the rule tables the handlers consult. The document is decoded
//! into a typed struct once per dispatch and is read-only from then on; it is
//! never partially applied.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::events::PullRequestEvent;

// ============================================================================
// Configuration Document
// ============================================================================

/// Per-repository automation policy.
///
/// Absent sections default to all-disabled, so an empty JSON object is a
/// valid document that enables nothing. Unknown fields are ignored for
/// forward compatibility.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoXBotConfig {
    /// Changelog maintenance capabilities
    #[serde(default)]
    pub changelog: ChangelogConfig,

    /// Label assignment capabilities
    #[serde(default)]
    pub labels: LabelsConfig,
}

impl RepoXBotConfig {
    /// Validate the decoded document.
    ///
    /// Compiles every declared label pattern and checks the changelog
    /// settings are usable when a changelog capability is enabled, including
    /// that an update template renders the `{number}` reference duplicate
    /// detection depends on. A config that fails validation is treated as no
    /// config at all rather than partially applied.
    pub fn validate(&self) -> Result<(), RemoteConfigError> {
        let mut errors = Vec::new();

        if (self.changelog.update || self.changelog.validate) && self.changelog.path.is_empty() {
            errors.push("changelog: path must not be empty".to_string());
        }

        // Duplicate detection keys on the "(#<number>)" reference, so an
        // update template that never renders the number would defeat it.
        if self.changelog.update {
            if self.changelog.entry_template.is_empty() {
                errors.push("changelog: entry_template must not be empty".to_string());
            } else if !self.changelog.entry_template.contains("{number}") {
                errors.push(
                    "changelog: entry_template must contain {number} when update is enabled"
                        .to_string(),
                );
            }
        }

        for (scope, rules) in [
            ("labels.pull_request", &self.labels.pull_request.rules),
            ("labels.issue", &self.labels.issue.rules),
        ] {
            for rule in rules {
                if rule.label.is_empty() {
                    errors.push(format!("{}: rule with empty label", scope));
                }
                if let Err(e) = rule.compile() {
                    errors.push(format!("{}: rule '{}': {}", scope, rule.label, e));
                }
            }
        }

        if !errors.is_empty() {
            return Err(RemoteConfigError::ValidationFailed { errors });
        }

        Ok(())
    }
}

/// Changelog capability settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangelogConfig {
    /// Append an entry when a pull request is merged
    #[serde(default)]
    pub update: bool,

    /// Comment on pull requests that do not touch the changelog
    #[serde(default)]
    pub validate: bool,

    /// Path of the changelog file inside the repository
    #[serde(default = "default_changelog_path")]
    pub path: String,

    /// Template for appended entries; `{title}`, `{number}` and `{author}`
    /// placeholders are substituted from the merged pull request
    #[serde(default = "default_entry_template")]
    pub entry_template: String,
}

impl Default for ChangelogConfig {
    fn default() -> Self {
        Self {
            update: false,
            validate: false,
            path: default_changelog_path(),
            entry_template: default_entry_template(),
        }
    }
}

impl ChangelogConfig {
    /// Render the entry template for a merged pull request.
    pub fn render_entry(&self, event: &PullRequestEvent) -> String {
        self.entry_template
            .replace("{title}", &event.title)
            .replace("{number}", &event.number.to_string())
            .replace("{author}", &event.author)
    }
}

fn default_changelog_path() -> String {
    "CHANGELOG.md".to_string()
}

fn default_entry_template() -> String {
    "- {title} (#{number}) by @{author}".to_string()
}

/// Label capability settings for both event kinds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelsConfig {
    /// Rules applied to pull requests
    #[serde(default)]
    pub pull_request: LabelRuleSet,

    /// Rules applied to issues
    #[serde(default)]
    pub issue: LabelRuleSet,
}

/// An enable flag plus the matching rules for one event kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelRuleSet {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default)]
    pub rules: Vec<LabelRule>,
}

impl LabelRuleSet {
    /// Compute the label set for the given metadata.
    ///
    /// A rule contributes its label when any of its declared patterns
    /// matches. Patterns that fail to compile were rejected by
    /// [`RepoXBotConfig::validate`], so compile failures here match nothing.
    pub fn matching_labels(&self, title: &str, body: &str, branch: Option<&str>) -> Vec<String> {
        let mut labels: Vec<String> = self
            .rules
            .iter()
            .filter(|rule| rule.matches(title, body, branch))
            .map(|rule| rule.label.clone())
            .collect();
        labels.dedup();
        labels
    }
}

/// A single config-declared label matching rule.
///
/// Patterns are regular expressions matched case-insensitively against the
/// event's title, body, and (for pull requests) head branch name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelRule {
    /// Label applied when the rule matches
    pub label: String,

    /// Pattern tested against the title
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_pattern: Option<String>,

    /// Pattern tested against the body
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body_pattern: Option<String>,

    /// Pattern tested against the head branch name (pull requests only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch_pattern: Option<String>,
}

impl LabelRule {
    /// Check whether any declared pattern matches the given metadata.
    pub fn matches(&self, title: &str, body: &str, branch: Option<&str>) -> bool {
        let pattern_matches = |pattern: &Option<String>, input: Option<&str>| -> bool {
            match (pattern, input) {
                (Some(p), Some(text)) => match compile_pattern(p) {
                    Ok(re) => re.is_match(text),
                    Err(_) => false,
                },
                _ => false,
            }
        };

        pattern_matches(&self.title_pattern, Some(title))
            || pattern_matches(&self.body_pattern, Some(body))
            || pattern_matches(&self.branch_pattern, branch)
    }

    /// Compile all declared patterns, surfacing the first failure.
    pub fn compile(&self) -> Result<(), regex::Error> {
        for pattern in [&self.title_pattern, &self.body_pattern, &self.branch_pattern]
            .into_iter()
            .flatten()
        {
            compile_pattern(pattern)?;
        }
        Ok(())
    }
}

fn compile_pattern(pattern: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!("(?i){}", pattern))
}

// ============================================================================
// Resolved State
// ============================================================================

/// Outcome of one config resolution cycle.
///
/// A missing document is a defined, non-fatal state in which every capability
/// defaults to disabled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedConfig {
    /// Document fetched and decoded
    Config(RepoXBotConfig),

    /// No document at the configured path
    NoConfig,
}

impl ResolvedConfig {
    /// Get the policy document when one exists
    pub fn config(&self) -> Option<&RepoXBotConfig> {
        match self {
            Self::Config(config) => Some(config),
            Self::NoConfig => None,
        }
    }

    /// Whether any capability could be enabled at all
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::NoConfig)
    }
}

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur while decoding or validating the remote document.
#[derive(Debug, thiserror::Error)]
pub enum RemoteConfigError {
    /// Document is not valid JSON or a declared section is mistyped
    #[error("invalid config document: {message}")]
    InvalidConfig { message: String },

    /// Document decoded but one or more declared rules are unusable
    #[error("config validation failed: {errors:?}")]
    ValidationFailed { errors: Vec<String> },
}

#[cfg(test)]
#[path = "remote_config_tests.rs"]
mod tests;
