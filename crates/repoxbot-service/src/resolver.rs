//! Per-repository configuration resolution.
//!
//! The bot's behavior is controlled by a config file living in the target
//! repository itself, so repository owners change automation by committing,
//! not by redeploying the service. The file is fetched fresh for every
//! dispatched event; a commit that changes it takes effect on the very next
//! delivery.

use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

use repoxbot_core::{codec, RemoteConfigError, ResolvedConfig};
use repoxbot_github::{ApiError, GithubClient};

/// Errors while resolving the repository configuration.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The config file could not be fetched
    #[error("failed to fetch repository config: {0}")]
    Fetch(#[from] ApiError),

    /// The config file exists but is not valid
    #[error("repository config is invalid: {0}")]
    Invalid(#[from] RemoteConfigError),
}

impl ResolveError {
    /// Whether a retry of the same resolution could succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Fetch(e) => e.is_transient(),
            Self::Invalid(_) => false,
        }
    }
}

/// Source of the repository configuration for a dispatch.
#[async_trait]
pub trait ConfigResolver: Send + Sync {
    async fn resolve(&self) -> Result<ResolvedConfig, ResolveError>;
}

/// Resolver that reads the config file from the target repository.
#[derive(Debug, Clone)]
pub struct RemoteConfigResolver {
    client: GithubClient,
    path: String,
}

impl RemoteConfigResolver {
    pub fn new(client: GithubClient, path: impl Into<String>) -> Self {
        Self {
            client,
            path: path.into(),
        }
    }
}

#[async_trait]
impl ConfigResolver for RemoteConfigResolver {
    /// Fetch and decode the repository config file.
    ///
    /// An absent file is not an error: it resolves to
    /// [`ResolvedConfig::NoConfig`] and the dispatcher enables nothing. A
    /// present-but-invalid file IS an error because silently ignoring a
    /// broken config would mask a repository owner's mistake.
    async fn resolve(&self) -> Result<ResolvedConfig, ResolveError> {
        match self.client.get_file(&self.path).await? {
            Some(file) => {
                let config = codec::decode_config(file.content.as_bytes())?;
                debug!(path = %self.path, "repository config resolved");
                Ok(ResolvedConfig::Config(config))
            }
            None => {
                debug!(path = %self.path, "no repository config file");
                Ok(ResolvedConfig::NoConfig)
            }
        }
    }
}

#[cfg(test)]
#[path = "resolver_tests.rs"]
mod tests;
