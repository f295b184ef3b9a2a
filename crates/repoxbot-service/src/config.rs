//! Service configuration from environment variables.
//!
//! All startup configuration comes from the process environment. Four
//! variables identify the target repository and credentials and are
//! mandatory; the rest have working defaults. A missing mandatory variable
//! is fatal at startup, never discovered later mid-request.

use thiserror::Error;
use tracing::warn;

const DEFAULT_ENTRY_POINT: &str = "/repoxbot";
const DEFAULT_CONFIG_PATH: &str = ".repoxbot.config.json";
const DEFAULT_AGENT_NAME: &str = "RepoXBot-Automation-Agent";
const DEFAULT_PORT: u16 = 8080;

/// Errors that prevent the service from starting.
#[derive(Debug, Error)]
pub enum StartupError {
    /// A mandatory environment variable is absent or empty
    #[error("required environment variable {name} is not set")]
    MissingVariable { name: &'static str },

    /// An environment variable is present but cannot be parsed
    #[error("environment variable {name} is invalid: {message}")]
    InvalidVariable {
        name: &'static str,
        message: String,
    },

    /// The listen address could not be bound
    #[error("failed to bind {address}: {message}")]
    BindFailed { address: String, message: String },

    /// The HTTP server stopped with an error
    #[error("HTTP server failed: {message}")]
    ServerFailed { message: String },
}

/// Complete startup configuration for the service.
#[derive(Clone)]
pub struct ServiceConfig {
    /// Organization or user owning the target repository
    pub github_org: String,

    /// Target repository name
    pub github_repo: String,

    /// API token for repository operations
    pub github_token: String,

    /// Shared secret for webhook signature verification
    pub github_secret: String,

    /// URL path the webhook endpoint is mounted at
    pub entry_point: String,

    /// Whether inbound payloads must carry a valid signature
    pub check_sign: bool,

    /// Repository-relative path of the per-repository config file
    pub config_path: String,

    /// Agent identity, used as User-Agent and as the comment marker
    pub agent_name: String,

    /// TCP port the HTTP server listens on
    pub port: u16,
}

impl ServiceConfig {
    /// Load configuration from the process environment.
    ///
    /// Mandatory: `GITHUB_ORG`, `GITHUB_REPO`, `GITHUB_TOKEN`,
    /// `GITHUB_SECRET`. Optional with defaults: `ENTRY_POINT`, `CHECK_SIGN`,
    /// `CONFIG_PATH`, `AGENT_NAME`, `PORT`.
    pub fn from_env() -> Result<Self, StartupError> {
        let config = Self {
            github_org: required("GITHUB_ORG")?,
            github_repo: required("GITHUB_REPO")?,
            github_token: required("GITHUB_TOKEN")?,
            github_secret: required("GITHUB_SECRET")?,
            entry_point: optional("ENTRY_POINT", DEFAULT_ENTRY_POINT),
            check_sign: parse_bool("CHECK_SIGN", true)?,
            config_path: optional("CONFIG_PATH", DEFAULT_CONFIG_PATH),
            agent_name: optional("AGENT_NAME", DEFAULT_AGENT_NAME),
            port: parse_port("PORT", DEFAULT_PORT)?,
        };

        if !config.check_sign {
            warn!(
                "signature verification is DISABLED (CHECK_SIGN=false); \
                 every inbound payload will be accepted unauthenticated. \
                 Do not use in production."
            );
        }

        Ok(config)
    }
}

fn required(name: &'static str) -> Result<String, StartupError> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(StartupError::MissingVariable { name }),
    }
}

fn optional(name: &'static str, default: &str) -> String {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => value,
        _ => default.to_string(),
    }
}

fn parse_bool(name: &'static str, default: bool) -> Result<bool, StartupError> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => match value.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => Ok(true),
            "false" | "0" | "no" => Ok(false),
            other => Err(StartupError::InvalidVariable {
                name,
                message: format!("expected a boolean, got '{}'", other),
            }),
        },
        _ => Ok(default),
    }
}

fn parse_port(name: &'static str, default: u16) -> Result<u16, StartupError> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => {
            value
                .trim()
                .parse()
                .map_err(|_| StartupError::InvalidVariable {
                    name,
                    message: format!("expected a port number, got '{}'", value),
                })
        }
        _ => Ok(default),
    }
}

// Don't expose the token or webhook secret in debug output
impl std::fmt::Debug for ServiceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceConfig")
            .field("github_org", &self.github_org)
            .field("github_repo", &self.github_repo)
            .field("github_token", &"<REDACTED>")
            .field("github_secret", &"<REDACTED>")
            .field("entry_point", &self.entry_point)
            .field("check_sign", &self.check_sign)
            .field("config_path", &self.config_path)
            .field("agent_name", &self.agent_name)
            .field("port", &self.port)
            .finish()
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
