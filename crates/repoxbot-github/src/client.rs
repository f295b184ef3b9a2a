//! GitHub REST client for the repository operations handlers perform.
//!
//! One client instance is created at startup for the single target
//! repository and shared read-only by every handler. Every request carries
//! the configured timeout; a timed-out call surfaces as
//! [`ApiError::Timeout`], never as a silent success.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;
use url::Url;

use crate::error::ApiError;

const DEFAULT_BASE_URL: &str = "https://api.github.com";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const JSON_MEDIA_TYPE: &str = "application/vnd.github+json";
const DIFF_MEDIA_TYPE: &str = "application/vnd.github.v3.diff";

// ============================================================================
// Request Intents
// ============================================================================

/// Intent to create or update a file via the contents API.
///
/// Carries the exact blob SHA the caller read so a concurrent write to the
/// same path fails with [`ApiError::Conflict`] instead of being lost.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUpdateRequest {
    /// Repository-relative path of the file
    pub path: String,

    /// Full new file content (plain text; encoded for transport here)
    pub content: String,

    /// Blob SHA of the version this update was computed from; `None` when
    /// creating a new file
    pub prior_sha: Option<String>,

    /// Commit message for the update
    pub message: String,
}

/// Intent to add labels to an issue or pull request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelUpdateRequest {
    /// Issue or pull request number
    pub number: u64,

    /// Labels to apply (union with whatever is already present)
    pub labels: Vec<String>,
}

/// Intent to post a comment on an issue or pull request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentUpdateRequest {
    /// Issue or pull request number
    pub number: u64,

    /// Comment body (Markdown)
    pub body: String,
}

// ============================================================================
// Response Types
// ============================================================================

/// A file read through the contents API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFile {
    /// Decoded file content
    pub content: String,

    /// Blob SHA of this version, used as the optimistic-concurrency token
    pub sha: String,
}

/// A comment as returned by the issues API.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct IssueComment {
    /// Comment body (Markdown)
    pub body: String,

    /// Author login
    #[serde(rename = "user", deserialize_with = "login_of_user")]
    pub author: String,
}

fn login_of_user<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    struct UserRef {
        login: String,
    }
    Ok(UserRef::deserialize(deserializer)?.login)
}

// Wire shapes private to this module

#[derive(Debug, Deserialize)]
struct ContentsResponse {
    content: String,
    sha: String,
}

#[derive(Debug, Serialize)]
struct ContentsUpdateBody<'a> {
    message: &'a str,
    content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct LabelRef {
    name: String,
}

#[derive(Debug, Serialize)]
struct AddLabelsBody<'a> {
    labels: &'a [String],
}

#[derive(Debug, Serialize)]
struct CreateCommentBody<'a> {
    body: &'a str,
}

// ============================================================================
// Client
// ============================================================================

/// Timeout-bounded GitHub REST client scoped to one repository.
#[derive(Clone)]
pub struct GithubClient {
    http: reqwest::Client,
    base_url: Url,
    owner: String,
    repo: String,
    token: String,
}

impl GithubClient {
    /// Create a client for the given repository coordinates.
    ///
    /// # Arguments
    ///
    /// * `owner` - Organization or user owning the repository
    /// * `repo` - Repository name
    /// * `token` - API token used as `Authorization: token …`
    /// * `agent_name` - User-Agent the hosting service requires
    pub fn new(owner: &str, repo: &str, token: &str, agent_name: &str) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .user_agent(agent_name.to_string())
            .build()?;

        let base_url = Url::parse(DEFAULT_BASE_URL).expect("default base URL is valid");

        Ok(Self {
            http,
            base_url,
            owner: owner.to_string(),
            repo: repo.to_string(),
            token: token.to_string(),
        })
    }

    /// Override the API base URL (test servers).
    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = base_url;
        self
    }

    // ------------------------------------------------------------------
    // Contents
    // ------------------------------------------------------------------

    /// Read a file from the repository.
    ///
    /// Returns `None` when no file exists at the path; any other non-success
    /// status is an error.
    pub async fn get_file(&self, path: &str) -> Result<Option<RemoteFile>, ApiError> {
        let url = self.repo_url(&format!("contents/{}", path));

        let response = self.request(self.http.get(url)).send().await?;

        if response.status().as_u16() == 404 {
            debug!(path, "no file at path");
            return Ok(None);
        }

        let response = Self::check_status(response, path).await?;
        let contents: ContentsResponse =
            response.json().await.map_err(|e| ApiError::UnexpectedBody {
                message: e.to_string(),
            })?;

        // The contents API wraps base64 at 60 columns; strip the newlines
        // before decoding.
        let raw: String = contents.content.split_whitespace().collect();
        let decoded = BASE64.decode(raw).map_err(|e| ApiError::UnexpectedBody {
            message: format!("content is not valid base64: {}", e),
        })?;
        let content = String::from_utf8(decoded).map_err(|e| ApiError::UnexpectedBody {
            message: format!("content is not valid UTF-8: {}", e),
        })?;

        Ok(Some(RemoteFile {
            content,
            sha: contents.sha,
        }))
    }

    /// Create or update a file, guarded by the prior blob SHA.
    pub async fn put_file(&self, request: &FileUpdateRequest) -> Result<(), ApiError> {
        let url = self.repo_url(&format!("contents/{}", request.path));
        let body = ContentsUpdateBody {
            message: &request.message,
            content: BASE64.encode(request.content.as_bytes()),
            sha: request.prior_sha.as_deref(),
        };

        let response = self.request(self.http.put(url)).json(&body).send().await?;

        if response.status().as_u16() == 409 {
            return Err(ApiError::Conflict {
                path: request.path.clone(),
            });
        }

        Self::check_status(response, &request.path).await?;
        debug!(path = %request.path, "file updated");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Labels
    // ------------------------------------------------------------------

    /// Labels currently applied to an issue or pull request.
    pub async fn list_labels(&self, number: u64) -> Result<Vec<String>, ApiError> {
        let url = self.repo_url(&format!("issues/{}/labels", number));

        let response = self.request(self.http.get(url)).send().await?;
        let response = Self::check_status(response, "labels").await?;

        let labels: Vec<LabelRef> =
            response.json().await.map_err(|e| ApiError::UnexpectedBody {
                message: e.to_string(),
            })?;

        Ok(labels.into_iter().map(|l| l.name).collect())
    }

    /// Add labels to an issue or pull request.
    ///
    /// Adding a label that is already present is a no-op on the hosting
    /// side, which is what makes repeated deliveries safe.
    pub async fn add_labels(&self, request: &LabelUpdateRequest) -> Result<(), ApiError> {
        let url = self.repo_url(&format!("issues/{}/labels", request.number));
        let body = AddLabelsBody {
            labels: &request.labels,
        };

        let response = self.request(self.http.post(url)).json(&body).send().await?;
        Self::check_status(response, "labels").await?;

        debug!(number = request.number, labels = ?request.labels, "labels applied");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Comments
    // ------------------------------------------------------------------

    /// All comments on an issue or pull request.
    pub async fn list_comments(&self, number: u64) -> Result<Vec<IssueComment>, ApiError> {
        let url = self.repo_url(&format!("issues/{}/comments", number));

        let response = self.request(self.http.get(url)).send().await?;
        let response = Self::check_status(response, "comments").await?;

        response.json().await.map_err(|e| ApiError::UnexpectedBody {
            message: e.to_string(),
        })
    }

    /// Post a comment on an issue or pull request.
    pub async fn create_comment(&self, request: &CommentUpdateRequest) -> Result<(), ApiError> {
        let url = self.repo_url(&format!("issues/{}/comments", request.number));
        let body = CreateCommentBody {
            body: &request.body,
        };

        let response = self.request(self.http.post(url)).json(&body).send().await?;
        Self::check_status(response, "comments").await?;

        debug!(number = request.number, "comment created");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Pull requests
    // ------------------------------------------------------------------

    /// The unified diff of a pull request.
    pub async fn get_pull_diff(&self, number: u64) -> Result<String, ApiError> {
        let url = self.repo_url(&format!("pulls/{}", number));

        let response = self
            .authorized(self.http.get(url))
            .header(reqwest::header::ACCEPT, DIFF_MEDIA_TYPE)
            .send()
            .await?;
        let response = Self::check_status(response, "diff").await?;

        response.text().await.map_err(|e| ApiError::UnexpectedBody {
            message: e.to_string(),
        })
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn repo_url(&self, suffix: &str) -> Url {
        let path = format!("repos/{}/{}/{}", self.owner, self.repo, suffix);
        self.base_url
            .join(&path)
            .expect("repository API paths are valid URL segments")
    }

    fn authorized(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder.header(
            reqwest::header::AUTHORIZATION,
            format!("token {}", self.token),
        )
    }

    fn request(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        self.authorized(builder)
            .header(reqwest::header::ACCEPT, JSON_MEDIA_TYPE)
    }

    async fn check_status(
        response: reqwest::Response,
        context: &str,
    ) -> Result<reqwest::Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let rate_limited = status.as_u16() == 429
            || (status.as_u16() == 403
                && response
                    .headers()
                    .get("x-ratelimit-remaining")
                    .and_then(|v| v.to_str().ok())
                    == Some("0"));
        if rate_limited {
            return Err(ApiError::RateLimited);
        }

        let message = response
            .text()
            .await
            .unwrap_or_else(|_| format!("<unreadable body for {}>", context));

        Err(ApiError::Http {
            status: status.as_u16(),
            message,
        })
    }
}

// Don't expose the token in debug output
impl std::fmt::Debug for GithubClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GithubClient")
            .field("base_url", &self.base_url.as_str())
            .field("owner", &self.owner)
            .field("repo", &self.repo)
            .field("token", &"<REDACTED>")
            .finish()
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
