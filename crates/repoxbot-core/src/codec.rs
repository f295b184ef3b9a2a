//! JSON codec between webhook wire payloads and typed event records.
//!
//! Decoding extracts exactly the fields the system consumes from GitHub's
//! webhook JSON and rejects payloads missing required structure. Encoding is
//! only used when a typed record crosses a non-in-process boundary and must
//! round-trip losslessly: `decode_event(encode_event(x)) == x` for every
//! field the record declares.

use serde::Deserialize;
use thiserror::Error;

use crate::events::{Event, IssueAction, IssueEvent, PullRequestAction, PullRequestEvent};
use crate::remote_config::{RemoteConfigError, RepoXBotConfig};

/// Errors produced while decoding or encoding wire payloads.
#[derive(Debug, Error)]
pub enum CodecError {
    /// Payload is not valid JSON or required fields are absent or mistyped
    #[error("malformed payload: {message}")]
    MalformedPayload { message: String },

    /// A typed record could not be encoded (should not happen for the
    /// derived types; surfaced rather than swallowed)
    #[error("encoding failed: {message}")]
    EncodingFailed { message: String },
}

// ============================================================================
// Wire Shapes
// ============================================================================
//
// Private structs mirroring only the parts of GitHub's payload the system
// reads. Unknown fields are ignored by serde, which gives the forward
// compatibility the webhook sender expects.

#[derive(Debug, Deserialize)]
struct PullRequestPayload {
    action: PullRequestAction,
    pull_request: PullRequestBody,
}

#[derive(Debug, Deserialize)]
struct PullRequestBody {
    number: u64,
    title: String,
    body: Option<String>,
    user: UserRef,
    head: HeadRef,
    diff_url: String,
    html_url: String,
    #[serde(default)]
    merged: bool,
}

#[derive(Debug, Deserialize)]
struct IssuePayload {
    action: IssueAction,
    issue: IssueBody,
}

#[derive(Debug, Deserialize)]
struct IssueBody {
    number: u64,
    title: String,
    body: Option<String>,
    user: UserRef,
    html_url: String,
}

#[derive(Debug, Deserialize)]
struct UserRef {
    login: String,
}

#[derive(Debug, Deserialize)]
struct HeadRef {
    sha: String,
    #[serde(rename = "ref")]
    ref_name: String,
}

// ============================================================================
// Decode Operations
// ============================================================================

/// Decode a `pull_request` webhook payload into a typed event record.
///
/// # Errors
///
/// Returns [`CodecError::MalformedPayload`] when the body is not valid JSON
/// or required fields (`action`, `pull_request.number`,
/// `pull_request.user.login`, `pull_request.head.*`, URLs) are absent or of
/// the wrong type.
pub fn decode_pull_request(payload: &[u8]) -> Result<PullRequestEvent, CodecError> {
    let wire: PullRequestPayload =
        serde_json::from_slice(payload).map_err(|e| CodecError::MalformedPayload {
            message: e.to_string(),
        })?;

    Ok(PullRequestEvent {
        action: wire.action,
        number: wire.pull_request.number,
        title: wire.pull_request.title,
        body: wire.pull_request.body.unwrap_or_default(),
        author: wire.pull_request.user.login,
        head_sha: wire.pull_request.head.sha,
        head_ref: wire.pull_request.head.ref_name,
        diff_url: wire.pull_request.diff_url,
        html_url: wire.pull_request.html_url,
        merged: wire.pull_request.merged,
    })
}

/// Decode an `issues` webhook payload into a typed event record.
///
/// # Errors
///
/// Returns [`CodecError::MalformedPayload`] when required fields under
/// `issue.*` are absent or of the wrong type.
pub fn decode_issue(payload: &[u8]) -> Result<IssueEvent, CodecError> {
    let wire: IssuePayload =
        serde_json::from_slice(payload).map_err(|e| CodecError::MalformedPayload {
            message: e.to_string(),
        })?;

    Ok(IssueEvent {
        action: wire.action,
        number: wire.issue.number,
        title: wire.issue.title,
        body: wire.issue.body.unwrap_or_default(),
        author: wire.issue.user.login,
        html_url: wire.issue.html_url,
    })
}

/// Decode the remote per-repository configuration document.
///
/// Unknown fields are ignored for forward compatibility; structural errors
/// and rules that fail validation (for example an invalid regex) are
/// [`RemoteConfigError::InvalidConfig`].
pub fn decode_config(bytes: &[u8]) -> Result<RepoXBotConfig, RemoteConfigError> {
    let config: RepoXBotConfig =
        serde_json::from_slice(bytes).map_err(|e| RemoteConfigError::InvalidConfig {
            message: e.to_string(),
        })?;

    config.validate()?;

    Ok(config)
}

// ============================================================================
// Encode Operations
// ============================================================================

/// Encode a tagged event for transport across a non-in-process boundary.
pub fn encode_event(event: &Event) -> Result<Vec<u8>, CodecError> {
    serde_json::to_vec(event).map_err(|e| CodecError::EncodingFailed {
        message: e.to_string(),
    })
}

/// Decode an event previously produced by [`encode_event`].
pub fn decode_event(bytes: &[u8]) -> Result<Event, CodecError> {
    serde_json::from_slice(bytes).map_err(|e| CodecError::MalformedPayload {
        message: e.to_string(),
    })
}

#[cfg(test)]
#[path = "codec_tests.rs"]
mod tests;
