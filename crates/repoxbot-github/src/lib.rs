//! # RepoXBot GitHub Collaborator
//!
//! Everything RepoXBot needs from the hosting service: HMAC verification of
//! inbound webhook payloads and a small, timeout-bounded REST client for the
//! repository operations the capability handlers perform (file contents with
//! optimistic concurrency, labels, comments, pull-request diffs).
//!
//! The crate deliberately exposes operations, not transport: callers hand it
//! typed request intents and get typed results or an [`ApiError`] with a
//! transience classification for retry decisions.

pub mod client;
pub mod error;
pub mod signature;

pub use client::{
    CommentUpdateRequest, FileUpdateRequest, GithubClient, IssueComment, LabelUpdateRequest,
    RemoteFile,
};
pub use error::{ApiError, SignatureError};
pub use signature::SignatureVerifier;
