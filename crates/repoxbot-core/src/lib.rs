//! # RepoXBot Core
//!
//! Domain types and pure routing logic for the RepoXBot repository-automation
//! agent.
//!
//! This crate contains the typed event records decoded from GitHub webhook
//! payloads, the JSON codec that produces them, the per-repository automation
//! policy document, and the capability routing rules that decide which
//! handlers an event is forwarded to. It performs no I/O; the hosting-API
//! collaborator lives in `repoxbot-github` and the running service in
//! `repoxbot-service`.
//!
//! ## Usage
//!
//! ```rust
//! use repoxbot_core::EventId;
//!
//! let event_id = EventId::new();
//! assert!(!event_id.as_str().is_empty());
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub mod codec;
pub mod dispatch;
pub mod events;
pub mod remote_config;

pub use codec::CodecError;
pub use dispatch::{enabled_capabilities, Capability};
pub use events::{Event, EventKind, IssueAction, IssueEvent, PullRequestAction, PullRequestEvent};
pub use remote_config::{RemoteConfigError, RepoXBotConfig, ResolvedConfig};

// Re-export for downstream crates
pub use ulid::Ulid;

// ============================================================================
// Domain Identifier Types
// ============================================================================

/// Unique identifier for a decoded webhook event.
///
/// Uses ULID for lexicographic sorting and global uniqueness. Assigned once
/// at decode time and carried through dispatch and handler reports so log
/// lines for one delivery correlate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventId(Ulid);

impl EventId {
    /// Generate a new unique event ID
    pub fn new() -> Self {
        Self(Ulid::new())
    }

    /// Get string representation of event ID
    pub fn as_str(&self) -> String {
        self.0.to_string()
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for EventId {
    type Err = ulid::DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse::<Ulid>()?))
    }
}
