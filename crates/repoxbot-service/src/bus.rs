//! In-process message passing between the dispatcher and handlers.
//!
//! Every capability handler owns a bounded mpsc receiver; the dispatcher
//! publishes envelopes to handler addresses without waiting for completion.
//! A publish never blocks the dispatch loop: when a handler's queue is full
//! the envelope is dropped and logged, and the next webhook delivery for the
//! same change will trigger the work again.

use std::collections::HashMap;
use tokio::sync::mpsc;
use tracing::{error, warn};

use repoxbot_core::{Capability, Event, EventId, RepoXBotConfig};

/// Queue depth for each handler address.
pub const HANDLER_QUEUE_DEPTH: usize = 64;

/// Queue depth for the outcome report channel.
pub const REPORT_QUEUE_DEPTH: usize = 256;

// ============================================================================
// Messages
// ============================================================================

/// One unit of work for a capability handler.
///
/// Carries everything the handler needs so it never reaches back into
/// dispatcher state: the decoded event and the repository configuration that
/// was in force when the event was routed.
#[derive(Debug, Clone)]
pub struct Envelope {
    /// Identity assigned at ingestion, threaded through all logs
    pub event_id: EventId,

    /// The decoded webhook event
    pub event: Event,

    /// Repository configuration resolved for this dispatch
    pub config: RepoXBotConfig,
}

/// What a handler did with an envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandlerOutcome {
    /// The handler performed its repository operation
    Completed,

    /// The precondition showed the work was already done or does not apply
    Skipped { reason: String },

    /// The operation failed after any retry the handler was willing to make
    Failed { message: String },
}

/// Completion message a handler sends after processing an envelope.
#[derive(Debug, Clone)]
pub struct HandlerReport {
    pub event_id: EventId,
    pub capability: Capability,
    pub outcome: HandlerOutcome,
}

// ============================================================================
// Event Bus
// ============================================================================

/// Fan-out side of the bus: one address per registered capability.
pub struct EventBus {
    addresses: HashMap<Capability, mpsc::Sender<Envelope>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            addresses: HashMap::new(),
        }
    }

    /// Register a handler address. Returns the receiving end for the
    /// handler's run loop.
    pub fn register(&mut self, capability: Capability) -> mpsc::Receiver<Envelope> {
        let (tx, rx) = mpsc::channel(HANDLER_QUEUE_DEPTH);
        self.addresses.insert(capability, tx);
        rx
    }

    /// Publish an envelope to one capability's address.
    ///
    /// Fire and forget: returns `true` when the envelope was queued, `false`
    /// when the address is unknown, full, or closed.
    pub fn publish(&self, capability: Capability, envelope: Envelope) -> bool {
        let Some(address) = self.addresses.get(&capability) else {
            error!(%capability, "no handler registered for capability");
            return false;
        };

        match address.try_send(envelope) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(envelope)) => {
                warn!(
                    %capability,
                    event_id = %envelope.event_id,
                    "handler queue full, dropping envelope"
                );
                false
            }
            Err(mpsc::error::TrySendError::Closed(envelope)) => {
                error!(
                    %capability,
                    event_id = %envelope.event_id,
                    "handler address closed, dropping envelope"
                );
                false
            }
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "bus_tests.rs"]
mod tests;
