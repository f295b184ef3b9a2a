//! Event dispatch: config resolution and capability fan-out.
//!
//! The dispatcher consumes decoded events from the entry point, resolves the
//! target repository's configuration, and publishes one envelope per enabled
//! capability. It never performs repository mutations itself and never waits
//! for handlers.

use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use repoxbot_core::{enabled_capabilities, Event, EventId};

use crate::bus::{Envelope, EventBus};
use crate::resolver::ConfigResolver;

/// Queue depth between the entry point and the dispatcher.
pub const DISPATCH_QUEUE_DEPTH: usize = 256;

/// A decoded event accepted by the entry point, awaiting dispatch.
#[derive(Debug, Clone)]
pub struct Delivery {
    pub event_id: EventId,
    pub event: Event,
}

/// Run the dispatch loop until the inbound channel closes.
///
/// Configuration is resolved fresh for every delivery. A failed resolution
/// drops the delivery with an error log; the webhook was already acknowledged
/// and redelivery of the same change will be routed against whatever config
/// is in force then.
pub async fn run_dispatcher(
    mut inbound: mpsc::Receiver<Delivery>,
    resolver: Arc<dyn ConfigResolver>,
    bus: EventBus,
) {
    info!("dispatcher started");

    while let Some(delivery) = inbound.recv().await {
        dispatch_one(delivery, resolver.as_ref(), &bus).await;
    }

    info!("dispatcher stopped, inbound channel closed");
}

async fn dispatch_one(delivery: Delivery, resolver: &dyn ConfigResolver, bus: &EventBus) {
    let Delivery { event_id, event } = delivery;

    let resolved = match resolver.resolve().await {
        Ok(resolved) => resolved,
        Err(e) => {
            error!(
                %event_id,
                kind = event.kind().as_str(),
                error = %e,
                transient = e.is_transient(),
                "config resolution failed, dropping event"
            );
            return;
        }
    };

    let capabilities = enabled_capabilities(&resolved, &event);
    if capabilities.is_empty() {
        debug!(
            %event_id,
            kind = event.kind().as_str(),
            action = event.action_name(),
            "no capability enabled for event"
        );
        return;
    }

    // NoConfig yields no capabilities, so a config is always present here.
    let Some(config) = resolved.config() else {
        return;
    };

    for capability in capabilities {
        info!(
            %event_id,
            %capability,
            number = event.number(),
            "routing event to handler"
        );
        bus.publish(
            capability,
            Envelope {
                event_id,
                event: event.clone(),
                config: config.clone(),
            },
        );
    }
}

#[cfg(test)]
#[path = "dispatcher_tests.rs"]
mod tests;
