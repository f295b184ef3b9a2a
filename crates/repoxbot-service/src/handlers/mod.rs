//! Capability handlers.
//!
//! Each handler owns one repository-maintenance capability and runs as an
//! isolated task consuming envelopes from its bus address. Handlers are
//! idempotent: every mutation is preceded by a check of current repository
//! state, so a redelivered webhook or a retried envelope converges on the
//! same result instead of duplicating it. A handler failure is reported and
//! logged; it never takes down the dispatcher or a sibling handler.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use repoxbot_core::Capability;
use repoxbot_github::ApiError;

use crate::bus::{Envelope, HandlerOutcome, HandlerReport};

mod changelog_update;
mod changelog_validate;
mod label_issue;
mod label_pull_request;

pub use changelog_update::ChangelogUpdateHandler;
pub use changelog_validate::ChangelogValidateHandler;
pub use label_issue::LabelIssueHandler;
pub use label_pull_request::LabelPullRequestHandler;

/// One repository-maintenance capability.
#[async_trait]
pub trait CapabilityHandler: Send + Sync {
    /// The capability this handler serves
    fn capability(&self) -> Capability;

    /// Process one envelope.
    ///
    /// Implementations check repository state before mutating so a repeat
    /// call for the same change is a skip, not a duplicate.
    async fn handle(&self, envelope: &Envelope) -> Result<HandlerOutcome, ApiError>;
}

/// Run one handler's consume loop until its address closes.
///
/// A transient API failure gets a single retry; the handler's idempotency
/// pre-checks make a retry after a partial first attempt safe. Any final
/// failure becomes a [`HandlerOutcome::Failed`] report, never a panic.
pub async fn run_handler(
    handler: Arc<dyn CapabilityHandler>,
    mut inbound: mpsc::Receiver<Envelope>,
    reports: mpsc::Sender<HandlerReport>,
) {
    let capability = handler.capability();
    info!(%capability, "handler started");

    while let Some(envelope) = inbound.recv().await {
        let event_id = envelope.event_id;
        let outcome = process(handler.as_ref(), &envelope).await;

        match &outcome {
            HandlerOutcome::Completed => {
                info!(%event_id, %capability, "handler completed");
            }
            HandlerOutcome::Skipped { reason } => {
                info!(%event_id, %capability, reason = %reason, "handler skipped");
            }
            HandlerOutcome::Failed { message } => {
                error!(%event_id, %capability, error = %message, "handler failed");
            }
        }

        let report = HandlerReport {
            event_id,
            capability,
            outcome,
        };
        if reports.send(report).await.is_err() {
            debug!(%capability, "report channel closed");
        }
    }

    info!(%capability, "handler stopped, address closed");
}

async fn process(handler: &dyn CapabilityHandler, envelope: &Envelope) -> HandlerOutcome {
    match handler.handle(envelope).await {
        Ok(outcome) => outcome,
        Err(e) if e.is_transient() => {
            warn!(
                event_id = %envelope.event_id,
                capability = %handler.capability(),
                error = %e,
                "transient failure, retrying once"
            );
            match handler.handle(envelope).await {
                Ok(outcome) => outcome,
                Err(e) => HandlerOutcome::Failed {
                    message: e.to_string(),
                },
            }
        }
        Err(e) => HandlerOutcome::Failed {
            message: e.to_string(),
        },
    }
}

/// Consume handler reports and surface them in the logs.
///
/// Reports are the service's record of what each delivery caused; nothing
/// downstream consumes them yet.
pub async fn run_report_logger(mut reports: mpsc::Receiver<HandlerReport>) {
    while let Some(report) = reports.recv().await {
        match report.outcome {
            HandlerOutcome::Failed { message } => error!(
                event_id = %report.event_id,
                capability = %report.capability,
                error = %message,
                "capability outcome: failed"
            ),
            HandlerOutcome::Completed => info!(
                event_id = %report.event_id,
                capability = %report.capability,
                "capability outcome: completed"
            ),
            HandlerOutcome::Skipped { reason } => info!(
                event_id = %report.event_id,
                capability = %report.capability,
                reason = %reason,
                "capability outcome: skipped"
            ),
        }
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
