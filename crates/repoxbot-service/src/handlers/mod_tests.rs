//! Tests for the handler run loop and retry classification.

use super::*;
use repoxbot_core::{EventId, IssueAction, IssueEvent, RepoXBotConfig};
use std::sync::atomic::{AtomicUsize, Ordering};

fn sample_envelope() -> Envelope {
    Envelope {
        event_id: EventId::new(),
        event: repoxbot_core::Event::Issues(IssueEvent {
            action: IssueAction::Opened,
            number: 7,
            title: "Widget crashes".to_string(),
            body: String::new(),
            author: "reporter".to_string(),
            html_url: "https://example.test/issues/7".to_string(),
        }),
        config: RepoXBotConfig::default(),
    }
}

/// Handler whose first `failures` calls return the given error kind.
struct FlakyHandler {
    calls: AtomicUsize,
    failures: usize,
    transient: bool,
}

impl FlakyHandler {
    fn new(failures: usize, transient: bool) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            failures,
            transient,
        }
    }

    fn error(&self) -> ApiError {
        if self.transient {
            ApiError::Timeout
        } else {
            ApiError::Conflict {
                path: "CHANGELOG.md".to_string(),
            }
        }
    }
}

#[async_trait]
impl CapabilityHandler for FlakyHandler {
    fn capability(&self) -> Capability {
        Capability::LabelIssue
    }

    async fn handle(&self, _envelope: &Envelope) -> Result<HandlerOutcome, ApiError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call < self.failures {
            Err(self.error())
        } else {
            Ok(HandlerOutcome::Completed)
        }
    }
}

// ============================================================================
// Test: Retry Classification
// ============================================================================

#[tokio::test]
async fn test_transient_failure_is_retried_once() {
    let handler = FlakyHandler::new(1, true);

    let outcome = process(&handler, &sample_envelope()).await;

    assert_eq!(outcome, HandlerOutcome::Completed);
    assert_eq!(handler.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_second_transient_failure_is_final() {
    let handler = FlakyHandler::new(2, true);

    let outcome = process(&handler, &sample_envelope()).await;

    assert!(matches!(outcome, HandlerOutcome::Failed { .. }));
    assert_eq!(handler.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_non_transient_failure_is_not_retried() {
    let handler = FlakyHandler::new(1, false);

    let outcome = process(&handler, &sample_envelope()).await;

    assert!(matches!(outcome, HandlerOutcome::Failed { .. }));
    assert_eq!(handler.calls.load(Ordering::SeqCst), 1);
}

// ============================================================================
// Test: Run Loop
// ============================================================================

#[tokio::test]
async fn test_run_handler_reports_every_envelope() {
    let handler: Arc<dyn CapabilityHandler> = Arc::new(FlakyHandler::new(0, true));
    let (envelope_tx, envelope_rx) = mpsc::channel(8);
    let (report_tx, mut report_rx) = mpsc::channel(8);

    let worker = tokio::spawn(run_handler(handler, envelope_rx, report_tx));

    envelope_tx.send(sample_envelope()).await.unwrap();
    envelope_tx.send(sample_envelope()).await.unwrap();
    drop(envelope_tx);

    let first = report_rx.recv().await.expect("first report");
    let second = report_rx.recv().await.expect("second report");
    assert_eq!(first.capability, Capability::LabelIssue);
    assert_eq!(first.outcome, HandlerOutcome::Completed);
    assert_eq!(second.outcome, HandlerOutcome::Completed);

    worker.await.expect("handler loop should stop cleanly");
}

#[tokio::test]
async fn test_run_handler_keeps_consuming_after_failure() {
    let handler: Arc<dyn CapabilityHandler> = Arc::new(FlakyHandler::new(1, false));
    let (envelope_tx, envelope_rx) = mpsc::channel(8);
    let (report_tx, mut report_rx) = mpsc::channel(8);

    tokio::spawn(run_handler(handler, envelope_rx, report_tx));

    envelope_tx.send(sample_envelope()).await.unwrap();
    envelope_tx.send(sample_envelope()).await.unwrap();

    let first = report_rx.recv().await.expect("first report");
    let second = report_rx.recv().await.expect("second report");
    assert!(matches!(first.outcome, HandlerOutcome::Failed { .. }));
    assert_eq!(second.outcome, HandlerOutcome::Completed);
}
