//! HTTP entry point for webhook deliveries.
//!
//! One POST route at the configured entry-point path plus a liveness probe.
//! The webhook handler does the minimum inline work needed to answer within
//! GitHub's delivery timeout: verify the signature over the raw bytes,
//! decode the payload, hand the event to the dispatcher, respond. Everything
//! that touches the repository happens after the response, in handler tasks.

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use bytes::Bytes;
use serde::Serialize;
use std::net::SocketAddr;
use tokio::sync::mpsc;
use tower_http::trace::TraceLayer;
use tracing::{info, instrument, warn};

use repoxbot_core::{codec, Event, EventId, EventKind};
use repoxbot_github::SignatureVerifier;

use crate::config::StartupError;
use crate::dispatcher::Delivery;

const EVENT_KIND_HEADER: &str = "x-github-event";
const SIGNATURE_HEADER: &str = "x-hub-signature-256";

// ============================================================================
// State and Responses
// ============================================================================

/// Shared state for the HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    /// Verifier for inbound signatures; `None` when verification is disabled
    pub verifier: Option<SignatureVerifier>,

    /// Inbound side of the dispatch queue
    pub dispatch_tx: mpsc::Sender<Delivery>,
}

/// Body returned for every webhook request.
#[derive(Debug, Serialize)]
pub struct WebhookResponse {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl WebhookResponse {
    fn accepted(event_id: EventId) -> Self {
        Self {
            status: "accepted",
            event_id: Some(event_id.as_str()),
            message: None,
        }
    }

    fn ignored(message: impl Into<String>) -> Self {
        Self {
            status: "ignored",
            event_id: None,
            message: Some(message.into()),
        }
    }

    fn rejected(message: impl Into<String>) -> Self {
        Self {
            status: "rejected",
            event_id: None,
            message: Some(message.into()),
        }
    }
}

// ============================================================================
// Router
// ============================================================================

/// Build the service router with the webhook endpoint at `entry_point`.
pub fn create_router(entry_point: &str, state: AppState) -> Router {
    Router::new()
        .route(entry_point, post(handle_webhook))
        .route("/health", get(handle_health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind and serve until SIGINT or SIGTERM.
pub async fn start_server(port: u16, app: Router) -> Result<(), StartupError> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener =
        tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| StartupError::BindFailed {
                address: addr.to_string(),
                message: e.to_string(),
            })?;

    info!("HTTP server listening on {}", addr);

    let shutdown_signal = async {
        let ctrl_c = async {
            tokio::signal::ctrl_c()
                .await
                .expect("Failed to install Ctrl+C signal handler");
        };

        #[cfg(unix)]
        let terminate = async {
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
                .expect("Failed to install SIGTERM signal handler")
                .recv()
                .await;
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => {
                info!("Received SIGINT (Ctrl+C), initiating graceful shutdown");
            },
            _ = terminate => {
                info!("Received SIGTERM, initiating graceful shutdown");
            },
        }
    };

    // In-flight requests complete before the server exits; queued work keeps
    // draining through the handler tasks until the runtime stops.
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await
        .map_err(|e| StartupError::ServerFailed {
            message: e.to_string(),
        })?;

    info!("HTTP server shutdown complete");
    Ok(())
}

// ============================================================================
// Handlers
// ============================================================================

async fn handle_health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Handle one webhook delivery.
///
/// Processing order is fixed: signature verification over the exact raw body
/// bytes first, payload decoding second. No attacker-controlled JSON is
/// parsed before the request is authenticated.
#[instrument(skip(state, headers, body))]
async fn handle_webhook(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> Response {
    // Unknown or missing event kinds are acknowledged, not errors: GitHub
    // sends kinds this bot does not automate (ping among them) and must not
    // see failures for them.
    let kind = headers
        .get(EVENT_KIND_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(EventKind::from_header);

    if let Some(verifier) = &state.verifier {
        match verify_request(verifier, &headers, &body) {
            Ok(()) => {}
            Err(reason) => {
                warn!(reason = %reason, "rejecting unauthenticated webhook delivery");
                return (
                    StatusCode::UNAUTHORIZED,
                    Json(WebhookResponse::rejected(reason)),
                )
                    .into_response();
            }
        }
    }

    let Some(kind) = kind else {
        return (
            StatusCode::OK,
            Json(WebhookResponse::ignored("event kind is not automated")),
        )
            .into_response();
    };

    let event = match decode_event(kind, &body) {
        Ok(event) => event,
        Err(e) => {
            warn!(kind = kind.as_str(), error = %e, "malformed webhook payload");
            return (
                StatusCode::BAD_REQUEST,
                Json(WebhookResponse::rejected(format!(
                    "malformed payload: {}",
                    e
                ))),
            )
                .into_response();
        }
    };

    let event_id = EventId::new();
    info!(
        %event_id,
        kind = kind.as_str(),
        action = event.action_name(),
        number = event.number(),
        "webhook delivery accepted"
    );

    // Fire and forget: the response must not wait for dispatch or handlers.
    if let Err(e) = state.dispatch_tx.try_send(Delivery { event_id, event }) {
        warn!(%event_id, error = %e, "dispatch queue unavailable");
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(WebhookResponse::rejected("dispatch queue unavailable")),
        )
            .into_response();
    }

    (StatusCode::OK, Json(WebhookResponse::accepted(event_id))).into_response()
}

fn verify_request(
    verifier: &SignatureVerifier,
    headers: &HeaderMap,
    body: &Bytes,
) -> Result<(), String> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| format!("missing {} header", SIGNATURE_HEADER))?;

    match verifier.verify(body, signature) {
        Ok(true) => Ok(()),
        Ok(false) => Err("signature mismatch".to_string()),
        Err(e) => Err(e.to_string()),
    }
}

fn decode_event(kind: EventKind, body: &[u8]) -> Result<Event, repoxbot_core::CodecError> {
    match kind {
        EventKind::PullRequest => Ok(Event::PullRequest(codec::decode_pull_request(body)?)),
        EventKind::Issues => Ok(Event::Issues(codec::decode_issue(body)?)),
    }
}

#[cfg(test)]
#[path = "server_tests.rs"]
mod tests;
