//! # RepoXBot Service
//!
//! Binary entry point for the RepoXBot webhook automation agent.
//!
//! This executable:
//! - Loads configuration from environment variables
//! - Initializes logging
//! - Wires the dispatcher and capability handler tasks
//! - Starts the HTTP entry point

mod bus;
mod config;
mod dispatcher;
mod handlers;
mod resolver;
mod server;

use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use repoxbot_core::Capability;
use repoxbot_github::{GithubClient, SignatureVerifier};

use bus::{EventBus, REPORT_QUEUE_DEPTH};
use config::{ServiceConfig, StartupError};
use dispatcher::DISPATCH_QUEUE_DEPTH;
use handlers::{
    run_handler, run_report_logger, CapabilityHandler, ChangelogUpdateHandler,
    ChangelogValidateHandler, LabelIssueHandler, LabelPullRequestHandler,
};
use resolver::RemoteConfigResolver;
use server::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "repoxbot_service=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting RepoXBot Service");

    // Configuration problems are fatal at startup. A misconfigured agent must
    // never sit half-working behind a webhook.
    let config = match ServiceConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "configuration is invalid; aborting");
            std::process::exit(3);
        }
    };

    let client = match GithubClient::new(
        &config.github_org,
        &config.github_repo,
        &config.github_token,
        &config.agent_name,
    ) {
        Ok(client) => client,
        Err(e) => {
            error!(error = %e, "could not initialize GitHub client; aborting");
            std::process::exit(3);
        }
    };

    let verifier = config
        .check_sign
        .then(|| SignatureVerifier::new(config.github_secret.clone()));

    // Wire the bus: one address per capability, one shared report channel.
    let mut event_bus = EventBus::new();
    let (report_tx, report_rx) = mpsc::channel(REPORT_QUEUE_DEPTH);
    tokio::spawn(run_report_logger(report_rx));

    let handler_set: Vec<(Capability, Arc<dyn CapabilityHandler>)> = vec![
        (
            Capability::ChangelogUpdate,
            Arc::new(ChangelogUpdateHandler::new(client.clone())),
        ),
        (
            Capability::ChangelogValidate,
            Arc::new(ChangelogValidateHandler::new(
                client.clone(),
                config.agent_name.clone(),
            )),
        ),
        (
            Capability::LabelPullRequest,
            Arc::new(LabelPullRequestHandler::new(client.clone())),
        ),
        (
            Capability::LabelIssue,
            Arc::new(LabelIssueHandler::new(client.clone())),
        ),
    ];

    for (capability, handler) in handler_set {
        let inbound = event_bus.register(capability);
        tokio::spawn(run_handler(handler, inbound, report_tx.clone()));
    }

    let resolver = Arc::new(RemoteConfigResolver::new(
        client,
        config.config_path.clone(),
    ));
    let (dispatch_tx, dispatch_rx) = mpsc::channel(DISPATCH_QUEUE_DEPTH);
    tokio::spawn(dispatcher::run_dispatcher(dispatch_rx, resolver, event_bus));

    info!(
        org = %config.github_org,
        repo = %config.github_repo,
        entry_point = %config.entry_point,
        config_path = %config.config_path,
        agent = %config.agent_name,
        check_sign = config.check_sign,
        "RepoXBot ready"
    );

    let state = AppState {
        verifier,
        dispatch_tx,
    };
    let app = server::create_router(&config.entry_point, state);

    if let Err(e) = server::start_server(config.port, app).await {
        error!("Failed to run server: {}", e);

        let exit_code = match e {
            StartupError::BindFailed { .. } => 1,
            StartupError::ServerFailed { .. } => 2,
            _ => 3,
        };

        std::process::exit(exit_code);
    }

    Ok(())
}
