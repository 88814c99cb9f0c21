//! Stripe Relay server.
//!
//! Receives Stripe webhook notifications, validates them against the Stripe
//! API, and republishes confirmed events to in-process subscribers.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use clap::Parser;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

use stripe_relay::config::{SharedSettings, WebhookSettings};
use stripe_relay::handlers::status_router;
use stripe_relay::webhook::{
    webhook_router, BroadcastPublisher, StripeEventVerifier, VerifierConfig, WebhookState,
};

/// Stripe Relay server
#[derive(Parser, Debug)]
#[command(name = "stripe-relay")]
#[command(version)]
#[command(about = "Stripe webhook validation and event relay")]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "8080")]
    port: u16,

    /// Host to bind to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let filter = if args.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let settings = WebhookSettings::from_env().context("Invalid webhook settings")?;
    let verifier_config = VerifierConfig::from_env().context("Missing Stripe credentials")?;

    info!(
        mode = %settings.mode,
        log_webhooks = settings.log_webhooks,
        api_base_url = %verifier_config.api_base_url,
        "Configuration loaded"
    );

    let state = Arc::new(WebhookState::new(
        Arc::new(SharedSettings::new(settings)),
        Arc::new(StripeEventVerifier::new(verifier_config)),
        Arc::new(BroadcastPublisher::new()),
    ));
    let stats = state.stats.clone();

    let app = Router::new()
        .merge(webhook_router(state))
        .merge(status_router(stats))
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", args.host, args.port)
        .parse()
        .context("Invalid bind address")?;
    let listener = TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    info!(address = %addr, "stripe-relay listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Shutdown complete");
    Ok(())
}

/// Completes when a shutdown signal is received.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT"),
        _ = terminate => info!("Received SIGTERM"),
    }
}
