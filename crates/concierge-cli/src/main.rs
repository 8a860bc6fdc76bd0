//! concierge — voice agent worker and management API
//!
//! `concierge agent` runs the conversational worker: it listens for LiveKit
//! webhook events and orchestrates one session per room. `concierge api`
//! runs the management API that issues room credentials for clients.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use concierge_agent::engine::EchoEngine;
use concierge_agent::orchestrator::Orchestrator;
use concierge_core::settings::AppSettings;
use concierge_gateway::routes::{ApiState, api_router};
use concierge_gateway::webhook::webhook_router;

#[derive(Parser)]
#[command(
    name = "concierge",
    version,
    about = "Multi-persona voice concierge backend"
)]
struct Cli {
    /// Path to the settings file
    #[arg(long, global = true, default_value = "config/config.yml")]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the conversational agent worker
    Agent {
        /// Listen address for the LiveKit webhook receiver
        #[arg(long, default_value = "0.0.0.0:8080")]
        listen: String,
    },
    /// Run the management API server
    Api {
        /// Listen address for the API
        #[arg(long, default_value = "0.0.0.0:8000")]
        listen: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Environment first: settings loading reads LIVEKIT_* overrides.
    if dotenvy::from_filename(".env.local").is_err() {
        let _ = dotenvy::from_filename(".env.prod");
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let settings = AppSettings::from_file(&cli.config)
        .with_context(|| format!("failed to load settings from {}", cli.config))?;
    settings
        .registry()
        .validate()
        .context("invalid use-case configuration")?;

    match cli.command {
        Command::Agent { listen } => run_agent(settings, &listen).await,
        Command::Api { listen } => run_api(settings, &listen).await,
    }
}

async fn run_agent(settings: AppSettings, listen: &str) -> Result<()> {
    info!(
        "Starting agent worker (use case: {})",
        settings.active_use_case()
    );

    let engine = Arc::new(EchoEngine::new(
        settings.llm.clone(),
        settings.stt.clone(),
        settings.tts.clone(),
    ));
    let orchestrator = Arc::new(Orchestrator::from_settings(&settings, engine));
    let app = webhook_router(orchestrator);

    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .with_context(|| format!("failed to bind {listen}"))?;
    info!("Webhook listener on {}", listen);
    axum::serve(listener, app)
        .await
        .context("webhook server failed")?;
    Ok(())
}

async fn run_api(settings: AppSettings, listen: &str) -> Result<()> {
    info!("Starting management API");

    let state = Arc::new(ApiState::new(settings));
    let app = api_router(state);

    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .with_context(|| format!("failed to bind {listen}"))?;
    info!("API listening on {}", listen);
    axum::serve(listener, app).await.context("API server failed")?;
    Ok(())
}
