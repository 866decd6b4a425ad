// SPDX-FileCopyrightText: 2026 Clinio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Clinio - conversational appointment assistant for a tuberculosis clinic.
//!
//! This is the binary entry point: it loads configuration, wires the
//! concrete adapters into the dialogue orchestrator, and serves the HTTP
//! entry point the messaging relay talks to.

mod serve;

use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use clinio_config::ClinioConfig;
use clinio_core::{ConversationStore, RegistryClient, TextGenerator};
use clinio_dialogue::{DialogueOrchestrator, DialogueSettings};
use clinio_ollama::OllamaGenerator;
use clinio_registry::ClinicRegistryClient;
use clinio_store::SqliteConversationStore;

/// Clinio - conversational appointment assistant.
#[derive(Parser, Debug)]
#[command(name = "clinio", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the assistant HTTP server.
    Serve,
    /// Check configuration and collaborator health, then exit.
    Check,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match clinio_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            clinio_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config);

    match cli.command {
        Some(Commands::Check) => {
            if !run_check(&config).await {
                std::process::exit(1);
            }
        }
        Some(Commands::Serve) | None => {
            if let Err(e) = run_serve(&config).await {
                eprintln!("clinio: {e}");
                std::process::exit(1);
            }
        }
    }
}

/// Initialize the tracing subscriber; RUST_LOG overrides the config level.
fn init_tracing(config: &ClinioConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.agent.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Wire adapters and run the HTTP server until interrupted.
async fn run_serve(config: &ClinioConfig) -> Result<(), Box<dyn std::error::Error>> {
    let store: Arc<dyn ConversationStore> = Arc::new(
        SqliteConversationStore::open(
            &config.store.database_path,
            config.store.wal_mode,
            Duration::from_secs(config.store.ttl_secs),
        )
        .await?,
    );

    let registry: Arc<dyn RegistryClient> = Arc::new(ClinicRegistryClient::new(
        &config.registry.base_url,
        Duration::from_secs(config.registry.timeout_secs),
    )?);

    let generator: Arc<dyn TextGenerator> = Arc::new(OllamaGenerator::new(
        &config.generation.base_url,
        &config.generation.model,
        Duration::from_secs(config.generation.timeout_secs),
    )?);

    let orchestrator = Arc::new(DialogueOrchestrator::new(
        store,
        registry.clone(),
        generator.clone(),
        DialogueSettings::from_config(config),
    ));

    let state = serve::AppState {
        orchestrator,
        registry,
        generator,
        rate_limiter: Arc::new(serve::RateLimiter::new(
            config.gateway.rate_limit_per_minute,
        )),
    };

    let addr = format!("{}:{}", config.gateway.bind_address, config.gateway.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(
        addr = addr.as_str(),
        center = config.clinic.center_name.as_str(),
        "clinio listening"
    );

    axum::serve(listener, serve::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("clinio stopped");
    Ok(())
}

/// Resolve when the process receives Ctrl-C.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to install shutdown signal handler");
    }
}

/// Report config summary and collaborator reachability.
async fn run_check(config: &ClinioConfig) -> bool {
    println!("config: ok (agent.name={})", config.agent.name);
    println!(
        "clinic: {} ({:02}:00-{:02}:00, every {} min, closed {})",
        config.clinic.center_name,
        config.clinic.open_hour,
        config.clinic.close_hour,
        config.clinic.slot_minutes,
        config.clinic.closed_weekday,
    );

    let mut healthy = true;

    match ClinicRegistryClient::new(
        &config.registry.base_url,
        Duration::from_secs(config.registry.timeout_secs),
    ) {
        Ok(registry) => {
            let up = registry.health_check().await;
            println!("registry ({}): {}", config.registry.base_url, up_str(up));
            healthy &= up;
        }
        Err(e) => {
            println!("registry: client error: {e}");
            healthy = false;
        }
    }

    match OllamaGenerator::new(
        &config.generation.base_url,
        &config.generation.model,
        Duration::from_secs(config.generation.timeout_secs),
    ) {
        Ok(generator) => {
            let up = generator.health_check().await;
            println!(
                "generator ({}, model {}): {}",
                config.generation.base_url,
                config.generation.model,
                up_str(up)
            );
            healthy &= up;
        }
        Err(e) => {
            println!("generator: client error: {e}");
            healthy = false;
        }
    }

    healthy
}

fn up_str(up: bool) -> &'static str {
    if up { "reachable" } else { "UNREACHABLE" }
}
