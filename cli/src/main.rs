//! CLI entrypoint for trio
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, bail};
use clap::Parser;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use trio_application::{ConversationLogger, NoConversationLogger, RunCompletionUseCase};
use trio_infrastructure::{
    ConfigLoader, FileConfig, JsonlConversationLogger, OpenAiCompatibleClient,
};
use trio_presentation::{AppState, Cli, router, serve};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins over -v
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_filter()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_ref());
        return Ok(());
    }

    let config = load_config(&cli)?;

    let issues = config.validate();
    for issue in &issues {
        if issue.is_error() {
            error!("Config: {}", issue);
        } else {
            warn!("Config: {}", issue);
        }
    }
    let errors = issues.iter().filter(|i| i.is_error()).count();
    if errors > 0 {
        bail!("invalid configuration ({} error(s))", errors);
    }

    // === Dependency Injection ===
    let client = Arc::new(
        OpenAiCompatibleClient::from_config(&config.backend)
            .context("failed to create backend client")?,
    );

    let conversation_logger: Arc<dyn ConversationLogger> = match &config.logging.trace_file {
        Some(path) => match JsonlConversationLogger::new(path) {
            Some(logger) => {
                info!("Writing trace log to {}", logger.path().display());
                Arc::new(logger)
            }
            None => Arc::new(NoConversationLogger),
        },
        None => Arc::new(NoConversationLogger),
    };

    let use_case = RunCompletionUseCase::new(client)
        .with_params(config.composition.to_execution_params())
        .with_conversation_logger(conversation_logger);

    let address = config.server.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {}", address))?;

    info!(
        "trio listening on {} (backend {}, max depth {})",
        address,
        config.backend.url,
        use_case.params().max_depth
    );

    serve(listener, router(AppState::new(use_case)), shutdown_signal()).await?;

    info!("trio stopped");
    Ok(())
}

/// Files (unless --no-config), then environment, then CLI flags
fn load_config(cli: &Cli) -> Result<FileConfig> {
    let loaded = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref())
    };
    let mut config = loaded.map_err(|e| anyhow::anyhow!("failed to load configuration: {}", e))?;

    if let Some(host) = &cli.host {
        config.server.host = host.clone();
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(url) = &cli.backend_url {
        config.backend.url = url.clone();
    }
    if let Some(path) = &cli.trace_file {
        config.logging.trace_file = Some(path.clone());
    }
    Ok(config)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Could not listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested, draining in-flight requests");
}
