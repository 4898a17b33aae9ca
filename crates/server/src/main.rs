use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use sha2::{Digest, Sha256};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pictovoz_core::{
    load_config, load_config_from_env, validate_config, ConfigError, InMemoryVocabulary,
    LlmSuggester, RemoteSuggester, RuleEngine,
};

use pictovoz_server::api::create_router;
use pictovoz_server::metrics::REGISTRY;
use pictovoz_server::state::AppState;

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("pictovoz {} starting", VERSION);

    // Determine config path
    let config_path = std::env::var("PICTOVOZ_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // Load configuration, falling back to defaults + environment
    info!("Loading configuration from {:?}", config_path);
    let config = match load_config(&config_path) {
        Ok(config) => config,
        Err(ConfigError::FileNotFound(path)) => {
            warn!("Config file {} not found, using defaults and environment", path);
            load_config_from_env().context("Failed to load config from environment")?
        }
        Err(e) => {
            Err(e).with_context(|| format!("Failed to load config from {:?}", config_path))?
        }
    };

    validate_config(&config).context("Configuration validation failed")?;

    let config_json = serde_json::to_string(&config).unwrap_or_default();
    let config_hash = format!("{:x}", Sha256::digest(config_json.as_bytes()));
    info!("Configuration loaded (hash {})", &config_hash[..16]);

    // Vocabulary
    let vocabulary = match &config.vocabulary.path {
        Some(path) => InMemoryVocabulary::from_path(path)
            .with_context(|| format!("Failed to load vocabulary from {:?}", path))?,
        None => InMemoryVocabulary::seed().context("Failed to load seed vocabulary")?,
    };
    info!("Vocabulary ready: {} words", vocabulary.len());

    let rules = Arc::new(RuleEngine::default());
    info!("Rule engine ready: {} rules", rules.rules().len());

    // Remote suggester, if configured
    let remote: Option<Arc<dyn RemoteSuggester>> = match &config.remote {
        Some(remote_config) => {
            let suggester = LlmSuggester::from_config(remote_config)
                .context("Failed to create remote suggester")?;
            info!(
                "Remote suggester: {:?} ({})",
                remote_config.provider, remote_config.model
            );
            Some(Arc::new(suggester))
        }
        None => {
            info!("Remote suggester not configured, using rule engine only");
            None
        }
    };

    // Force registration so /metrics is complete from the first scrape
    Lazy::force(&REGISTRY);

    let state = Arc::new(AppState::new(
        config.clone(),
        Arc::new(vocabulary),
        rules,
        remote,
    ));

    if let Some(idle) = state.sessions().idle_timeout() {
        info!("Closing sessions idle for {:?}", idle);
        spawn_session_expiry(Arc::clone(&state), idle);
    }

    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shut down");
    Ok(())
}

/// Periodically close idle sessions.
fn spawn_session_expiry(state: Arc<AppState>, idle: Duration) {
    let period = (idle / 4).max(Duration::from_secs(1));
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(period).await;
            let expired = state.sessions().expire_idle().await;
            if expired > 0 {
                info!("Expired {} idle sessions", expired);
            }
        }
    });
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
