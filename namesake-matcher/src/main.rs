//! namesake-matcher - phonetic name matching service
//!
//! Loads the bootstrap config, opens the name store, starts the HTTP server,
//! and loads the corpus in the background. Corpus routes answer 503 until the
//! load has finished; if it never succeeds the process exits.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use namesake_common::config::{ConfigOverrides, TomlConfig};
use namesake_common::logging::init_tracing;
use namesake_common::Environment;
use namesake_matcher::engine::RetryPolicy;
use namesake_matcher::store::SqliteNameStore;
use namesake_matcher::{build_router, AppState, MatchingEngine};
use tokio::signal;
use tokio::sync::oneshot;
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[command(name = "namesake-matcher")]
#[command(about = "Phonetic personal-name matching service")]
#[command(version)]
struct Args {
    /// Bootstrap TOML file (default: <config_dir>/namesake/config.toml)
    #[arg(short, long, env = "NAMESAKE_CONFIG")]
    config: Option<PathBuf>,

    /// Bucket pair to serve: production or development
    #[arg(short, long, env = "NAMESAKE_ENVIRONMENT")]
    environment: Option<Environment>,

    /// Address to bind
    #[arg(long, env = "NAMESAKE_HOST")]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "NAMESAKE_PORT")]
    port: Option<u16>,

    /// SQLite database holding the name corpus
    #[arg(short, long, env = "NAMESAKE_DATABASE")]
    database: Option<PathBuf>,

    /// Log level or filter directives (RUST_LOG still wins)
    #[arg(long, env = "NAMESAKE_LOG_LEVEL")]
    log_level: Option<String>,
}

impl Args {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            environment: self.environment,
            host: self.host.clone(),
            port: self.port,
            database_path: self.database.clone(),
            log_level: self.log_level.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let (config, source) = TomlConfig::load_or_default(args.config.as_deref())
        .context("Failed to load configuration")?;
    let config = config.with_overrides(args.overrides());
    config.validate().context("Invalid configuration")?;

    init_tracing(&config.logging).context("Failed to initialize tracing")?;

    info!(
        "Starting namesake-matcher v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    source.log();
    info!("Environment: {}", config.environment);

    let db_path = config.store.resolved_database_path();
    info!("Name store: {}", db_path.display());
    let store = SqliteNameStore::connect(&db_path)
        .await
        .with_context(|| format!("Failed to open name store at {}", db_path.display()))?;

    let engine = Arc::new(MatchingEngine::from_config(&config, Arc::new(store)));

    let admin_token = config.admin.effective_token();
    if admin_token.is_none() {
        warn!("No admin token configured, /admin routes are unauthenticated");
    }
    let state = AppState::new(engine.clone(), config.environment).with_admin_token(admin_token);
    let app = build_router(state);

    let (failed_tx, failed_rx) = oneshot::channel::<()>();
    let policy = RetryPolicy::from(&config.startup);
    let init_engine = engine.clone();
    let init = tokio::spawn(async move {
        let result = init_engine.initialize(policy).await;
        if result.is_err() {
            let _ = failed_tx.send(());
        }
        result
    });

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("namesake-matcher listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(failed_rx))
        .await
        .context("Server error")?;

    init.abort();
    let startup = init.await;
    engine.close().await;

    if let Ok(Err(e)) = startup {
        error!("Name index never loaded: {}", e);
        return Err(e).context("Initial refresh failed");
    }

    info!("Shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C, SIGTERM, or a failed initial corpus load
async fn shutdown_signal(startup_failed: oneshot::Receiver<()>) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let failed = async {
        // A dropped sender means startup succeeded
        if startup_failed.await.is_err() {
            std::future::pending::<()>().await;
        }
    };

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
        _ = failed => {
            error!("Initial corpus load failed, shutting down");
        },
    }
}
