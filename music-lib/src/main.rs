//! music-lib - song catalog service
//!
//! Startup order: .env, configuration, tracing, database pool and schema,
//! service wiring, HTTP server. On Ctrl+C / SIGTERM in-flight requests drain
//! before the pool is closed.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use music_lib::enrichment::MusicInfoClient;
use music_lib::repository::PgSongRepository;
use music_lib::service::SongService;
use music_lib::{build_router, AppState};
use music_lib_common::config::{load_toml_config, ConfigOverrides, LogFormat, ServiceConfig};
use tokio::signal;
use tracing::{error, info};

/// Command-line arguments for music-lib
///
/// Every option can also come from the environment (including a `.env`
/// file in the working directory) or from the TOML file given by `--config`.
#[derive(Parser, Debug)]
#[command(name = "music-lib")]
#[command(about = "Song catalog service with metadata enrichment")]
#[command(version)]
struct Args {
    /// TOML config file
    #[arg(long, env = "MUSIC_LIB_CONFIG")]
    config: Option<PathBuf>,

    /// Port to listen on
    #[arg(short, long, env = "APP_PORT")]
    port: Option<u16>,

    #[arg(long, env = "DB_HOST")]
    db_host: Option<String>,

    #[arg(long, env = "DB_PORT")]
    db_port: Option<u16>,

    #[arg(long, env = "DB_USERNAME")]
    db_username: Option<String>,

    #[arg(long, env = "DB_PASSWORD", hide_env_values = true)]
    db_password: Option<String>,

    #[arg(long, env = "DB_NAME")]
    db_name: Option<String>,

    /// Postgres sslmode (disable, allow, prefer, require, verify-ca, verify-full)
    #[arg(long, env = "DB_SSL_MODE")]
    db_ssl_mode: Option<String>,

    #[arg(long, env = "DB_MAX_CONNECTIONS")]
    db_max_connections: Option<u32>,

    /// Base URL of the music info provider (requests go to <url>/info)
    #[arg(long, env = "MUSIC_INFO_URL")]
    music_info_url: Option<String>,

    /// Music info request timeout in seconds
    #[arg(long, env = "MUSIC_INFO_TIMEOUT_SECS")]
    music_info_timeout_secs: Option<u64>,

    /// Default log filter when RUST_LOG is unset
    #[arg(long, env = "MUSIC_LIB_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log output format (text or json)
    #[arg(long, env = "MUSIC_LIB_LOG_FORMAT")]
    log_format: Option<LogFormat>,
}

impl Args {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            port: self.port,
            db_host: self.db_host.clone(),
            db_port: self.db_port,
            db_username: self.db_username.clone(),
            db_password: self.db_password.clone(),
            db_name: self.db_name.clone(),
            db_ssl_mode: self.db_ssl_mode.clone(),
            db_max_connections: self.db_max_connections,
            music_info_url: self.music_info_url.clone(),
            music_info_timeout_secs: self.music_info_timeout_secs,
            log_level: self.log_level.clone(),
            log_format: self.log_format,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Must run before clap reads the environment
    let dotenv_path = dotenvy::dotenv().ok();

    let args = Args::parse();

    let file_config = args
        .config
        .as_deref()
        .map(load_toml_config)
        .transpose()
        .context("Failed to load config file")?;
    let config = ServiceConfig::resolve(args.overrides(), file_config)
        .context("Invalid configuration")?;

    music_lib_common::logging::init_tracing(&config.logging)
        .context("Failed to initialize logging")?;

    info!(
        "Starting music-lib v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    if let Some(path) = dotenv_path {
        info!("Loaded environment from {}", path.display());
    }

    let pool = music_lib_common::db::connect(&config.database)
        .await
        .context("Failed to connect to database")?;
    music_lib_common::db::init_schema(&pool)
        .await
        .context("Failed to initialize database schema")?;

    let repository = Arc::new(PgSongRepository::new(pool.clone()));
    let music_info = Arc::new(
        MusicInfoClient::new(&config.music_info).context("Failed to create music info client")?,
    );
    info!(
        url = %config.music_info.base_url,
        timeout = ?config.music_info.timeout,
        "Music info provider configured"
    );

    let state = AppState::new(SongService::new(repository, music_info));
    let app = build_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("music-lib listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server stopped; closing database pool");
    pool.close().await;

    info!("Shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM
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
            Ok(mut stream) => {
                stream.recv().await;
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
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
