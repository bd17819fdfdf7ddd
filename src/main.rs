//! Samuday Shakti - FPO membership and group chat service
//!
//! Serves the community API of the Krishi Sahayak portal: farmers join
//! Farmer Producer Organizations and talk in membership-gated group chats.

use std::env;
use std::net::SocketAddr;

use anyhow::{Context, Result};
use tracing::info;

use samuday_shakti::{
    create_router, db, logging, middleware::auth::create_session_token, AppConfig, AppState,
};

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    if args.iter().any(|arg| arg == "--help" || arg == "-h") {
        print_help();
        return Ok(());
    }

    if args.iter().any(|arg| arg == "--version" || arg == "-V") {
        println!("Samuday Shakti {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    // Load configuration first (before logging, so we know log format)
    let config = AppConfig::load().context("Failed to load configuration")?;

    if args.iter().any(|arg| arg == "--check-config") {
        println!("Configuration OK");
        println!("  listen:   {}:{}", config.server.host, config.server.port);
        println!("  database: {}", config.database.url);
        println!("  logging:  {:?} -> {:?}", config.logging.format, config.logging.target);
        return Ok(());
    }

    if let Some(pos) = args.iter().position(|arg| arg == "--issue-token") {
        let email = args
            .get(pos + 1)
            .filter(|e| !e.starts_with('-'))
            .context("--issue-token requires an email address")?;
        return issue_token(&config, email);
    }

    // The guard must be kept alive so file logs are flushed
    let _log_guard = logging::init_logging(&config.logging)?;

    info!("Samuday Shakti {} starting up", env!("CARGO_PKG_VERSION"));

    info!("Initializing database connection");
    let db = db::init_pool(&config.database)
        .await
        .context("Failed to initialize database")?;

    let state = AppState::new(config.clone(), db.clone());
    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address configuration")?;

    info!("Starting HTTP server on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("HTTP server error")?;

    info!("Server stopped, closing database pool");
    db.close().await;

    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
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

    info!("Shutdown signal received");
}

/// Print a session token for local testing without the auth provider
fn issue_token(config: &AppConfig, email: &str) -> Result<()> {
    let subject = format!("local|{}", uuid::Uuid::new_v4());
    let token = create_session_token(&subject, email, &config.auth)
        .context("Failed to sign session token")?;
    println!("{}", token);
    Ok(())
}

/// Print help message
fn print_help() {
    println!(
        r#"Samuday Shakti {}

USAGE:
    samuday-shakti [OPTIONS]

OPTIONS:
    -h, --help              Print this help message
    -V, --version           Print version information
    --check-config          Load and validate the configuration, then exit
    --issue-token <EMAIL>   Print a session token for EMAIL signed with the
                            configured session secret (local testing only)

ENVIRONMENT:
    SAMUDAY_CONFIG      Path to configuration file (default: config.yaml)
    DATABASE_URL        SQLite database URL
    SESSION_SECRET      Secret the auth provider signs session tokens with
    RUST_LOG            Log filter (overrides logging.level)

CONFIGURATION:
    The application looks for configuration files in the following order:
    1. Path specified by SAMUDAY_CONFIG environment variable
    2. ./config.yaml
    3. ./config/config.yaml
    4. /etc/samuday-shakti/config.yaml"#,
        env!("CARGO_PKG_VERSION")
    );
}
