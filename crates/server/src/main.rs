use std::io::Read;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing::{info, warn};

use pantry_server::api::{self, AppState};
use pantry_server::auth::AuthProvider;
use pantry_server::auth::jwt::JwtManager;
use pantry_server::auth::password::hash_password;
use pantry_server::config::{JWT_SECRET_ENV, PantryConfig};
use pantry_server::store_factory::create_stores;
use pantry_service::PantryServiceBuilder;

/// Pantry expiry tracker HTTP server.
#[derive(Parser, Debug)]
#[command(name = "pantry-server", about = "Standalone HTTP server for Pantry")]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "pantry.toml")]
    config: String,

    /// Override the bind host.
    #[arg(long)]
    host: Option<String>,

    /// Override the bind port.
    #[arg(long)]
    port: Option<u16>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print an argon2 hash of a password read from stdin.
    HashPassword,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    if let Some(Commands::HashPassword) = cli.command {
        return run_hash_password();
    }

    let config = PantryConfig::load(Path::new(&cli.config))?;

    // Resolved once; nothing below reads the environment for it again.
    let secret = config.auth.resolve_secret(std::env::var(JWT_SECRET_ENV).ok())?;

    let (items, users) = create_stores(&config.store).await?;
    info!(backend = %config.store.backend, "stores initialized");

    let service = PantryServiceBuilder::new().items(items).build()?;
    let auth = AuthProvider::new(
        JwtManager::new(&secret, config.auth.jwt_expiry_seconds),
        users,
        config.auth.enforce,
    );
    if !config.auth.enforce {
        warn!("auth not enforced: item routes are open to anonymous callers");
    }

    let app = api::router(AppState {
        service: Arc::new(service),
        auth: Arc::new(auth),
    });

    let host = cli.host.unwrap_or(config.server.host);
    let port = cli.port.unwrap_or(config.server.port);
    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(%addr, "pantry server listening");

    let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();
    let mut server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = stop_rx.await;
            })
            .await
    });

    tokio::select! {
        result = &mut server => {
            result??;
            return Ok(());
        }
        () = shutdown_signal() => {}
    }

    info!("shutdown signal received, draining in-flight requests");
    let _ = stop_tx.send(());
    let timeout = Duration::from_secs(config.server.shutdown_timeout_seconds);
    if let Ok(result) = tokio::time::timeout(timeout, &mut server).await {
        result??;
    } else {
        warn!(
            timeout_seconds = config.server.shutdown_timeout_seconds,
            "shutdown timeout exceeded, aborting remaining requests"
        );
        server.abort();
    }

    info!("server stopped");
    Ok(())
}

fn run_hash_password() -> Result<(), Box<dyn std::error::Error>> {
    let mut input = String::new();
    std::io::stdin().read_to_string(&mut input)?;
    let password = input.trim_end_matches(['\r', '\n']);
    if password.is_empty() {
        return Err("no password on stdin".into());
    }
    println!("{}", hash_password(password)?);
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for ctrl-c");
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
                warn!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
