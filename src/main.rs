//! User Cache - user lookup service with an epoch-invalidated read-through cache
//!
//! Serves user lookups from memory and invalidates every cached view on each
//! committed mutation.

use std::net::SocketAddr;

use anyhow::Context;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use user_cache::api::create_router;
use user_cache::service::ADMIN_EMAIL;
use user_cache::{spawn_sweep_task, AppState, Config};

/// Main entry point for the user service.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Create the store, cache and service
/// 4. Seed the admin account if enabled
/// 5. Start background cache sweep task
/// 6. Create Axum router with all endpoints
/// 7. Start HTTP server on configured port
/// 8. Handle graceful shutdown on SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "user_cache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting user service");

    let config = Config::from_env();
    info!(
        "Configuration loaded: port={}, sweep_interval={}s, detail_ttl={}s, list_ttl={}s, count_ttl={}s, uniqueness_ttl={}s",
        config.server_port,
        config.sweep_interval,
        config.detail_ttl,
        config.list_ttl,
        config.count_ttl,
        config.uniqueness_ttl
    );

    let state = AppState::from_config(&config);
    info!("User store and cache initialized");

    if config.seed_admin {
        let created = state
            .service
            .seed_admin()
            .await
            .context("failed to seed admin account")?;
        if created {
            info!("Seeded admin account {}", ADMIN_EMAIL);
        }
    }

    let sweep_handle = spawn_sweep_task(state.service.cache().clone(), config.sweep_interval);
    info!("Background sweep task started");

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(sweep_handle))
        .await
        .context("server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
///
/// On shutdown signal, aborts the sweep task and allows graceful shutdown.
async fn shutdown_signal(sweep_handle: tokio::task::JoinHandle<()>) {
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
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }

    sweep_handle.abort();
    warn!("Sweep task aborted");
}
