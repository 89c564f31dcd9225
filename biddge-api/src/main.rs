//! # Biddge API Server
//!
//! HTTP backend for the Biddge community app: registration and login,
//! community listing and creation, and join/leave.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p biddge-api --bin biddge-api
//! ```

use biddge_api::{
    app::{build_router, AppState},
    config::Config,
    telemetry,
};
use biddge_shared::{
    db::{migrations::run_migrations, pool::create_pool},
    store::{PgStore, Store},
};
use std::sync::Arc;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    telemetry::init();

    info!("Biddge API Server v{} starting...", env!("CARGO_PKG_VERSION"));

    let config = Config::from_env()?;

    let pool = create_pool(&config.pool_config()).await?;
    run_migrations(&pool).await?;

    let store: Arc<dyn Store> = Arc::new(PgStore::new(pool));

    info!(database = %config.database.name, "Connected to database");
    match store.count_communities().await {
        Ok(0) => warn!("No communities yet; run biddge-seed or POST /api/debug/seed"),
        Ok(count) => info!(count, "Communities in database"),
        Err(e) => warn!(error = %e, "Could not count communities"),
    }
    info!(origins = ?config.api.cors_origins, "CORS allowed origins");

    let bind_address = config.bind_address();
    let app = build_router(AppState::new(store.clone(), config));

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    store.close().await;
    info!("Shutdown complete");

    Ok(())
}

/// Resolves on Ctrl-C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl-C");
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
                warn!(error = %e, "Failed to listen for SIGTERM");
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

    info!("Shutdown signal received, draining connections...");
}
