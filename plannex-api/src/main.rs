//! # Plannex API Server
//!
//! Serves the user directory of the Plannex back-office.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p plannex-api
//! ```
//!
//! The schema is owned by `plannex-seed` (which applies migrations); this
//! server only connects to it.

use plannex_api::app::{build_router, AppState};
use plannex_api::config::Config;
use plannex_shared::db::pool::{close_pool, create_pool};
use plannex_shared::directory::store::PgUserStore;
use plannex_shared::directory::UserDirectory;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "plannex_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "Plannex API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let config = Config::from_env()?;
    let pool = create_pool(config.pool()).await?;

    let directory = UserDirectory::new(Arc::new(PgUserStore::new(pool.clone())));
    let bind_address = config.bind_address();
    let app = build_router(AppState::new(directory, config));

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("Server listening on http://{}", bind_address);

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    close_pool(pool).await;
    served?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        // Without a signal handler, run until killed
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, draining connections...");
}
