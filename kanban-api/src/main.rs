//! # Kanban API Server
//!
//! REST API for the Kanban board: users, tasks and the
//! `A Fazer` → `Fazendo` → `Pronto` workflow, persisted as JSON files.
//!
//! ## Usage
//!
//! ```bash
//! DATA_DIR=./data cargo run -p kanban-api
//! ```

use kanban_api::{
    app::{build_router, AppState},
    config::Config,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "kanban_api=debug,kanban_shared=debug,tower_http=debug".into());
    let registry = tracing_subscriber::registry().with(filter);
    if config.log.json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    tracing::info!(
        "Kanban API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );
    tracing::info!(
        tasks = %config.storage.tasks_file.display(),
        users = %config.storage.users_file.display(),
        "Using JSON file storage"
    );

    let bind_address = config.bind_address();
    let app = build_router(AppState::new(config));

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("Server listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, exiting...");
}
