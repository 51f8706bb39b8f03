//! HOTS API server entry point.
//!
//! Wires the database pool, the ticket API router, the identity middleware,
//! and the custom function worker, then serves until interrupted.

mod config;
mod logging;

use axum::{middleware, routing::get, Extension, Router};
use sqlx::postgres::PgPoolOptions;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use hots_api_tickets::{identity_middleware, tickets_router, IdentityConfig, TicketsState};
use hots_workflow::{CustomFunctionWorker, TicketEventPublisher};

use config::Config;

#[tokio::main]
async fn main() {
    logging::init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            tracing::error!(error = %err, "Configuration error");
            std::process::exit(1);
        }
    };

    if let Err(err) = run(config).await {
        tracing::error!(error = %err, "Server error");
        std::process::exit(1);
    }
}

async fn run(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.database_url)
        .await?;

    hots_db::run_migrations(&pool).await?;

    let (publisher, receiver) = TicketEventPublisher::new(config.event_channel_capacity);

    // Handlers for concrete function kinds are registered here as they are
    // implemented; unhandled kinds are logged and skipped.
    let worker = CustomFunctionWorker::new(pool.clone(), receiver);
    tokio::spawn(worker.run());

    let state = TicketsState::new(pool, publisher);
    let identity = IdentityConfig::new(config.jwt_secret.as_bytes());

    let api = tickets_router(state)
        .layer(middleware::from_fn(identity_middleware))
        .layer(Extension(identity));

    let app = Router::new()
        .route("/health", get(health))
        .merge(api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(addr = %addr, "HOTS API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn health() -> &'static str {
    "ok"
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "Failed to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => tracing::error!(error = %err, "Failed to install SIGTERM handler"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
