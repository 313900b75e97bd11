//! Valpadel Booking Service - Main Application Entry Point
//!
//! This is a REST API server for booking padel court time slots within the
//! current calendar week. Clients pick a day, a court, and one of the fixed
//! time slots, then reserve it with a name and a 6-digit key; the same key
//! cancels the booking.
//!
//! # Architecture
//!
//! - **Web Framework**: Axum (async HTTP server)
//! - **Persistence**: PostgreSQL with sqlx, or an in-memory store (selected
//!   at startup via STORE_BACKEND)
//! - **Live updates**: Server-Sent Events pushing full weekly snapshots
//! - **Format**: JSON requests/responses
//!
//! # Startup Flow
//!
//! 1. Load configuration from environment variables
//! 2. Build the configured store (postgres: pool + migrations)
//! 3. Build HTTP router with routes and middleware
//! 4. Start server on configured port

mod config;
mod db;
mod error;
mod handlers;
mod models;
mod schedule;
mod store;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use axum::{
    Router,
    routing::{delete, get, post, put},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    config::StoreBackend,
    store::{AppState, memory::MemoryStore, postgres::PostgresStore},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging with tracing subscriber. Reads RUST_LOG environment variable (defaults to "info" level)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    // Load configuration
    let config = config::Config::from_env()?;
    tracing::info!("Configuration loaded");

    // Build the configured store backend; chosen once, never switched at runtime
    let state = match config.store_backend {
        StoreBackend::Postgres => {
            let database_url = config
                .database_url
                .as_deref()
                .ok_or_else(|| anyhow::anyhow!("DATABASE_URL is required for the postgres backend"))?;

            let pool = db::create_pool(database_url).await?;
            tracing::info!("Database pool created");

            db::run_migrations(&pool).await?;
            tracing::info!("Database migrations complete");

            let postgres = Arc::new(PostgresStore::new(pool));
            AppState {
                bookings: postgres.clone(),
                faqs: postgres,
            }
        }
        StoreBackend::Memory => {
            tracing::warn!("Using the in-memory store; bookings will not survive a restart");
            let memory = Arc::new(MemoryStore::new());
            AppState {
                bookings: memory.clone(),
                faqs: memory,
            }
        }
    };

    let app = Router::new()
        // Health check
        .route("/health", get(handlers::health::health_check))
        // Booking routes
        .route("/api/v1/bookings", get(handlers::bookings::list_bookings))
        .route("/api/v1/bookings", post(handlers::bookings::create_booking))
        .route("/api/v1/bookings/week", get(handlers::bookings::week_view))
        .route("/api/v1/bookings/find", get(handlers::bookings::find_booking))
        .route("/api/v1/bookings/subscribe", get(handlers::live::subscribe))
        .route(
            "/api/v1/bookings/{id}",
            delete(handlers::bookings::cancel_booking),
        )
        // FAQ routes
        .route("/api/v1/faqs", get(handlers::faqs::list_faqs))
        .route("/api/v1/faqs", post(handlers::faqs::create_faq))
        .route("/api/v1/faqs/{id}", put(handlers::faqs::update_faq))
        .route("/api/v1/faqs/{id}", delete(handlers::faqs::delete_faq))
        // Add distributed tracing middleware for observability
        .layer(TraceLayer::new_for_http())
        // The booking frontend is served from a different origin
        .layer(CorsLayer::permissive())
        // Share the store with all handlers via State extraction
        .with_state(state);

    // Bind to network address and start server
    let addr = format!("0.0.0.0:{}", config.server_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    // Start serving HTTP requests
    // This blocks forever, handling requests concurrently with tokio
    axum::serve(listener, app).await?;

    Ok(())
}
