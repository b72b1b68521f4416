//! services/api/src/bin/api.rs

use api_lib::{
    adapters::DbAdapter,
    config::Config,
    error::ApiError,
    web::{build_app, state::AppState},
};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use timetable_core::{DatabaseService, InMemoryDatabase};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Config::from_env()?;
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Connect to Database & Run Migrations ---
    let db: Arc<dyn DatabaseService> = match &config.database_url {
        Some(url) => {
            info!("Connecting to database...");
            let db_pool = PgPoolOptions::new()
                .max_connections(config.database_max_connections)
                .connect(url)
                .await?;
            let db_adapter = DbAdapter::new(db_pool);
            info!("Running database migrations...");
            db_adapter.run_migrations().await?;
            info!("Database migrations complete.");
            Arc::new(db_adapter)
        }
        None => {
            warn!("DATABASE_URL is not set; using the in-memory store. Data is lost on exit.");
            Arc::new(InMemoryDatabase::new())
        }
    };

    // --- 3. Build the Shared AppState & Router ---
    let app_state = Arc::new(AppState::new(db));
    let app = build_app(app_state, &config)?;

    // --- 4. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
