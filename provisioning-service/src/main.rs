use provisioning_service::{
    build_router,
    config::ProvisioningConfig,
    services::{AdminApiProvider, Database, JwtService, ProvisioningService},
    AppState,
};
use service_core::observability::logging::init_tracing;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;

#[tokio::main]
async fn main() -> Result<(), service_core::error::AppError> {
    // Load configuration - fail fast if invalid
    let config = ProvisioningConfig::from_env()?;

    // Initialize tracing/logging using shared logic
    init_tracing(
        &config.service_name,
        &config.log_level,
        config.otlp_endpoint.as_deref(),
    );

    tracing::info!(
        service = %config.service_name,
        version = %config.service_version,
        environment = ?config.environment,
        "Starting provisioning service"
    );

    // Initialize database connection
    tracing::info!("Initializing database connection");
    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(&config.database.url)
        .await
        .map_err(|e| {
            service_core::error::AppError::DatabaseError(anyhow::anyhow!(
                "Failed to connect to database: {}",
                e
            ))
        })?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .map_err(|e| {
            service_core::error::AppError::DatabaseError(anyhow::anyhow!(
                "Migration failed: {}",
                e
            ))
        })?;
    let db = Database::new(pool);
    tracing::info!("Database initialized successfully");

    // Identity provider admin client
    let identity = Arc::new(AdminApiProvider::new(&config.identity));
    tracing::info!("Identity provider client initialized");

    // Caller token validation
    let jwt = JwtService::new(&config.jwt);

    // Provisioning pipeline
    let provisioning = ProvisioningService::new(db.clone(), identity);

    // Create application state
    let state = AppState {
        config: config.clone(),
        db,
        jwt,
        provisioning,
    };

    // Build application router
    let app = build_router(state).await?;

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));

    tracing::info!(address = %addr, "Listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(config.common.shutdown_grace_seconds))
        .await?;

    tracing::info!("Service shutdown complete");
    Ok(())
}

async fn shutdown_signal(grace_seconds: u64) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received SIGINT, starting graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        },
    }

    // Give in-flight batches time to complete
    tokio::time::sleep(tokio::time::Duration::from_secs(grace_seconds)).await;
}
