use std::sync::Arc;

use auth::KeyProvider;
use auth::TokenService;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use user_service::config::Config;
use user_service::domain::user::service::UserService;
use user_service::inbound::http::router::create_router;
use user_service::outbound::repositories::PostgresTransactionManager;
use user_service::outbound::repositories::PostgresUserRepository;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "user_service=debug,auth=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "user-service",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load()?;

    tracing::info!(
        http_port = config.server.http_port,
        isolation_level = ?config.database.isolation_level,
        transaction_timeout_ms = config.database.transaction_timeout_ms,
        "Configuration loaded"
    );

    // No key pair, no authenticated traffic: refuse to start.
    let keys = KeyProvider::from_pem_files(
        &config.keys.private_key_path,
        &config.keys.public_key_path,
    )
    .map_err(|e| {
        tracing::error!(error = %e, "Failed to load signing keys");
        e
    })?;
    tracing::info!(
        private_key = %config.keys.private_key_path,
        public_key = %config.keys.public_key_path,
        "Signing keys loaded"
    );
    let token_service = Arc::new(TokenService::new(keys));

    let pg_pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(&config.database.url)
        .await?;
    tracing::info!(
        max_connections = config.database.max_connections,
        database = "postgresql",
        "Database connection pool created"
    );

    sqlx::migrate!("./migrations").run(&pg_pool).await?;
    tracing::info!(database = "postgresql", "Database migrations completed");

    let user_repository = Arc::new(PostgresUserRepository::new(pg_pool.clone()));
    let transactions = Arc::new(PostgresTransactionManager::new(
        pg_pool,
        config.database.isolation_level,
    ));

    let user_service = Arc::new(UserService::new(
        user_repository,
        transactions,
        Arc::clone(&token_service),
    ));

    let http_address = format!("0.0.0.0:{}", config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );

    let http_application = create_router(
        user_service,
        token_service,
        config.database.transaction_timeout(),
    );

    if let Err(e) = axum::serve(http_listener, http_application).await {
        tracing::error!(error = %e, "Server error");
        return Err(e.into());
    }

    tracing::info!("Server exited successfully");

    Ok(())
}
