use todo_api::app::build_app;
use todo_api::core::auth::{JwtService, PasswordHasher};
use todo_api::core::config::Config;
use todo_api::core::db::{create_pool_with_migrations, health_check};
use todo_api::core::notifications::Notifier;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Load .env file (if exists)
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "todo_api=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    // Log config status (without revealing secrets)
    tracing::info!(
        "Config loaded: database={}, token_ttl_minutes={}, bcrypt_cost={}",
        config.database.database_url,
        config.jwt.access_token_expiration_minutes,
        config.bcrypt_cost
    );

    let hasher = match PasswordHasher::new(config.bcrypt_cost) {
        Ok(hasher) => hasher,
        Err(e) => {
            tracing::error!("Invalid password hashing setup: {e}");
            std::process::exit(1);
        }
    };

    // A hasher that cannot verify its own output would lock every account out
    if let Err(e) = hasher.self_check() {
        tracing::error!("Password hashing self-check failed: {e}");
        std::process::exit(1);
    }

    let pool = match create_pool_with_migrations(&config.database).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("Failed to open database: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = health_check(&pool).await {
        tracing::error!("Database health check failed: {e}");
        std::process::exit(1);
    }

    let app = build_app(
        pool.clone(),
        JwtService::new(config.jwt.clone()),
        hasher,
        Notifier::new(config.notification_delay),
    );

    let listener = match tokio::net::TcpListener::bind(config.listen_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("Failed to bind {}: {e}", config.listen_addr);
            std::process::exit(1);
        }
    };

    tracing::info!("listening on http://{}", config.listen_addr);

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!("Server error: {e}");
    }

    pool.close().await;
    tracing::info!("Server stopped");
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
        return;
    }
    tracing::info!("Shutdown signal received");
}
