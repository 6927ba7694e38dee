use anyhow::Context;
use std::net::SocketAddr;
use taalim::{config::AppConfig, db, routes, services, AppState};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "taalim=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env().context("invalid configuration")?;
    config.warn_on_insecure_settings();

    // Database connection
    let pool = db::create_pool(&config.database_url)
        .await
        .with_context(|| format!("failed to open database {}", config.database_url))?;

    // Run migrations
    db::run_migrations(&pool)
        .await
        .context("failed to run migrations")?;

    tokio::fs::create_dir_all(&config.contracts_dir)
        .await
        .with_context(|| {
            format!(
                "failed to create contracts directory {}",
                config.contracts_dir.display()
            )
        })?;

    let email_service = services::create_email_service(&config);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .with_context(|| format!("invalid bind address {}:{}", config.host, config.port))?;

    tracing::info!(
        "Starting {} in {} mode",
        env!("CARGO_PKG_NAME"),
        config.environment
    );

    let app_state = AppState::new(pool, config, email_service);
    let app = routes::build_router(app_state);

    tracing::info!("Server listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    axum::serve(listener, app).await?;

    Ok(())
}
