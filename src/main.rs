use anyhow::{Context, Result};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use townhall::api::{self, AppState};
use townhall::config::Config;
use townhall::store::PgStore;
use townhall::translation::ProviderRegistry;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored in production)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("townhall=info".parse()?),
        )
        .init();

    info!("Starting townhall API");

    // Load configuration from environment
    let config = Config::from_env()?;

    // Step 1: Connect to the database
    let store = PgStore::connect(&config.database_url, config.database_max_connections).await?;
    if config.run_migrations {
        store.migrate().await?;
    }

    // Step 2: Set up translation providers
    let translator = ProviderRegistry::from_config(&config.translator)?;
    let available: Vec<_> = translator
        .providers()
        .iter()
        .filter(|p| p.available())
        .map(|p| p.name())
        .collect();
    if available.is_empty() {
        warn!("No translation provider configured, translations will be unavailable");
    } else {
        info!("Translation providers available: {}", available.join(", "));
    }

    // Step 3: Serve
    let state = AppState::new(Arc::new(store), translator)
        .with_paging(config.default_per_page, config.max_per_page);
    let app = api::router(state).layer(TraceLayer::new_for_http());

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("Listening on {}", addr);
    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
