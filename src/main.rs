use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use decision_fatigue_api::{
    api::{create_router, AppState},
    config::Config,
    db::{create_pool, create_redis_client, Cache, InMemoryStore, PostgresStore, Store},
    middleware::JwtVerifier,
    services::AiProxy,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let store: Arc<dyn Store> = if config.database_enabled() {
        let pool = create_pool(&config.database_url).await?;
        tracing::info!("Connected to PostgreSQL");
        Arc::new(PostgresStore::new(pool))
    } else {
        tracing::warn!("DATABASE_URL is empty, using the in-memory store");
        Arc::new(InMemoryStore::new())
    };

    let (cache, cache_writer) = if config.cache_enabled() {
        let client = create_redis_client(&config.redis_url)?;
        let (cache, handle) = Cache::new(client).await;
        (Some(cache), Some(handle))
    } else {
        tracing::info!("REDIS_URL is empty, stats caching disabled");
        (None, None)
    };

    let suggester = Arc::new(AiProxy::new(&config).context("Failed to build AI client")?);

    let state = AppState::new(
        store,
        suggester,
        JwtVerifier::new(&config.jwt_secret),
        cache,
        config.stats_cache_ttl_secs,
    );
    let app = create_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    tracing::info!(
        %addr,
        default_provider = %config.default_provider,
        "Server listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    if let Some(handle) = cache_writer {
        handle.shutdown().await;
    }

    tracing::info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C, shutting down"),
        _ = terminate => tracing::info!("Received terminate signal, shutting down"),
    }
}
