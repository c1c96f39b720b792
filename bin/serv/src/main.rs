use std::{sync::Arc, time::Duration};

use anyhow::Context;
use sa_api::{
    config::ApiConfig, jobs::start_background_jobs, metrics::init_metrics, router,
    state::ApiState, store::Store, tracing::init_tracing,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration from environment variables
    dotenvy::dotenv().ok();
    let config = ApiConfig::from_env().context("failed to load configuration")?;

    init_tracing(config.env);

    let metrics = match init_metrics() {
        Ok(handle) => Some(handle),
        Err(e) => {
            tracing::warn!(error = %e, "metrics exporter not installed");
            None
        }
    };

    let store = match config.database_url.as_deref() {
        Some(url) => {
            let pool = sa_db::create_pool(url, config.db_max_connections).await?;
            sa_db::ensure_db_and_migrate(url, &pool).await?;
            tracing::info!("using postgres store");
            Store::Postgres(pool)
        }
        None => {
            tracing::warn!("DATABASE_URL not set, data is kept in memory only");
            Store::memory()
        }
    };

    let state = ApiState::from_config(&config, store);
    let sessions = Arc::clone(&state.sessions);
    let jobs = start_background_jobs(
        Arc::clone(&sessions),
        Duration::from_secs(config.session_retention_secs),
    );

    let app = router::app(state, metrics, &config.allowed_origins);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!("Server running on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    for job in jobs {
        job.abort();
    }
    sessions.shutdown().await;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
