use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use arama_api::{app, notifier, AppState};
use arama_catalog::PricingConfig;
use arama_store::{app_config::Config, seed_defaults, DbClient, Repositories};
use arama_sync::HttpFeedFetcher;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "arama_api=debug,arama_sync=info,arama_store=info,tower_http=debug,axum::rejection=trace"
                    .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().context("Failed to load config")?;
    tracing::info!("Starting Arama API on port {}", config.server.port);

    let repos = if config.database.url.trim().is_empty() {
        tracing::warn!("No database url configured, using the in-memory store");
        Repositories::in_memory()
    } else {
        let db = DbClient::new(&config.database)
            .await
            .context("Failed to connect to Postgres")?;
        db.migrate().await.context("Failed to run migrations")?;
        Repositories::postgres(db.pool.clone())
    };

    if let Err(e) = seed_defaults(&repos).await {
        tracing::warn!("Failed to seed default data: {}", e);
    }

    let fetcher = HttpFeedFetcher::new(Duration::from_secs(config.sync.fetch_timeout_seconds))
        .context("Failed to build feed fetcher")?;
    let notifier = notifier::from_config(&config.notify).context("Invalid notify config")?;

    let state = AppState::new(
        repos,
        Arc::new(fetcher),
        notifier,
        PricingConfig {
            baseline_rate: config.pricing.baseline_rate,
            baseline_label: config.pricing.baseline_label.clone(),
        },
        config.sync.max_concurrent,
    );

    if config.sync.schedule_interval_seconds > 0 {
        let every = Duration::from_secs(config.sync.schedule_interval_seconds);
        tracing::info!("Scheduled feed sync every {:?}", every);
        state.sync.clone().spawn_schedule(every);
    }

    let app = app(state, &config.server.allowed_origin);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app).await?;
    Ok(())
}
