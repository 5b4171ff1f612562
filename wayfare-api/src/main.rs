use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use wayfare_api::{app, spawn_draft_purger, AppState};
use wayfare_catalog::{Dataset, Latency, MockSearchService};
use wayfare_store::app_config::Config;
use wayfare_store::FileStorage;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wayfare_api=debug,wayfare_checkout=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load()?;
    tracing::info!("Starting Wayfare API on port {}", config.server.port);

    let storage = Arc::new(FileStorage::open(&config.storage.path)?);
    let search = MockSearchService::new(
        Dataset::builtin()?,
        Latency::from_millis(config.search.latency_min_ms, config.search.latency_max_ms),
    )
    .with_default_limit(config.search.page_size);

    let app_state = AppState::new(&config, storage, Arc::new(search));
    spawn_draft_purger(
        app_state.clone(),
        Duration::from_secs(config.checkout.purge_interval_seconds.max(1)),
    );

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
