use axum::{http::Method, routing::get, Json, Router};
use serde_json::{json, Value};
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod currency;
pub mod drafts;
pub mod error;
pub mod filters;
pub mod locale;
pub mod preferences;
pub mod search;
pub mod selections;
pub mod state;

pub use state::AppState;

pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([axum::http::header::CONTENT_TYPE, axum::http::header::USER_AGENT]);

    Router::new()
        .route("/health", get(health))
        .merge(search::routes())
        .merge(filters::routes())
        .merge(selections::routes())
        .merge(drafts::routes())
        .merge(currency::routes())
        .merge(preferences::routes())
        .fallback(locale::fallback)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Periodically drop expired checkout drafts and write the survivors back.
pub fn spawn_draft_purger(state: AppState, every: Duration) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        loop {
            ticker.tick().await;
            let snapshot = {
                let mut drafts = state.drafts.write().await;
                (drafts.purge_expired(chrono::Utc::now()) > 0).then(|| state.draft_snapshot(&drafts))
            };
            if let Some(snapshot) = snapshot {
                state.persist_drafts(snapshot).await;
            }
        }
    })
}
