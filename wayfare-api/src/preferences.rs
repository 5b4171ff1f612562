use axum::{extract::State, routing::get, Json, Router};
use wayfare_store::{PreferencesPatch, UiPreferences};

use crate::error::AppError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/api/preferences", get(get_preferences).put(update_preferences))
}

/// GET /api/preferences
async fn get_preferences(State(state): State<AppState>) -> Json<UiPreferences> {
    Json(state.preferences.read().await.get().clone())
}

/// PUT /api/preferences
/// Fields left out of the body keep their current value.
async fn update_preferences(
    State(state): State<AppState>,
    Json(patch): Json<PreferencesPatch>,
) -> Result<Json<UiPreferences>, AppError> {
    let mut preferences = state.preferences.write().await;
    let updated = preferences.update(patch)?.clone();
    Ok(Json(updated))
}
