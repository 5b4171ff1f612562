use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use wayfare_checkout::{SelectionCriteria, SelectionEntry};
use wayfare_shared::SelectedResult;

use crate::error::AppError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/selections", post(create_selection))
        .route("/api/selections/{id}", get(get_selection))
}

#[derive(Debug, Deserialize)]
pub struct CreateSelectionRequest {
    pub result: SelectedResult,
    pub criteria: SelectionCriteria,
}

#[derive(Debug, Serialize)]
pub struct CreateSelectionResponse {
    pub id: Uuid,
    /// Set when a checkout draft was started for a flight
    pub draft_created: bool,
}

/// POST /api/selections
/// Stores the picked result. Flights also get a checkout draft.
async fn create_selection(
    State(state): State<AppState>,
    Json(req): Json<CreateSelectionRequest>,
) -> Result<(StatusCode, Json<CreateSelectionResponse>), AppError> {
    let is_flight = req.result.as_flight().is_some();
    let mut snapshot = None;
    let id = {
        let mut selections = state.selections.write().await;
        let id = selections.create(req.result, req.criteria);
        if is_flight {
            if let Some(entry) = selections.get(&id) {
                let converter = state.converter.read().await;
                let mut drafts = state.drafts.write().await;
                if drafts.init_from_selection(entry, &converter)? {
                    snapshot = Some(state.draft_snapshot(&drafts));
                }
            }
        }
        id
    };

    let draft_created = snapshot.is_some();
    if let Some(snapshot) = snapshot {
        state.persist_drafts(snapshot).await;
    }

    Ok((StatusCode::CREATED, Json(CreateSelectionResponse { id, draft_created })))
}

/// GET /api/selections/{id}
async fn get_selection(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SelectionEntry>, AppError> {
    let selections = state.selections.read().await;
    selections
        .get(&id)
        .cloned()
        .map(Json)
        .ok_or_else(|| AppError::NotFoundError(format!("Selection {} not found", id)))
}
