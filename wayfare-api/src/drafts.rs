use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use wayfare_checkout::{
    CheckoutDraft, CheckoutDraftStore, CheckoutError, Money, Passenger, PaymentSelection,
    PriceBreakdown, SeatSelection, TicketType,
};

use crate::error::AppError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/drafts/{id}", post(init_draft).get(get_draft).delete(abandon_draft))
        .route("/api/drafts/{id}/ticket-type", put(set_ticket_type))
        .route("/api/drafts/{id}/passenger", put(set_passenger))
        .route("/api/drafts/{id}/seat", put(set_seat))
        .route("/api/drafts/{id}/payment", put(set_payment))
        .route("/api/drafts/{id}/extras/{extra_id}", put(set_extra_quantity))
        .route("/api/drafts/{id}/extras-total", put(set_extras_total))
        .route("/api/drafts/{id}/breakdown", get(breakdown))
        .route("/api/drafts/{id}/complete", post(complete_draft))
}

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct InitDraftRequest {
    /// Explicit base fare; otherwise taken from the selection with this id
    pub base_fare: Option<Money>,
}

#[derive(Debug, Deserialize)]
pub struct TicketTypeRequest {
    pub ticket_type: TicketType,
}

#[derive(Debug, Deserialize)]
pub struct ExtraQuantityRequest {
    pub quantity: i64,
    pub unit_price: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct BreakdownResponse {
    #[serde(flatten)]
    pub breakdown: PriceBreakdown,
    pub formatted_total: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/drafts/{id}
/// Idempotent: an existing draft is returned unchanged. The body is optional.
async fn init_draft(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    req: Option<Json<InitDraftRequest>>,
) -> Result<(StatusCode, Json<CheckoutDraft>), AppError> {
    let base_fare = req.and_then(|Json(req)| req.base_fare);
    let (draft, snapshot) = {
        // Lock order: selections, converter, drafts
        let selections = state.selections.read().await;
        let converter = state.converter.read().await;
        let mut drafts = state.drafts.write().await;
        let created = match base_fare {
            Some(base_fare) => drafts.init_draft(id, base_fare),
            None => {
                let entry = selections
                    .get(&id)
                    .ok_or_else(|| AppError::NotFoundError(format!("Selection {} not found", id)))?;
                drafts.init_from_selection(entry, &converter).map_err(checkout_error)?
            }
        };
        let snapshot = created.then(|| state.draft_snapshot(&drafts));
        (found(&drafts, &id)?, snapshot)
    };

    let status = match snapshot {
        Some(snapshot) => {
            state.persist_drafts(snapshot).await;
            StatusCode::CREATED
        }
        None => StatusCode::OK,
    };
    Ok((status, Json(draft)))
}

/// GET /api/drafts/{id}
async fn get_draft(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CheckoutDraft>, AppError> {
    let drafts = state.drafts.read().await;
    found(&drafts, &id).map(Json)
}

/// PUT /api/drafts/{id}/ticket-type
async fn set_ticket_type(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<TicketTypeRequest>,
) -> Result<Json<CheckoutDraft>, AppError> {
    mutate(&state, id, |drafts| drafts.set_ticket_type(&id, req.ticket_type)).await
}

/// PUT /api/drafts/{id}/passenger
async fn set_passenger(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(passenger): Json<Passenger>,
) -> Result<Json<CheckoutDraft>, AppError> {
    mutate(&state, id, |drafts| drafts.set_passenger(&id, passenger)).await
}

/// PUT /api/drafts/{id}/seat
/// A `null` body clears the seat.
async fn set_seat(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(seat): Json<Option<SeatSelection>>,
) -> Result<Json<CheckoutDraft>, AppError> {
    mutate(&state, id, |drafts| drafts.set_seat(&id, seat)).await
}

/// PUT /api/drafts/{id}/payment
async fn set_payment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payment): Json<Option<PaymentSelection>>,
) -> Result<Json<CheckoutDraft>, AppError> {
    mutate(&state, id, |drafts| drafts.set_payment_method(&id, payment)).await
}

/// PUT /api/drafts/{id}/extras/{extra_id}
async fn set_extra_quantity(
    State(state): State<AppState>,
    Path((id, extra_id)): Path<(Uuid, String)>,
    Json(req): Json<ExtraQuantityRequest>,
) -> Result<Json<CheckoutDraft>, AppError> {
    mutate(&state, id, |drafts| {
        drafts.set_extra_quantity(&id, &extra_id, req.quantity, req.unit_price)
    })
    .await
}

/// PUT /api/drafts/{id}/extras-total
async fn set_extras_total(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(total): Json<Money>,
) -> Result<Json<CheckoutDraft>, AppError> {
    mutate(&state, id, |drafts| drafts.set_extras_total(&id, total)).await
}

/// GET /api/drafts/{id}/breakdown
/// Always answers; an unknown draft prices at zero.
async fn breakdown(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Json<BreakdownResponse> {
    let converter = state.converter.read().await;
    let breakdown = state.drafts.read().await.breakdown(&id, &converter);
    let formatted_total = converter.format(breakdown.total, breakdown.currency);
    Json(BreakdownResponse {
        breakdown,
        formatted_total,
    })
}

/// POST /api/drafts/{id}/complete
async fn complete_draft(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CheckoutDraft>, AppError> {
    let (draft, snapshot) = {
        let mut drafts = state.drafts.write().await;
        let draft = drafts.complete(&id).map_err(checkout_error)?;
        (draft, state.draft_snapshot(&drafts))
    };
    state.persist_drafts(snapshot).await;
    state.selections.write().await.take(&id);
    Ok(Json(draft))
}

/// DELETE /api/drafts/{id}
async fn abandon_draft(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let snapshot = {
        let mut drafts = state.drafts.write().await;
        if !drafts.abandon(&id) {
            return Err(not_found(&id));
        }
        state.draft_snapshot(&drafts)
    };
    state.persist_drafts(snapshot).await;
    Ok(StatusCode::NO_CONTENT)
}

async fn mutate(
    state: &AppState,
    id: Uuid,
    f: impl FnOnce(&mut CheckoutDraftStore) -> bool,
) -> Result<Json<CheckoutDraft>, AppError> {
    let (draft, snapshot) = {
        let mut drafts = state.drafts.write().await;
        if !f(&mut *drafts) {
            return Err(not_found(&id));
        }
        (found(&drafts, &id)?, state.draft_snapshot(&drafts))
    };
    state.persist_drafts(snapshot).await;
    Ok(Json(draft))
}

fn found(drafts: &CheckoutDraftStore, id: &Uuid) -> Result<CheckoutDraft, AppError> {
    drafts.get(id).cloned().ok_or_else(|| not_found(id))
}

fn not_found(id: &Uuid) -> AppError {
    AppError::NotFoundError(format!("Draft {} not found", id))
}

fn checkout_error(err: CheckoutError) -> AppError {
    match err {
        CheckoutError::DraftNotFound(id) => not_found(&id),
        CheckoutError::NotAFlight => AppError::ValidationError(err.to_string()),
        CheckoutError::Storage(_) => AppError::InternalServerError(err.to_string()),
    }
}
