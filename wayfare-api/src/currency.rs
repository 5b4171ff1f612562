use axum::{
    extract::{Query, State},
    routing::{get, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use wayfare_core::{CurrencyCode, RateTable};

use crate::error::AppError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/currency", get(get_currency))
        .route("/api/currency/rates", put(replace_rates))
        .route("/api/currency/selected", put(select_currency))
        .route("/api/currency/format", get(format_amount))
}

#[derive(Debug, Serialize)]
pub struct CurrencyResponse {
    pub reference: CurrencyCode,
    pub pivot: CurrencyCode,
    pub selected: CurrencyCode,
    pub rates: RateTable,
}

#[derive(Debug, Deserialize)]
pub struct SelectCurrencyRequest {
    pub currency: CurrencyCode,
}

#[derive(Debug, Deserialize)]
pub struct FormatQuery {
    pub amount: f64,
    /// Currency `amount` is already in; omitted means a reference-currency
    /// price converted to the selected currency
    pub currency: Option<CurrencyCode>,
}

#[derive(Debug, Serialize)]
pub struct FormatResponse {
    pub formatted: String,
}

/// GET /api/currency
async fn get_currency(State(state): State<AppState>) -> Json<CurrencyResponse> {
    let converter = state.converter.read().await;
    Json(CurrencyResponse {
        reference: converter.reference(),
        pivot: converter.pivot(),
        selected: converter.selected(),
        rates: converter.rates().clone(),
    })
}

/// PUT /api/currency/rates
/// Replaces the whole table.
async fn replace_rates(
    State(state): State<AppState>,
    Json(rates): Json<RateTable>,
) -> Result<Json<CurrencyResponse>, AppError> {
    if rates.is_empty() {
        return Err(AppError::ValidationError("rate table is empty".to_string()));
    }
    if let Some((code, rate)) = rates.iter().find(|(_, rate)| !rate.is_finite() || **rate <= 0.0) {
        return Err(AppError::ValidationError(format!("invalid rate {} for {}", rate, code)));
    }

    state.converter.write().await.replace_rates(rates);
    tracing::info!("Exchange rates replaced");
    Ok(get_currency(State(state)).await)
}

/// PUT /api/currency/selected
async fn select_currency(
    State(state): State<AppState>,
    Json(req): Json<SelectCurrencyRequest>,
) -> Result<Json<CurrencyResponse>, AppError> {
    {
        let mut converter = state.converter.write().await;
        if req.currency != converter.pivot() && converter.rates().get(&req.currency).is_none() {
            return Err(AppError::ValidationError(format!("no rate for {}", req.currency)));
        }
        converter.select(req.currency);
    }
    Ok(get_currency(State(state)).await)
}

/// GET /api/currency/format?amount=
async fn format_amount(
    State(state): State<AppState>,
    Query(query): Query<FormatQuery>,
) -> Json<FormatResponse> {
    let converter = state.converter.read().await;
    let formatted = match query.currency {
        Some(currency) => converter.format(query.amount, currency),
        None => converter.format_price(query.amount),
    };
    Json(FormatResponse { formatted })
}
