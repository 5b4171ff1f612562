use axum::{routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use wayfare_core::QueryParams;
use wayfare_filters::{FilterDomain, FilterParamStore, FilterValue, FlightFilters, HotelFilters, RecordingNavigator};

use crate::error::AppError;
use crate::locale::ValidLocale;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/{locale}/hotels/filters", post(apply_filters::<HotelFilters>))
        .route("/{locale}/flights/filters", post(apply_filters::<FlightFilters>))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterAction {
    Update,
    Reset,
    ResetAll,
}

/// JSON shape of a filter value: text, list, number or `null` to clear.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum FilterInput {
    Text(String),
    List(Vec<String>),
    Number(f64),
}

impl From<FilterInput> for FilterValue {
    fn from(input: FilterInput) -> Self {
        match input {
            FilterInput::Text(text) => text.into(),
            FilterInput::List(items) => items.into(),
            FilterInput::Number(number) => number.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct FilterRequest {
    /// Current query string, with or without the leading `?`
    #[serde(default)]
    pub query: String,
    pub action: FilterAction,
    pub key: Option<String>,
    pub value: Option<FilterInput>,
}

#[derive(Debug, Serialize)]
pub struct FilterResponse<C> {
    /// Location that replaces the current history entry
    pub href: String,
    pub query: String,
    pub criteria: C,
}

/// POST /{locale}/{domain}/filters
/// Runs one filter mutation against the supplied query string.
async fn apply_filters<D>(
    ValidLocale(locale): ValidLocale,
    Json(req): Json<FilterRequest>,
) -> Result<Json<FilterResponse<D::Criteria>>, AppError>
where
    D: FilterDomain + Send + Sync + 'static,
    D::Criteria: Serialize,
{
    let path = format!("/{}/{}/search", locale, D::NAME);
    let params = QueryParams::try_parse(&req.query).map_err(|e| AppError::ValidationError(e.to_string()))?;
    let mut store: FilterParamStore<D, _> = FilterParamStore::new(path.clone(), params, RecordingNavigator::new(path));

    match req.action {
        FilterAction::Update => {
            let key = require_key(req.key)?;
            let value = req.value.map(FilterValue::from).unwrap_or(FilterValue::Clear);
            store.update_filter(&key, value);
        }
        FilterAction::Reset => {
            let key = require_key(req.key)?;
            store.reset_filter(&key);
        }
        FilterAction::ResetAll => store.reset_all_filters(),
    }

    Ok(Json(FilterResponse {
        href: store.href(),
        query: store.params().to_query_string(),
        criteria: store.criteria(),
    }))
}

fn require_key(key: Option<String>) -> Result<String, AppError> {
    key.filter(|k| !k.is_empty())
        .ok_or_else(|| AppError::ValidationError("key is required".to_string()))
}
