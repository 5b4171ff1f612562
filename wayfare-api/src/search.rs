use axum::{
    extract::{Path, RawQuery, State},
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use wayfare_catalog::{PageRequest, SearchPage};
use wayfare_core::{Country, CurrencyCode, QueryParams};
use wayfare_filters::{FlightCriteria, HotelCriteria};
use wayfare_shared::{FlightResult, HotelResult};

use crate::locale::ValidLocale;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/{locale}/hotels/search", get(search_hotels))
        .route("/{locale}/flights/search", get(search_flights))
        .route("/{locale}/destinations/{country}", get(destination))
}

/// A result with its price rendered in the selected display currency.
#[derive(Debug, Serialize)]
pub struct Priced<T> {
    #[serde(flatten)]
    pub result: T,
    pub display_price: String,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse<C, T> {
    pub criteria: C,
    pub currency: CurrencyCode,
    #[serde(flatten)]
    pub page: SearchPage<Priced<T>>,
}

#[derive(Debug, Serialize)]
pub struct DestinationResponse {
    pub country: Country,
    pub currency: CurrencyCode,
    #[serde(flatten)]
    pub page: SearchPage<Priced<HotelResult>>,
}

fn page_request(params: &QueryParams) -> PageRequest {
    PageRequest {
        page: params.get("page").and_then(|v| v.parse().ok()),
        limit: params.get("limit").and_then(|v| v.parse().ok()),
    }
}

/// GET /{locale}/hotels/search
async fn search_hotels(
    ValidLocale(_locale): ValidLocale,
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> Json<SearchResponse<HotelCriteria, HotelResult>> {
    let params = QueryParams::parse(query.as_deref().unwrap_or_default());
    let criteria = HotelCriteria::from_query(&params);
    let page = state.search.search_hotels(&criteria, page_request(&params)).await;

    let converter = state.converter.read().await;
    let page = page.map(|hotel| Priced {
        display_price: converter.format_price(hotel.price_per_night),
        result: hotel,
    });

    Json(SearchResponse {
        criteria,
        currency: converter.selected(),
        page,
    })
}

/// GET /{locale}/flights/search
async fn search_flights(
    ValidLocale(_locale): ValidLocale,
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> Json<SearchResponse<FlightCriteria, FlightResult>> {
    let params = QueryParams::parse(query.as_deref().unwrap_or_default());
    let criteria = FlightCriteria::from_query(&params);
    let page = state.search.search_flights(&criteria, page_request(&params)).await;

    let converter = state.converter.read().await;
    let page = page.map(|flight| Priced {
        display_price: converter.format_price(flight.price),
        result: flight,
    });

    Json(SearchResponse {
        criteria,
        currency: converter.selected(),
        page,
    })
}

/// GET /{locale}/destinations/{country}
/// Unknown countries go back to the hotel search page.
async fn destination(
    ValidLocale(locale): ValidLocale,
    State(state): State<AppState>,
    Path((_, country)): Path<(String, String)>,
    RawQuery(query): RawQuery,
) -> Response {
    let Ok(country) = country.parse::<Country>() else {
        tracing::debug!(%country, "Unknown destination");
        return Redirect::temporary(&format!("/{}/hotels/search", locale)).into_response();
    };

    let params = QueryParams::parse(query.as_deref().unwrap_or_default());
    let criteria = HotelCriteria {
        location: country.code().to_string(),
        ..HotelCriteria::default()
    };
    let page = state.search.search_hotels(&criteria, page_request(&params)).await;

    let converter = state.converter.read().await;
    let page = page.map(|hotel| Priced {
        display_price: converter.format_price(hotel.price_per_night),
        result: hotel,
    });

    Json(DestinationResponse {
        country,
        currency: converter.selected(),
        page,
    })
    .into_response()
}
