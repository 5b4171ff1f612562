use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;
use wayfare_api::{app, AppState};
use wayfare_catalog::{Dataset, Latency, MockSearchService};
use wayfare_checkout::Money;
use wayfare_core::CurrencyCode;
use wayfare_shared::{FlightResult, SelectedResult};
use wayfare_store::app_config::Config;
use wayfare_store::{ClientStorage, MemoryStorage};

fn test_state(storage: Arc<dyn ClientStorage>) -> AppState {
    let config = Config::builtin().expect("builtin config");
    let search = MockSearchService::new(Dataset::builtin().expect("builtin dataset"), Latency::None);
    AppState::new(&config, storage, Arc::new(search))
}

fn test_app() -> Router {
    app(test_state(Arc::new(MemoryStorage::new())))
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("request build should succeed");

    let resp = app.clone().oneshot(request).await.expect("app should handle request");
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), 1024 * 1024)
        .await
        .expect("response body should be readable");
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("response body should be JSON")
    };
    (status, value)
}

async fn redirect_target(app: &Router, uri: &str) -> (StatusCode, String) {
    let resp = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).expect("request"))
        .await
        .expect("app should handle request");
    let location = resp
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    (resp.status(), location)
}

fn first_flight() -> FlightResult {
    Dataset::builtin().unwrap().flights.remove(0)
}

#[tokio::test]
async fn test_health() {
    let app = test_app();
    let (status, body) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_unsupported_locale_redirects() {
    let app = test_app();
    let (status, location) = redirect_target(&app, "/xx/hotels/search?location=Paris").await;
    assert_eq!(status, StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location, "/en/hotels/search?location=Paris");
}

#[tokio::test]
async fn test_locale_less_path_redirects() {
    let app = test_app();
    let (status, location) = redirect_target(&app, "/flights/search?from=NRT").await;
    assert_eq!(status, StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location, "/en/flights/search?from=NRT");

    let (_, location) = redirect_target(&app, "/").await;
    assert_eq!(location, "/en");

    let (status, _) = send(&app, "GET", "/api/nope", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_hotel_search_sorted_and_priced() {
    let app = test_app();
    let (status, body) = send(&app, "GET", "/ja/hotels/search?location=paris&sort=price-asc", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["criteria"]["sort"], "price-asc");
    assert_eq!(body["currency"], "USD");

    let results = body["results"].as_array().unwrap();
    assert_eq!(results.len(), 3);
    let prices: Vec<f64> = results
        .iter()
        .map(|r| r["price_per_night"].as_f64().unwrap())
        .collect();
    assert!(prices.windows(2).all(|w| w[0] <= w[1]));
    assert!(results
        .iter()
        .all(|r| r["display_price"].as_str().unwrap().starts_with('$')));
}

#[tokio::test]
async fn test_flight_search_pagination() {
    let app = test_app();
    let (status, body) = send(&app, "GET", "/en/flights/search?from=TYO&to=PAR&limit=2", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["limit"], 2);
    assert_eq!(body["results"].as_array().unwrap().len(), 2);
    assert!(body["total"].as_u64().unwrap() >= 2);
}

#[tokio::test]
async fn test_flight_search_airline_allow_list_and_max_price() {
    let app = test_app();
    let (status, body) = send(
        &app,
        "GET",
        "/en/flights/search?from=NRT&to=CDG&airlines=JL,LH&maxPrice=198000",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let mut ids: Vec<&str> = body["results"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["id"].as_str().unwrap())
        .collect();
    ids.sort();
    assert_eq!(ids, vec!["FL-001", "FL-003"]);
}

#[tokio::test]
async fn test_destination_pages() {
    let app = test_app();
    let (status, body) = send(&app, "GET", "/en/destinations/jp", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["country"], "JP");
    let results = body["results"].as_array().unwrap();
    assert!(!results.is_empty());
    assert!(results.iter().all(|r| r["country"] == "JP"));

    let (status, location) = redirect_target(&app, "/fr/destinations/atlantis").await;
    assert_eq!(status, StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location, "/fr/hotels/search");
}

#[tokio::test]
async fn test_filter_update_and_reset_all() {
    let app = test_app();
    let (status, body) = send(
        &app,
        "POST",
        "/en/hotels/filters",
        Some(json!({
            "query": "location=Paris&guests=3",
            "action": "update",
            "key": "sort",
            "value": "price-asc"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["href"],
        "/en/hotels/search?location=Paris&guests=3&sort=price-asc&tab=hotels"
    );
    assert_eq!(body["criteria"]["guests"], 3);

    let (_, body) = send(
        &app,
        "POST",
        "/en/flights/filters",
        Some(json!({
            "query": "from=NRT&to=CDG&depart=2025-05-01&tab=flights&maxStops=0&airlines=JL,AF",
            "action": "reset_all"
        })),
    )
    .await;
    assert_eq!(
        body["href"],
        "/en/flights/search?from=NRT&to=CDG&depart=2025-05-01&tab=flights&adults=1"
    );

    let (status, _) = send(
        &app,
        "POST",
        "/en/hotels/filters",
        Some(json!({ "query": "", "action": "update" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_selection_to_checkout_flow() {
    let storage: Arc<dyn ClientStorage> = Arc::new(MemoryStorage::new());
    let app = app(test_state(storage.clone()));
    let flight = first_flight();

    let (status, body) = send(
        &app,
        "POST",
        "/api/selections",
        Some(json!({
            "result": SelectedResult::Flight(flight.clone()),
            "criteria": { "domain": "flights", "criteria": wayfare_filters::FlightCriteria::default() }
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["draft_created"], true);
    let id = body["id"].as_str().unwrap().to_string();

    let (status, selection) = send(&app, "GET", &format!("/api/selections/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(selection["result"]["result"]["id"], flight.id.as_str());

    // Already started by the selection; the body is optional
    let (status, draft) = send(&app, "POST", &format!("/api/drafts/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(draft["pricing"]["base_fare"]["amount"].as_f64(), Some(flight.price));
    assert_eq!(draft["pricing"]["base_fare"]["currency"], "JPY");

    let (status, _) = send(
        &app,
        "PUT",
        &format!("/api/drafts/{}/ticket-type", id),
        Some(json!({ "ticket_type": "flexible" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, draft) = send(
        &app,
        "PUT",
        &format!("/api/drafts/{}/extras/bag-23kg", id),
        Some(json!({ "quantity": 2, "unit_price": 6000.0 })),
    )
    .await;
    assert_eq!(draft["extras"]["bag-23kg"], 2);
    assert_eq!(draft["pricing"]["extras_total"]["amount"].as_f64(), Some(12000.0));

    let (_, breakdown) = send(&app, "GET", &format!("/api/drafts/{}/breakdown", id), None).await;
    assert_eq!(breakdown["currency"], "USD");
    let base = breakdown["base_fare"].as_f64().unwrap();
    assert!((base - flight.price / 150.0 * 1.13).abs() < 1e-6);
    assert!((breakdown["extras"].as_f64().unwrap() - 80.0).abs() < 1e-9);
    assert!((breakdown["total"].as_f64().unwrap() - (base + 80.0)).abs() < 1e-6);
    assert!(breakdown["formatted_total"].as_str().unwrap().starts_with('$'));

    // Every mutation is written through
    let raw = storage.get_raw("wayfare-checkout-drafts").unwrap().unwrap();
    assert!(raw.contains("bag-23kg"));

    let (status, _) = send(&app, "POST", &format!("/api/drafts/{}/complete", id), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, "GET", &format!("/api/drafts/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, "GET", &format!("/api/selections/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_drafts_survive_restart() {
    let storage: Arc<dyn ClientStorage> = Arc::new(MemoryStorage::new());
    let id = uuid::Uuid::new_v4();
    {
        let app = app(test_state(storage.clone()));
        let (status, _) = send(
            &app,
            "POST",
            &format!("/api/drafts/{}", id),
            Some(json!({ "base_fare": { "amount": 15000.0, "currency": "JPY" } })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let app = app(test_state(storage));
    let (status, draft) = send(&app, "GET", &format!("/api/drafts/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(draft["pricing"]["base_fare"]["amount"].as_f64(), Some(15000.0));

    let (status, _) = send(&app, "DELETE", &format!("/api/drafts/{}", id), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, "DELETE", &format!("/api/drafts/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_missing_draft() {
    let app = test_app();
    let id = uuid::Uuid::new_v4();

    let (status, breakdown) = send(&app, "GET", &format!("/api/drafts/{}/breakdown", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(breakdown["total"].as_f64(), Some(0.0));

    let (status, _) = send(
        &app,
        "PUT",
        &format!("/api/drafts/{}/ticket-type", id),
        Some(json!({ "ticket_type": "flexible" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // No selection to take the fare from
    let (status, _) = send(&app, "POST", &format!("/api/drafts/{}", id), Some(json!({}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, "POST", &format!("/api/drafts/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_corrupt_stored_drafts_start_empty() {
    let storage: Arc<dyn ClientStorage> = Arc::new(MemoryStorage::new());
    storage.set_raw("wayfare-checkout-drafts", "{oops").unwrap();

    let state = test_state(storage.clone());
    assert!(state.drafts.read().await.is_empty());

    let app = app(state);
    let id = uuid::Uuid::new_v4();
    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/drafts/{}", id),
        Some(json!({ "base_fare": { "amount": 15000.0, "currency": "JPY" } })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    // The next write replaces the unreadable value
    let restored = test_state(storage);
    assert!(restored.drafts.read().await.get(&id).is_some());
}

#[tokio::test]
async fn test_stale_draft_snapshot_is_not_written() {
    let storage: Arc<dyn ClientStorage> = Arc::new(MemoryStorage::new());
    let state = test_state(storage.clone());
    let id = uuid::Uuid::new_v4();

    let (older, newer) = {
        let mut drafts = state.drafts.write().await;
        let older = state.draft_snapshot(&drafts);
        drafts.init_draft(id, Money::new(15000.0, CurrencyCode::JPY));
        (older, state.draft_snapshot(&drafts))
    };
    state.persist_drafts(newer).await;
    state.persist_drafts(older).await;

    let restored = test_state(storage);
    assert!(restored.drafts.read().await.get(&id).is_some());
}

#[tokio::test]
async fn test_currency_selection_and_format() {
    let app = test_app();
    let (status, body) = send(
        &app,
        "PUT",
        "/api/currency/selected",
        Some(json!({ "currency": "JPY" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["selected"], "JPY");

    let (_, body) = send(&app, "GET", "/api/currency/format?amount=15500", None).await;
    assert_eq!(body["formatted"], "￥15,500");

    let (status, _) = send(
        &app,
        "PUT",
        "/api/currency/selected",
        Some(json!({ "currency": "XYZ" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_replace_rates() {
    let app = test_app();
    let (status, body) = send(
        &app,
        "PUT",
        "/api/currency/rates",
        Some(json!({ "USD": 1.0, "JPY": 100.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["rates"].as_object().unwrap().len(), 2);

    let (_, body) = send(&app, "GET", "/api/currency/format?amount=150", None).await;
    assert_eq!(body["formatted"], "$1.50");

    let (status, _) = send(&app, "PUT", "/api/currency/rates", Some(json!({ "JPY": -1.0 }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_preferences_round_trip() {
    let storage: Arc<dyn ClientStorage> = Arc::new(MemoryStorage::new());
    let app = app(test_state(storage.clone()));

    let (_, body) = send(&app, "GET", "/api/preferences", None).await;
    assert_eq!(body["view_mode"], "list");

    let (status, body) = send(
        &app,
        "PUT",
        "/api/preferences",
        Some(json!({ "view_mode": "grid", "flight_sort": "cheapest" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["view_mode"], "grid");
    assert_eq!(body["hotel_sort"], "recommended");

    let app = wayfare_api::app(test_state(storage));
    let (_, body) = send(&app, "GET", "/api/preferences", None).await;
    assert_eq!(body["flight_sort"], "cheapest");
}
