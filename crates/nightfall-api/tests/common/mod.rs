//! Shared test helpers for API integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use nightfall_core::clock::Clock;
use nightfall_core::roster::Player;
use nightfall_session::domain::aggregates::GameSession;
use nightfall_test_support::{FixedClock, StaticRoster, village_of};
use tower::ServiceExt;
use uuid::Uuid;

use nightfall_api::build_app;
use nightfall_api::state::AppState;

/// The village seated in every integration test.
pub fn seats() -> Vec<Player> {
    village_of(&[
        ("alice", "Voyante"),
        ("bob", "Loup-Garou"),
        ("carol", "Villageois"),
        ("dave", "Enfant sauvage"),
        ("erin", "Sorcière"),
    ])
}

/// Build application state around a fresh session with a fixed clock.
pub fn build_test_state() -> AppState {
    let clock: Arc<dyn Clock> = Arc::new(FixedClock::default());
    AppState::new(
        GameSession::new(Uuid::new_v4(), seats()),
        clock,
        Arc::new(StaticRoster::new(seats())),
    )
}

/// Build the full app router. Uses the same route structure as `main.rs`.
pub fn build_test_app(state: AppState) -> Router {
    build_app(state)
}

/// Send a POST request with a JSON body and return the response.
pub async fn post_json(
    app: Router,
    uri: &str,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}

/// Send a GET request and return the response.
pub async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}

/// Find a sub-phase by id in a `subPhases` array.
pub fn sub_phase<'a>(json: &'a serde_json::Value, id: &str) -> &'a serde_json::Value {
    json["subPhases"]
        .as_array()
        .unwrap()
        .iter()
        .find(|p| p["id"] == id)
        .unwrap()
}
