use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use ride_dispatch::api::rest::router;
use ride_dispatch::auth::TokenIssuer;
use ride_dispatch::models::driver::GeoPoint;
use ride_dispatch::state::AppState;
use ride_dispatch::store::memory::MemoryStore;
use serde_json::{json, Value};
use tower::ServiceExt;

// Minimum bcrypt cost keeps registration fast in tests.
const TEST_BCRYPT_COST: u32 = 4;

fn setup() -> axum::Router {
    let store = Arc::new(MemoryStore::new());
    let auth = TokenIssuer::new("integration-test-secret", 3600);
    let state = AppState::new(
        store,
        auth,
        TEST_BCRYPT_COST,
        GeoPoint { lat: 0.0, lng: 0.0 },
    );
    router(Arc::new(state))
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

fn authed_request(method: &str, uri: &str, token: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("authorization", format!("Bearer {token}"));

    match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_string(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_string(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Registers a driver and returns (driver_id, token).
async fn register_driver(app: &axum::Router, name: &str, email: &str) -> (String, String) {
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/drivers/register",
            json!({
                "name": name,
                "email": email,
                "password": "hunter2hunter2"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    (
        body["driver"]["id"].as_str().unwrap().to_string(),
        body["token"].as_str().unwrap().to_string(),
    )
}

async fn create_booking(app: &axum::Router) -> String {
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/bookings",
            json!({
                "pickup": { "lat": 52.52, "lng": 13.405 },
                "dropoff": { "lat": 52.50, "lng": 13.42 }
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "Pending");
    body["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn health_returns_ok() {
    let app = setup();
    let response = app.oneshot(get_request("/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["drivers"], 0);
    assert_eq!(body["bookings"], 0);
}

#[tokio::test]
async fn metrics_returns_prometheus_format() {
    let app = setup();
    let response = app.oneshot(get_request("/metrics")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let content_type = response
        .headers()
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(content_type.contains("text/plain"));

    let body = body_string(response).await;
    assert!(body.contains("registered_drivers"));
}

#[tokio::test]
async fn register_returns_driver_and_token() {
    let app = setup();
    let response = app
        .oneshot(json_request(
            "POST",
            "/drivers/register",
            json!({
                "name": "Alice",
                "email": "alice@example.com",
                "password": "hunter2hunter2"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["driver"]["name"], "Alice");
    assert_eq!(body["driver"]["is_available"], true);
    assert_eq!(body["driver"]["status"], "Idle");
    assert!(body["driver"]["password_hash"].is_null());
    assert!(!body["token"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn register_rejects_duplicate_email() {
    let app = setup();
    register_driver(&app, "Alice", "alice@example.com").await;

    let response = app
        .oneshot(json_request(
            "POST",
            "/drivers/register",
            json!({
                "name": "Another Alice",
                "email": "alice@example.com",
                "password": "hunter2hunter2"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn register_rejects_short_password() {
    let app = setup();
    let response = app
        .oneshot(json_request(
            "POST",
            "/drivers/register",
            json!({
                "name": "Alice",
                "email": "alice@example.com",
                "password": "short"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn login_with_registered_credentials_succeeds() {
    let app = setup();
    register_driver(&app, "Alice", "alice@example.com").await;

    let response = app
        .oneshot(json_request(
            "POST",
            "/drivers/login",
            json!({
                "email": "alice@example.com",
                "password": "hunter2hunter2"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert!(!body["token"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn login_with_wrong_password_is_unauthorized() {
    let app = setup();
    register_driver(&app, "Alice", "alice@example.com").await;

    let response = app
        .oneshot(json_request(
            "POST",
            "/drivers/login",
            json!({
                "email": "alice@example.com",
                "password": "wrong password"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn location_update_requires_token() {
    let app = setup();
    let response = app
        .oneshot(json_request(
            "PATCH",
            "/drivers/location",
            json!({ "location": { "lat": 1.0, "lng": 2.0 } }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn location_update_changes_driver_location() {
    let app = setup();
    let (_, token) = register_driver(&app, "Alice", "alice@example.com").await;

    let response = app
        .oneshot(authed_request(
            "PATCH",
            "/drivers/location",
            &token,
            Some(json!({ "location": { "lat": 52.52, "lng": 13.405 } })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["location"]["lat"], 52.52);
    assert_eq!(body["location"]["lng"], 13.405);
}

#[tokio::test]
async fn location_update_rejects_out_of_range_coordinates() {
    let app = setup();
    let (_, token) = register_driver(&app, "Alice", "alice@example.com").await;

    let response = app
        .oneshot(authed_request(
            "PATCH",
            "/drivers/location",
            &token,
            Some(json!({ "location": { "lat": 95.0, "lng": 13.405 } })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn accept_assigns_booking_to_caller() {
    let app = setup();
    let (driver_id, token) = register_driver(&app, "Alice", "alice@example.com").await;
    let booking_id = create_booking(&app).await;

    let response = app
        .clone()
        .oneshot(authed_request(
            "POST",
            &format!("/bookings/{booking_id}/accept"),
            &token,
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["booking"]["status"], "Accepted");
    assert_eq!(body["booking"]["driver_id"], driver_id.as_str());
    assert_eq!(body["driver"]["is_available"], false);
    assert_eq!(body["driver"]["status"], "EnRoute");
}

#[tokio::test]
async fn accept_of_claimed_booking_conflicts_and_releases_loser() {
    let app = setup();
    let (winner_id, winner_token) = register_driver(&app, "Alice", "alice@example.com").await;
    let (_, loser_token) = register_driver(&app, "Bob", "bob@example.com").await;
    let booking_id = create_booking(&app).await;

    let response = app
        .clone()
        .oneshot(authed_request(
            "POST",
            &format!("/bookings/{booking_id}/accept"),
            &winner_token,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(authed_request(
            "POST",
            &format!("/bookings/{booking_id}/accept"),
            &loser_token,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // The booking still belongs to the winner.
    let response = app
        .clone()
        .oneshot(authed_request(
            "GET",
            &format!("/bookings/{booking_id}"),
            &loser_token,
            None,
        ))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["driver_id"], winner_id.as_str());

    // The loser was rolled back to idle/available.
    let response = app
        .oneshot(authed_request("GET", "/drivers/me", &loser_token, None))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["is_available"], true);
    assert_eq!(body["status"], "Idle");
}

#[tokio::test]
async fn accept_of_missing_booking_is_not_found_and_driver_recovers() {
    let app = setup();
    let (_, token) = register_driver(&app, "Alice", "alice@example.com").await;

    let response = app
        .clone()
        .oneshot(authed_request(
            "POST",
            "/bookings/00000000-0000-0000-0000-000000000000/accept",
            &token,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .oneshot(authed_request("GET", "/drivers/me", &token, None))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["is_available"], true);
    assert_eq!(body["status"], "Idle");
}

#[tokio::test]
async fn busy_driver_cannot_accept_a_second_booking() {
    let app = setup();
    let (_, token) = register_driver(&app, "Alice", "alice@example.com").await;
    let first = create_booking(&app).await;
    let second = create_booking(&app).await;

    let response = app
        .clone()
        .oneshot(authed_request(
            "POST",
            &format!("/bookings/{first}/accept"),
            &token,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(authed_request(
            "POST",
            &format!("/bookings/{second}/accept"),
            &token,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // The second booking is still claimable.
    let response = app
        .oneshot(authed_request("GET", "/bookings/pending", &token, None))
        .await
        .unwrap();
    let body = body_json(response).await;
    let pending: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["id"].as_str().unwrap())
        .collect();
    assert_eq!(pending, vec![second.as_str()]);
}

#[tokio::test]
async fn pending_list_requires_token() {
    let app = setup();
    let response = app
        .oneshot(get_request("/bookings/pending"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn pending_list_excludes_accepted_bookings() {
    let app = setup();
    let (_, token) = register_driver(&app, "Alice", "alice@example.com").await;
    let claimed = create_booking(&app).await;
    let open = create_booking(&app).await;

    let response = app
        .clone()
        .oneshot(authed_request(
            "POST",
            &format!("/bookings/{claimed}/accept"),
            &token,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(authed_request("GET", "/bookings/pending", &token, None))
        .await
        .unwrap();
    let body = body_json(response).await;
    let pending: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["id"].as_str().unwrap())
        .collect();
    assert_eq!(pending, vec![open.as_str()]);
}
