use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{self, Request, StatusCode};
use serde_json::{Value, json};
use tower::ServiceExt;

use pantry_server::api::{AppState, router};
use pantry_server::auth::AuthProvider;
use pantry_server::auth::jwt::JwtManager;
use pantry_service::PantryServiceBuilder;
use pantry_store_memory::{MemoryItemStore, MemoryUserStore};

// -- Helpers --------------------------------------------------------------

fn build_app(enforce: bool) -> Router {
    let service = PantryServiceBuilder::new()
        .items(Arc::new(MemoryItemStore::new()))
        .build()
        .unwrap();
    let auth = AuthProvider::new(
        JwtManager::new("test-secret", 3600),
        Arc::new(MemoryUserStore::new()),
        enforce,
    );
    router(AppState {
        service: Arc::new(service),
        auth: Arc::new(auth),
    })
}

async fn send(
    app: &Router,
    method: http::Method,
    uri: &str,
    body: Option<Value>,
    token: Option<&str>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(http::header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header(http::header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, http::Method::GET, uri, None, None).await
}

async fn add_item(app: &Router, name: &str, expiry: &str, user: &str) -> Value {
    let (status, body) = send(
        app,
        http::Method::POST,
        "/api/add-item",
        Some(json!({
            "name": name,
            "category": "Pantry",
            "expiryDate": expiry,
            "userId": user,
        })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["item"].clone()
}

async fn signup_and_signin(app: &Router, email: &str) -> (String, String) {
    let (status, body) = send(
        app,
        http::Method::POST,
        "/api/signup",
        Some(json!({"fullname": "Test User", "email": email, "password": "pw"})),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");

    let (status, body) = send(
        app,
        http::Method::POST,
        "/api/signin",
        Some(json!({"email": email, "password": "pw"})),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    (
        body["userId"].as_str().unwrap().to_owned(),
        body["token"].as_str().unwrap().to_owned(),
    )
}

const ALICE: &str = "67e55044-10b1-426f-9247-bb680e5fe0c8";

// -- Health ---------------------------------------------------------------

#[tokio::test]
async fn health_reports_ok_and_counters() {
    let app = build_app(false);
    add_item(&app, "Milk", "2024-01-10T00:00:00Z", ALICE).await;

    let (status, body) = get(&app, "/api/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["metrics"]["items_added"], 1);

    let (status, body) = get(&app, "/api/metrics").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["items_added"], 1);
}

#[tokio::test]
async fn openapi_document_is_served() {
    let app = build_app(false);
    let (status, body) = get(&app, "/api-doc/openapi.json").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/api/add-item"].is_object());
}

// -- Items ----------------------------------------------------------------

#[tokio::test]
async fn add_item_echoes_stored_item() {
    let app = build_app(false);
    let item = add_item(&app, "Milk", "2024-01-10T00:00:00Z", ALICE).await;
    assert_eq!(item["name"], "Milk");
    assert_eq!(item["addedBy"], ALICE);
    assert!(item["id"].is_string());
}

#[tokio::test]
async fn date_only_expiry_is_midnight_utc() {
    let app = build_app(false);
    let item = add_item(&app, "Milk", "2024-12-31", ALICE).await;
    assert_eq!(item["expiryDate"], "2024-12-31T00:00:00Z");

    let (status, body) = send(
        &app,
        http::Method::PUT,
        &format!("/api/edit-item/{}", item["id"].as_str().unwrap()),
        Some(json!({"expiryDate": "2025-01-15"})),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["item"]["expiryDate"], "2025-01-15T00:00:00Z");
}

#[tokio::test]
async fn add_item_without_expiry_is_rejected() {
    let app = build_app(false);
    let (status, body) = send(
        &app,
        http::Method::POST,
        "/api/add-item",
        Some(json!({"name": "Milk", "category": "Dairy", "userId": ALICE})),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("expiryDate"));

    let (status, _) = get(&app, &format!("/api/dashboard/{ALICE}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn malformed_body_is_json_bad_request() {
    let app = build_app(false);
    let request = Request::builder()
        .method(http::Method::POST)
        .uri("/api/add-item")
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn edit_item_paths() {
    let app = build_app(false);
    let item = add_item(&app, "Milk", "2024-01-10T00:00:00Z", ALICE).await;
    let id = item["id"].as_str().unwrap();

    let (status, _) = send(
        &app,
        http::Method::PUT,
        &format!("/api/edit-item/{id}"),
        Some(json!({})),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        http::Method::PUT,
        &format!("/api/edit-item/{id}"),
        Some(json!({"expiryDate": "2024-01-20T00:00:00Z"})),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["item"]["expiryDate"], "2024-01-20T00:00:00Z");
    assert_eq!(body["item"]["name"], "Milk");

    let (status, _) = send(
        &app,
        http::Method::PUT,
        "/api/edit-item/00000000-0000-0000-0000-000000000000",
        Some(json!({"name": "Bread"})),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(
        &app,
        http::Method::PUT,
        "/api/edit-item/not-an-id",
        Some(json!({"name": "Bread"})),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn delete_twice_is_not_found() {
    let app = build_app(false);
    let item = add_item(&app, "Milk", "2024-01-10T00:00:00Z", ALICE).await;
    let uri = format!("/api/delete-item/{}", item["id"].as_str().unwrap());

    let (status, body) = send(&app, http::Method::DELETE, &uri, None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["item"]["name"], "Milk");

    let (status, _) = send(&app, http::Method::DELETE, &uri, None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// -- Reports --------------------------------------------------------------

#[tokio::test]
async fn dashboard_maps_names_to_expiry() {
    let app = build_app(false);
    add_item(&app, "Milk", "2024-01-10T00:00:00Z", ALICE).await;
    add_item(&app, "Bread", "2024-01-12T00:00:00Z", ALICE).await;

    let (status, body) = get(&app, &format!("/api/dashboard/{ALICE}")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["message"].is_string());
    assert_eq!(body["items"]["Milk"], "2024-01-10T00:00:00Z");
    assert_eq!(body["items"]["Bread"], "2024-01-12T00:00:00Z");
}

#[tokio::test]
async fn dashboard_for_unknown_user_is_not_found() {
    let app = build_app(false);
    let (status, body) = get(
        &app,
        "/api/dashboard/00000000-0000-0000-0000-000000000001",
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "no items found for this user");
}

#[tokio::test]
async fn statistics_scenario() {
    let app = build_app(false);
    add_item(&app, "A", "2024-01-10T00:00:00Z", ALICE).await;
    add_item(&app, "B", "2024-01-20T00:00:00Z", ALICE).await;
    add_item(&app, "C", "2030-12-01T00:00:00Z", ALICE).await;

    let (status, body) = get(
        &app,
        &format!("/api/statistics/{ALICE}?now=2024-02-01T00:00:00Z"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pieChart"], json!({"expired": 2, "active": 1}));
    assert_eq!(
        body["lineChart"],
        json!([{"year": 2024, "month": 1, "expiredCount": 2}])
    );
    assert_eq!(
        body["barChart"],
        json!([{"itemName": "A", "count": 1}, {"itemName": "B", "count": 1}])
    );
}

#[tokio::test]
async fn statistics_accepts_date_only_reference() {
    let app = build_app(false);
    add_item(&app, "A", "2024-01-10", ALICE).await;
    add_item(&app, "B", "2024-02-01", ALICE).await;

    let (status, body) = get(&app, &format!("/api/statistics/{ALICE}?now=2024-02-01")).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    // Expiring exactly at the reference instant still counts as active.
    assert_eq!(body["pieChart"], json!({"expired": 1, "active": 1}));
}

#[tokio::test]
async fn statistics_for_unknown_user_is_zero() {
    let app = build_app(false);
    let (status, body) = get(
        &app,
        "/api/statistics/00000000-0000-0000-0000-000000000001",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pieChart"], json!({"expired": 0, "active": 0}));
    assert_eq!(body["lineChart"], json!([]));
    assert_eq!(body["barChart"], json!([]));
}

#[tokio::test]
async fn statistics_with_bad_timestamp_is_rejected() {
    let app = build_app(false);
    let (status, body) = get(&app, &format!("/api/statistics/{ALICE}?now=yesterday")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

// -- Users ----------------------------------------------------------------

#[tokio::test]
async fn signup_signin_and_edit_user() {
    let app = build_app(false);
    let (user_id, token) = signup_and_signin(&app, "ada@example.com").await;
    assert!(!token.is_empty());

    let (status, _) = send(
        &app,
        http::Method::POST,
        "/api/signup",
        Some(json!({"fullname": "Ada", "email": "ada@example.com", "password": "pw"})),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        http::Method::POST,
        "/api/signin",
        Some(json!({"email": "nobody@example.com", "password": "pw"})),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        http::Method::POST,
        "/api/signin",
        Some(json!({"email": "ada@example.com", "password": "nope"})),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        http::Method::PUT,
        &format!("/api/edit-user/{user_id}"),
        Some(json!({"fullname": "Ada Lovelace"})),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["fullname"], "Ada Lovelace");
    assert!(body["user"].get("passwordHash").is_none());
}

// -- Enforced auth --------------------------------------------------------

#[tokio::test]
async fn enforced_routes_require_token() {
    let app = build_app(true);
    let (status, body) = get(&app, &format!("/api/dashboard/{ALICE}")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].is_string());

    let (status, _) = send(
        &app,
        http::Method::GET,
        &format!("/api/dashboard/{ALICE}"),
        None,
        Some("garbage"),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = get(&app, "/api/health").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn enforced_callers_only_see_their_own_data() {
    let app = build_app(true);
    let (ada, ada_token) = signup_and_signin(&app, "ada@example.com").await;
    let (bob, bob_token) = signup_and_signin(&app, "bob@example.com").await;

    // Owner defaults to the caller.
    let (status, body) = send(
        &app,
        http::Method::POST,
        "/api/add-item",
        Some(json!({"name": "Milk", "category": "Dairy", "expiryDate": "2024-01-10T00:00:00Z"})),
        Some(&ada_token),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["item"]["addedBy"], ada.as_str());
    let item_id = body["item"]["id"].as_str().unwrap().to_owned();

    let (status, _) = send(
        &app,
        http::Method::POST,
        "/api/add-item",
        Some(json!({
            "name": "Milk",
            "category": "Dairy",
            "expiryDate": "2024-01-10T00:00:00Z",
            "userId": ada,
        })),
        Some(&bob_token),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        &app,
        http::Method::GET,
        &format!("/api/dashboard/{ada}"),
        None,
        Some(&bob_token),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        &app,
        http::Method::DELETE,
        &format!("/api/delete-item/{item_id}"),
        None,
        Some(&bob_token),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        &app,
        http::Method::PUT,
        &format!("/api/edit-user/{ada}"),
        Some(json!({"fullname": "Mallory"})),
        Some(&bob_token),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(
        &app,
        http::Method::GET,
        &format!("/api/dashboard/{ada}"),
        None,
        Some(&ada_token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["items"]["Milk"], "2024-01-10T00:00:00Z");

    let (status, body) = send(
        &app,
        http::Method::GET,
        &format!("/api/statistics/{bob}"),
        None,
        Some(&bob_token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pieChart"]["expired"], 0);
}
