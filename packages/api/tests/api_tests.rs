// ABOUTME: End-to-end tests for the HTTP API through the full router
// ABOUTME: Exercises checkout, error mapping, status updates, history and linking over HTTP

use std::time::Duration;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use storefront_api::{create_router, ApiSettings, AppState};
use storefront_storage::open_in_memory;
use tower::ServiceExt;

async fn setup_with(settings: ApiSettings) -> (AppState, Router) {
    let pool = open_in_memory().await.unwrap();
    let state = AppState::new(pool, settings);
    let app = create_router(state.clone());
    (state, app)
}

async fn setup() -> (AppState, Router) {
    setup_with(ApiSettings::default()).await
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
    headers: &[(&str, &str)],
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_string(&body).unwrap()))
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

async fn seed_product(app: &Router, id: &str, price: f64, stock: i64) {
    let (status, _) = send(
        app,
        Method::POST,
        "/api/products",
        Some(json!({
            "id": id,
            "name": format!("Product {}", id),
            "sku": format!("SKU-{}", id),
            "price": price,
            "stock": stock
        })),
        &[],
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

fn checkout(email: &str, product_id: &str, quantity: i64, price: f64) -> Value {
    json!({
        "customerName": "Ada Lovelace",
        "customerEmail": email,
        "customerPhone": "+1 415 555 0100",
        "shippingAddress": "12 Analytical Row",
        "shippingCity": "London",
        "shippingState": "Greater London",
        "paymentMethod": "cash-on-delivery",
        "items": [{
            "productId": product_id,
            "quantity": quantity,
            "price": price,
            "total": price * quantity as f64
        }],
        "total": price * quantity as f64
    })
}

async fn stock_of(app: &Router, product_id: &str) -> i64 {
    let (_, json) = send(
        app,
        Method::GET,
        &format!("/api/products/{}", product_id),
        None,
        &[],
    )
    .await;
    json["data"]["stock"].as_i64().unwrap()
}

#[tokio::test]
async fn test_health_endpoint() {
    let (_, app) = setup().await;
    let (status, json) = send(&app, Method::GET, "/api/health", None, &[]).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["database"], "ok");
}

#[tokio::test]
async fn test_checkout_creates_order() {
    let (_, app) = setup().await;
    seed_product(&app, "P1", 10.0, 5).await;

    let (status, json) = send(
        &app,
        Method::POST,
        "/api/orders",
        Some(checkout("ada@example.com", "P1", 2, 10.0)),
        &[],
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    assert_eq!(json["total"].as_f64(), Some(20.0));
    assert_eq!(json["status"], "PENDING");
    assert_eq!(json["paymentStatus"], "PENDING");
    assert_eq!(json["duplicate"], false);
    assert!(json["orderNumber"].as_str().unwrap().starts_with("ORD_"));
    assert_eq!(stock_of(&app, "P1").await, 3);

    let order_id = json["orderId"].as_str().unwrap();
    let (status, order) = send(
        &app,
        Method::GET,
        &format!("/api/orders/{}", order_id),
        None,
        &[],
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(order["data"]["items"][0]["productId"], "P1");
    assert_eq!(order["data"]["items"][0]["quantity"], 2);
}

#[tokio::test]
async fn test_insufficient_stock_is_conflict() {
    let (_, app) = setup().await;
    seed_product(&app, "P1", 10.0, 5).await;

    let (status, json) = send(
        &app,
        Method::POST,
        "/api/orders",
        Some(checkout("ada@example.com", "P1", 10, 10.0)),
        &[],
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["success"], false);
    assert!(json["error"].as_str().unwrap().contains("Product P1"));
    assert_eq!(stock_of(&app, "P1").await, 5);

    let (_, list) = send(&app, Method::GET, "/api/orders", None, &[]).await;
    assert_eq!(list["data"]["pagination"]["totalItems"], 0);
}

#[tokio::test]
async fn test_validation_failure_lists_every_field() {
    let (_, app) = setup().await;
    seed_product(&app, "P1", 10.0, 5).await;

    let (status, json) = send(
        &app,
        Method::POST,
        "/api/orders",
        Some(json!({
            "customerEmail": "not-an-email",
            "paymentMethod": "cash-on-delivery",
            "items": [],
            "total": 0
        })),
        &[],
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["success"], false);
    let details: Vec<&str> = json["details"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d.as_str().unwrap())
        .collect();
    for field in [
        "customerName:",
        "customerEmail:",
        "customerPhone:",
        "shippingAddress:",
        "shippingCity:",
        "shippingState:",
        "items:",
    ] {
        assert!(
            details.iter().any(|d| d.starts_with(field)),
            "missing {} in {:?}",
            field,
            details
        );
    }
}

#[tokio::test]
async fn test_retry_with_same_order_token_is_deduplicated() {
    let (_, app) = setup().await;
    seed_product(&app, "P1", 10.0, 5).await;

    let mut body = checkout("ada@example.com", "P1", 1, 10.0);
    body["orderId"] = json!("5d1c9e7a-2b8f-4c55-9a61-0f3e8e2d4b10");

    let (_, first) = send(&app, Method::POST, "/api/orders", Some(body.clone()), &[]).await;
    let (status, second) = send(&app, Method::POST, "/api/orders", Some(body), &[]).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["orderNumber"], second["orderNumber"]);
    assert_eq!(second["duplicate"], true);
    assert_eq!(stock_of(&app, "P1").await, 4);
}

#[tokio::test]
async fn test_submission_timeout_then_safe_retry() {
    let (state, app) = setup_with(ApiSettings {
        submit_timeout: Duration::from_millis(200),
        ..ApiSettings::default()
    })
    .await;
    seed_product(&app, "P1", 10.0, 5).await;

    let mut body = checkout("ada@example.com", "P1", 1, 10.0);
    body["orderId"] = json!("attempt-1");

    // Hold the only connection so the submission cannot finish in time
    let held = state.pool.acquire().await.unwrap();
    let (status, json) = send(&app, Method::POST, "/api/orders", Some(body.clone()), &[]).await;
    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
    assert_eq!(json["success"], false);
    drop(held);

    let (status, json) = send(&app, Method::POST, "/api/orders", Some(body), &[]).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["duplicate"], false);
    assert_eq!(stock_of(&app, "P1").await, 4);
}

#[tokio::test]
async fn test_status_updates_over_http() {
    let (_, app) = setup().await;
    seed_product(&app, "P1", 10.0, 5).await;
    let (_, created) = send(
        &app,
        Method::POST,
        "/api/orders",
        Some(checkout("ada@example.com", "P1", 1, 10.0)),
        &[],
    )
    .await;
    let uri = format!("/api/orders/{}", created["orderId"].as_str().unwrap());

    let (status, json) = send(&app, Method::PUT, &uri, Some(json!({"status": "SHIPPED"})), &[]).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["status"], "SHIPPED");

    let (status, json) = send(&app, Method::PUT, &uri, Some(json!({"status": "delivered"})), &[]).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["status"], "DELIVERED");

    let (status, json) = send(&app, Method::PUT, &uri, Some(json!({"status": "CONFIRMED"})), &[]).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(
        json["error"],
        "Invalid status transition from DELIVERED to CONFIRMED"
    );

    let (status, _) = send(&app, Method::PUT, &uri, Some(json!({"status": "LOST"})), &[]).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        Method::PUT,
        "/api/orders/ord-missing",
        Some(json!({"status": "SHIPPED"})),
        &[],
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_payment_status_update() {
    let (_, app) = setup().await;
    seed_product(&app, "P1", 10.0, 5).await;
    let (_, created) = send(
        &app,
        Method::POST,
        "/api/orders",
        Some(checkout("ada@example.com", "P1", 1, 10.0)),
        &[],
    )
    .await;
    let order_id = created["orderId"].as_str().unwrap();

    let (status, json) = send(
        &app,
        Method::PUT,
        &format!("/api/orders/{}/payment", order_id),
        Some(json!({"paymentStatus": "PAID"})),
        &[],
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["paymentStatus"], "PAID");

    let (status, _) = send(
        &app,
        Method::PUT,
        &format!("/api/orders/{}/payment", order_id),
        Some(json!({"paymentStatus": "BOUNCED"})),
        &[],
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_list_orders_with_filters() {
    let (_, app) = setup().await;
    seed_product(&app, "P1", 10.0, 50).await;
    for email in ["ada@example.com", "ada@example.com", "bob@example.com"] {
        send(
            &app,
            Method::POST,
            "/api/orders",
            Some(checkout(email, "P1", 1, 10.0)),
            &[],
        )
        .await;
    }

    let (status, json) = send(
        &app,
        Method::GET,
        "/api/orders?email=ADA@example.com&page=1&limit=1",
        None,
        &[],
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["data"].as_array().unwrap().len(), 1);
    assert_eq!(json["data"]["pagination"]["totalItems"], 2);
    assert_eq!(json["data"]["pagination"]["hasNextPage"], true);

    let (_, json) = send(&app, Method::GET, "/api/orders?search=sku-p1&status=PENDING", None, &[]).await;
    assert_eq!(json["data"]["pagination"]["totalItems"], 3);

    let (status, _) = send(&app, Method::GET, "/api/orders?status=NOPE", None, &[]).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_history_and_linking_for_session() {
    let (_, app) = setup().await;
    seed_product(&app, "P1", 10.0, 10).await;

    // Guest checkout before the account exists
    send(
        &app,
        Method::POST,
        "/api/orders",
        Some(checkout("grace@example.com", "P1", 1, 10.0)),
        &[],
    )
    .await;

    let (status, _) = send(&app, Method::GET, "/api/orders/mine", None, &[]).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (_, guest_history) = send(
        &app,
        Method::GET,
        "/api/orders/mine",
        None,
        &[("x-user-email", "grace@example.com")],
    )
    .await;
    assert_eq!(guest_history["data"].as_array().unwrap().len(), 1);

    let (status, user) = send(
        &app,
        Method::POST,
        "/api/users",
        Some(json!({"email": "Grace@Example.com", "name": "Grace"})),
        &[],
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let user_id = user["data"]["id"].as_str().unwrap().to_string();
    let session = [("x-user-id", user_id.as_str()), ("x-user-email", "grace@example.com")];

    let (status, linked) = send(&app, Method::POST, "/api/orders/link", None, &session).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(linked["data"]["linked"], 1);

    let (_, again) = send(&app, Method::POST, "/api/orders/link", None, &session).await;
    assert_eq!(again["data"]["linked"], 0);

    let (_, history) = send(&app, Method::GET, "/api/orders/mine", None, &session).await;
    let orders = history["data"].as_array().unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0]["userId"], user_id.as_str());
}

#[tokio::test]
async fn test_product_endpoints() {
    let (_, app) = setup().await;
    seed_product(&app, "P1", 10.0, 5).await;

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/products",
        Some(json!({"id": "P2", "name": "Dup", "sku": "SKU-P1", "price": 1.0})),
        &[],
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, json) = send(
        &app,
        Method::PUT,
        "/api/products/P1",
        Some(json!({"isActive": false})),
        &[],
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["isActive"], false);

    let (_, active) = send(&app, Method::GET, "/api/products", None, &[]).await;
    assert_eq!(active["data"]["pagination"]["totalItems"], 0);
    let (_, all) = send(&app, Method::GET, "/api/products?includeInactive=true", None, &[]).await;
    assert_eq!(all["data"]["pagination"]["totalItems"], 1);

    let (status, _) = send(&app, Method::GET, "/api/products/missing", None, &[]).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_enormous_page_number_returns_empty_page() {
    let (_, app) = setup().await;
    seed_product(&app, "P1", 10.0, 5).await;
    send(
        &app,
        Method::POST,
        "/api/orders",
        Some(checkout("ada@example.com", "P1", 1, 10.0)),
        &[],
    )
    .await;

    for uri in [
        "/api/orders?page=9223372036854775807",
        "/api/orders?page=9223372036854775807&limit=100",
        "/api/products?page=9223372036854775807",
    ] {
        let (status, json) = send(&app, Method::GET, uri, None, &[]).await;
        assert_eq!(status, StatusCode::OK, "{}", uri);
        assert_eq!(json["success"], true);
        assert_eq!(json["data"]["data"].as_array().unwrap().len(), 0);
        assert_eq!(json["data"]["pagination"]["totalItems"], 1);
        assert_eq!(json["data"]["pagination"]["hasNextPage"], false);
    }
}

#[tokio::test]
async fn test_wrongly_typed_bodies_get_error_envelope() {
    let (_, app) = setup().await;
    seed_product(&app, "P1", 10.0, 5).await;

    let mut body = checkout("ada@example.com", "P1", 1, 10.0);
    body["items"][0]["quantity"] = json!(1.5);
    let (status, json) = send(&app, Method::POST, "/api/orders", Some(body), &[]).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["success"], false);
    assert_eq!(json["error"], "Invalid request body");
    assert!(json["details"][0].as_str().unwrap().contains("quantity"));
    assert_eq!(stock_of(&app, "P1").await, 5);

    let (_, created) = send(
        &app,
        Method::POST,
        "/api/orders",
        Some(checkout("ada@example.com", "P1", 1, 10.0)),
        &[],
    )
    .await;
    let order_id = created["orderId"].as_str().unwrap();

    for (uri, body) in [
        (format!("/api/orders/{}", order_id), json!({"status": 3})),
        (format!("/api/orders/{}/payment", order_id), json!({"paymentStatus": ["PAID"]})),
        (format!("/api/orders/{}/payment", order_id), json!({})),
    ] {
        let (status, json) = send(&app, Method::PUT, &uri, Some(body), &[]).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
        assert_eq!(json["success"], false);
        assert_eq!(json["details"].as_array().unwrap().len(), 1);
    }

    let (status, json) = send(
        &app,
        Method::POST,
        "/api/products",
        Some(json!({"name": "Lamp", "price": "cheap", "stock": 1})),
        &[],
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["success"], false);
}
