mod common;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;
use umkm_cart::web::{router, USER_HEADER};

async fn app() -> Router { router(common::service().await) }

async fn call(app: &Router, method: &str, uri: &str, user: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
    let mut req = Request::builder().method(method).uri(uri);
    if let Some(user) = user { req = req.header(USER_HEADER, user); }
    let req = match body {
        Some(body) => req.header("content-type", "application/json").body(Body::from(body.to_string())).unwrap(),
        None => req.body(Body::empty()).unwrap(),
    };
    let res = app.clone().oneshot(req).await.unwrap();
    let status = res.status();
    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
    (status, value)
}

#[tokio::test]
async fn health() {
    let app = app().await;
    let (status, body) = call(&app, "GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn add_select_checkout_over_http() {
    let app = app().await;
    let user = Some("buyer-1");
    let (status, item) = call(&app, "POST", "/api/v1/cart/items", user, Some(json!({"product_id": "A"}))).await;
    assert_eq!(status, StatusCode::CREATED);
    let id = item["id"].as_i64().unwrap();

    let (_, msg) = call(&app, "GET", "/api/v1/cart/message", user, None).await;
    assert_eq!(msg["message"], "Added Produk A to cart");
    let (_, msg) = call(&app, "GET", "/api/v1/cart/message", user, None).await;
    assert!(msg["message"].is_null());

    let (status, cart) = call(&app, "POST", &format!("/api/v1/cart/items/{id}/toggle"), user, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cart["summary"]["selected_total"], "10000");

    let (status, res) = call(&app, "POST", "/api/v1/checkout", user, Some(json!({"payment_method": "Transfer Bank Mandiri"}))).await;
    assert_eq!(status, StatusCode::CREATED);
    let order_id = res["order_id"].as_str().unwrap().to_string();
    assert!(res["payment_instructions"].as_str().unwrap().contains("Mandiri"));

    let (status, order) = call(&app, "GET", &format!("/api/v1/orders/{order_id}"), user, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(order["total"], "10000");
    assert_eq!(order["payment_method"], "Transfer Bank Mandiri");

    let (status, _) = call(&app, "GET", &format!("/api/v1/orders/{order_id}"), Some("someone-else"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, cart) = call(&app, "GET", "/api/v1/cart", user, None).await;
    assert_eq!(cart["items"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn checkout_errors_map_to_statuses() {
    let app = app().await;
    let (status, _) = call(&app, "POST", "/api/v1/checkout", None, Some(json!({"payment_method": "COD"}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = call(&app, "POST", "/api/v1/checkout", None, Some(json!({"payment_method": ""}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = call(&app, "POST", "/api/v1/cart/items", None, Some(json!({"product_id": "missing"}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn quantity_zero_removes_line() {
    let app = app().await;
    let (_, item) = call(&app, "POST", "/api/v1/cart/items", None, Some(json!({"product_id": "B"}))).await;
    let id = item["id"].as_i64().unwrap();
    let (status, cart) = call(&app, "PUT", &format!("/api/v1/cart/items/{id}/quantity"), None, Some(json!({"quantity": 0}))).await;
    assert_eq!(status, StatusCode::OK);
    assert!(cart["items"].as_array().unwrap().is_empty());
    assert_eq!(cart["summary"]["all_selected"], false);
}

#[tokio::test]
async fn payment_methods_are_listed() {
    let app = app().await;
    let (_, methods) = call(&app, "GET", "/api/v1/payment-methods", None, None).await;
    assert_eq!(methods.as_array().unwrap().len(), 8);
    assert_eq!(methods[7]["code"], "COD");
}
