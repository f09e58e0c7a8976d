//! HTTP/JSON surface over `CartService` for thin clients.

mod handlers;

use std::sync::Arc;
use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Json, Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use crate::domain::value_objects::UserId;
use crate::service::CartService;
use crate::CartError;

pub type AppState = Arc<CartService>;

/// Header carrying the signed-in uid; requests without it act as the guest.
pub const USER_HEADER: &str = "x-user-id";

pub fn router(service: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { Json(serde_json::json!({"status": "healthy", "service": "umkm-cart"})) }))
        .route("/api/v1/cart", get(handlers::get_cart).delete(handlers::clear_cart))
        .route("/api/v1/cart/items", post(handlers::add_to_cart))
        .route("/api/v1/cart/items/:id", delete(handlers::remove_item))
        .route("/api/v1/cart/items/:id/quantity", put(handlers::set_quantity))
        .route("/api/v1/cart/items/:id/toggle", post(handlers::toggle_item))
        .route("/api/v1/cart/selection", put(handlers::select_all))
        .route("/api/v1/cart/message", get(handlers::take_message))
        .route("/api/v1/payment-methods", get(handlers::payment_methods))
        .route("/api/v1/checkout", post(handlers::checkout))
        .route("/api/v1/orders", get(handlers::list_orders))
        .route("/api/v1/orders/:id", get(handlers::get_order).delete(handlers::delete_order))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(service)
}

/// Identity provider for HTTP callers.
pub struct CurrentUser(pub UserId);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for CurrentUser {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let uid = parts.headers.get(USER_HEADER).and_then(|v| v.to_str().ok());
        Ok(CurrentUser(UserId::from_session(uid)))
    }
}

#[derive(Debug)]
pub enum ApiError {
    Cart(CartError),
    Invalid(validator::ValidationErrors),
    NotFound,
}

impl From<CartError> for ApiError {
    fn from(err: CartError) -> Self { ApiError::Cart(err) }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(err: validator::ValidationErrors) -> Self { ApiError::Invalid(err) }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Invalid(e) => (StatusCode::UNPROCESSABLE_ENTITY, e.to_string()),
            ApiError::NotFound => (StatusCode::NOT_FOUND, "Not found".to_string()),
            ApiError::Cart(e) => match e {
                CartError::NothingSelected | CartError::UnknownPaymentMethod(_) => (StatusCode::UNPROCESSABLE_ENTITY, e.to_string()),
                CartError::CheckoutInProgress | CartError::DuplicateOrder(_) => (StatusCode::CONFLICT, e.to_string()),
                CartError::ProductNotFound(_) => (StatusCode::NOT_FOUND, e.to_string()),
                CartError::Catalog(_) => {
                    tracing::error!(error = %e, "catalog lookup failed");
                    (StatusCode::BAD_GATEWAY, "Catalog unavailable".to_string())
                }
                other => {
                    tracing::error!(error = %other, "request failed");
                    (StatusCode::INTERNAL_SERVER_ERROR, "Internal error".to_string())
                }
            },
        };
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}
