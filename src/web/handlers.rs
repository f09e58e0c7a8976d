use axum::{extract::{Path, State}, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;
use crate::domain::aggregates::{Cart, CartItem, Order};
use crate::domain::value_objects::PaymentMethod;
use super::{ApiError, AppState, CurrentUser};

#[derive(Debug, Deserialize, Validate)]
pub struct AddToCartRequest {
    #[validate(length(min = 1, max = 128))]
    pub product_id: String,
}

#[derive(Debug, Deserialize)] pub struct QuantityRequest { pub quantity: i64 }
#[derive(Debug, Deserialize)] pub struct SelectionRequest { pub selected: bool }

#[derive(Debug, Deserialize, Validate)]
pub struct CheckoutRequest {
    #[validate(length(min = 1, max = 64))]
    pub payment_method: String,
}

#[derive(Debug, Serialize)] pub struct CheckoutResponse { pub order_id: Uuid, pub payment_instructions: &'static str }
#[derive(Debug, Serialize)] pub struct MessageResponse { pub message: Option<String> }
#[derive(Debug, Serialize)] pub struct PaymentMethodView { pub code: &'static str, pub label: &'static str, pub instructions: &'static str }

pub async fn get_cart(State(s): State<AppState>, CurrentUser(user): CurrentUser) -> Result<Json<Cart>, ApiError> {
    Ok(Json(s.cart(&user).await?))
}

pub async fn add_to_cart(State(s): State<AppState>, CurrentUser(user): CurrentUser, Json(r): Json<AddToCartRequest>) -> Result<(StatusCode, Json<CartItem>), ApiError> {
    r.validate()?;
    let item = s.add_to_cart(&user, &r.product_id).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

pub async fn clear_cart(State(s): State<AppState>, CurrentUser(user): CurrentUser) -> Result<StatusCode, ApiError> {
    s.clear_cart(&user).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn remove_item(State(s): State<AppState>, CurrentUser(user): CurrentUser, Path(id): Path<i64>) -> Result<StatusCode, ApiError> {
    s.remove_item(&user, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn set_quantity(State(s): State<AppState>, CurrentUser(user): CurrentUser, Path(id): Path<i64>, Json(r): Json<QuantityRequest>) -> Result<Json<Cart>, ApiError> {
    s.set_quantity(&user, id, r.quantity).await?;
    Ok(Json(s.cart(&user).await?))
}

pub async fn toggle_item(State(s): State<AppState>, CurrentUser(user): CurrentUser, Path(id): Path<i64>) -> Result<Json<Cart>, ApiError> {
    s.toggle_selection(&user, id).await?;
    Ok(Json(s.cart(&user).await?))
}

pub async fn select_all(State(s): State<AppState>, CurrentUser(user): CurrentUser, Json(r): Json<SelectionRequest>) -> Result<Json<Cart>, ApiError> {
    s.toggle_select_all(&user, r.selected).await?;
    Ok(Json(s.cart(&user).await?))
}

pub async fn take_message(State(s): State<AppState>, CurrentUser(user): CurrentUser) -> Json<MessageResponse> {
    Json(MessageResponse { message: s.take_message(&user) })
}

pub async fn payment_methods() -> Json<Vec<PaymentMethodView>> {
    Json(PaymentMethod::ALL.iter().map(|m| PaymentMethodView { code: m.code(), label: m.label(), instructions: m.instructions() }).collect())
}

pub async fn checkout(State(s): State<AppState>, CurrentUser(user): CurrentUser, Json(r): Json<CheckoutRequest>) -> Result<(StatusCode, Json<CheckoutResponse>), ApiError> {
    r.validate()?;
    let method = PaymentMethod::parse(&r.payment_method).map_err(crate::CartError::from)?;
    let order = s.checkout_with(&user, method).await?;
    Ok((StatusCode::CREATED, Json(CheckoutResponse { order_id: order.id(), payment_instructions: method.instructions() })))
}

pub async fn list_orders(State(s): State<AppState>, CurrentUser(user): CurrentUser) -> Result<Json<Vec<Order>>, ApiError> {
    Ok(Json(s.order_history(&user).await?))
}

pub async fn get_order(State(s): State<AppState>, CurrentUser(user): CurrentUser, Path(id): Path<Uuid>) -> Result<Json<Order>, ApiError> {
    s.order(&user, id).await?.map(Json).ok_or(ApiError::NotFound)
}

pub async fn delete_order(State(s): State<AppState>, CurrentUser(user): CurrentUser, Path(id): Path<Uuid>) -> Result<StatusCode, ApiError> {
    s.delete_order(&user, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
