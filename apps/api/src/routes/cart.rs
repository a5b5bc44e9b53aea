//! Cart routes. CUSTOMER only.
//!
//! The cart never checks stock; a customer may cart more units than
//! exist. Availability is judged once, atomically, at checkout.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;
use bazaar_core::{validation, CartItem};
use bazaar_db::repository::cart::CartView;

/// GET /cart
pub async fn view(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<Json<CartView>, ApiError> {
    user.require_customer()?;

    let view = state.db.carts().get_view(&user.id).await?;
    Ok(Json(view))
}

#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub product_id: String,
    pub quantity: i64,
}

/// POST /cart/items
///
/// Adding a product already in the cart accumulates its quantity.
pub async fn add_item(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(req): Json<AddItemRequest>,
) -> Result<(StatusCode, Json<CartItem>), ApiError> {
    user.require_customer()?;
    validation::validate_cart_quantity(req.quantity)?;

    // 404 for a dangling product id; checkout treats the same case as
    // a plain rejected request.
    state
        .db
        .products()
        .get_by_id(&req.product_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Product not found"))?;

    let item = state
        .db
        .carts()
        .add_item(&user.id, &req.product_id, req.quantity)
        .await?;

    Ok((StatusCode::CREATED, Json(item)))
}

#[derive(Debug, Deserialize)]
pub struct UpdateItemRequest {
    pub product_id: String,
    pub quantity: i64,
}

/// PATCH /cart/items
///
/// Sets a line's quantity outright. Zero removes the line; the
/// response body is the updated line, or null when it was removed.
pub async fn update_item(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(req): Json<UpdateItemRequest>,
) -> Result<Json<Option<CartItem>>, ApiError> {
    user.require_customer()?;

    if req.quantity > 0 {
        validation::validate_cart_quantity(req.quantity)?;
    }

    let item = state
        .db
        .carts()
        .update_item(&user.id, &req.product_id, req.quantity)
        .await?;

    Ok(Json(item))
}

/// DELETE /cart/items/{product_id}
pub async fn remove_item(
    State(state): State<Arc<AppState>>,
    Path(product_id): Path<String>,
    user: AuthUser,
) -> Result<StatusCode, ApiError> {
    user.require_customer()?;

    state.db.carts().remove_item(&user.id, &product_id).await?;

    Ok(StatusCode::NO_CONTENT)
}
