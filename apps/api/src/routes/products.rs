//! Product catalog routes.
//!
//! Reads are public; writes require a catalog manager (ADMIN or
//! EMPLOYEE). Every write that can lower stock finishes by scheduling
//! a low-stock scan, which keeps alerting an explicit call in the
//! write path rather than a storage hook.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use tracing::info;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::notifier::NotificationJob;
use crate::state::AppState;
use bazaar_core::{validation, Product};
use bazaar_db::repository::product::ProductInput;

#[derive(Debug, Deserialize)]
pub struct ProductRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price_cents: i64,
    pub quantity: i64,
}

impl ProductRequest {
    fn validate(&self) -> Result<ProductInput, ApiError> {
        validation::validate_product_name(&self.name)?;
        validation::validate_price_cents(self.price_cents)?;
        validation::validate_stock_quantity(self.quantity)?;

        Ok(ProductInput {
            name: self.name.trim().to_string(),
            description: self.description.trim().to_string(),
            price_cents: self.price_cents,
            quantity: self.quantity,
        })
    }
}

/// GET /products
pub async fn list(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Product>>, ApiError> {
    let products = state.db.products().list().await?;
    Ok(Json(products))
}

/// GET /products/{id}
pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Product>, ApiError> {
    let product = state
        .db
        .products()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Product not found"))?;

    Ok(Json(product))
}

/// POST /products
pub async fn create(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(req): Json<ProductRequest>,
) -> Result<(StatusCode, Json<Product>), ApiError> {
    user.require_catalog_manager()?;
    let input = req.validate()?;

    let product = state.db.products().insert(input).await?;
    info!(product_id = %product.id, by = %user.id, "Product created");

    if product.is_low_stock() {
        state.notifier.enqueue(NotificationJob::LowStockScan);
    }

    Ok((StatusCode::CREATED, Json(product)))
}

/// PUT /products/{id}
pub async fn update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    user: AuthUser,
    Json(req): Json<ProductRequest>,
) -> Result<Json<Product>, ApiError> {
    user.require_catalog_manager()?;
    let input = req.validate()?;

    let product = state.db.products().update(&id, input).await?;
    info!(product_id = %product.id, by = %user.id, "Product updated");

    if product.is_low_stock() {
        state.notifier.enqueue(NotificationJob::LowStockScan);
    }

    Ok(Json(product))
}

/// DELETE /products/{id}
pub async fn remove(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    user: AuthUser,
) -> Result<StatusCode, ApiError> {
    user.require_catalog_manager()?;

    state.db.products().delete(&id).await?;
    info!(product_id = %id, by = %user.id, "Product deleted");

    Ok(StatusCode::NO_CONTENT)
}
