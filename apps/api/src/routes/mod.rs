//! HTTP route definitions.
//!
//! ## Route Map
//! ```text
//! POST   /auth/register              public
//! POST   /auth/login                 public
//! POST   /auth/refresh               public (refresh token in body)
//!
//! GET    /products                   public
//! GET    /products/{id}              public
//! POST   /products                   ADMIN | EMPLOYEE
//! PUT    /products/{id}              ADMIN | EMPLOYEE
//! DELETE /products/{id}              ADMIN | EMPLOYEE
//!
//! GET    /cart                       CUSTOMER
//! POST   /cart/items                 CUSTOMER
//! PATCH  /cart/items                 CUSTOMER
//! DELETE /cart/items/{product_id}    CUSTOMER
//!
//! POST   /bills/generate             CUSTOMER
//! GET    /bills                      CUSTOMER
//! GET    /bills/{id}                 CUSTOMER
//!
//! GET    /health                     public
//! ```

pub mod auth;
pub mod bills;
pub mod cart;
pub mod products;

use std::sync::Arc;

use axum::extract::State;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde_json::json;

use crate::state::AppState;

/// Build the full application router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/refresh", post(auth::refresh))
        .route("/products", get(products::list).post(products::create))
        .route(
            "/products/{id}",
            get(products::get).put(products::update).delete(products::remove),
        )
        .route("/cart", get(cart::view))
        .route("/cart/items", post(cart::add_item).patch(cart::update_item))
        .route("/cart/items/{product_id}", delete(cart::remove_item))
        .route("/bills/generate", post(bills::generate))
        .route("/bills", get(bills::list))
        .route("/bills/{id}", get(bills::get))
        .with_state(state)
}

/// Liveness probe: checks the database connection.
async fn health(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let healthy = state.db.health_check().await;
    Json(json!({ "status": if healthy { "ok" } else { "degraded" } }))
}
