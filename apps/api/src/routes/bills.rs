//! Bill routes. CUSTOMER only.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use tracing::info;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::notifier::NotificationJob;
use crate::state::AppState;
use bazaar_core::BillWithItems;

/// POST /bills/generate
///
/// Runs the checkout transaction. On success the receipt email is
/// queued after the transaction has committed; a failed delivery can
/// never undo a sale.
pub async fn generate(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<(StatusCode, Json<BillWithItems>), ApiError> {
    user.require_customer()?;

    let bill = state.db.billing().generate_bill(&user.id).await?;

    info!(
        user_id = %user.id,
        bill_id = %bill.bill.id,
        total_cents = bill.bill.total_cents,
        "Bill generated"
    );

    state.notifier.enqueue(NotificationJob::BillReceipt {
        email: user.email.clone(),
        bill: bill.clone(),
    });

    Ok((StatusCode::CREATED, Json(bill)))
}

/// GET /bills
pub async fn list(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<Json<Vec<BillWithItems>>, ApiError> {
    user.require_customer()?;

    let bills = state.db.bills().list_for_user(&user.id).await?;
    Ok(Json(bills))
}

/// GET /bills/{id}
///
/// Owner-scoped: asking for another customer's bill is
/// indistinguishable from asking for one that does not exist.
pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    user: AuthUser,
) -> Result<Json<BillWithItems>, ApiError> {
    user.require_customer()?;

    let bill = state
        .db
        .bills()
        .get_for_user(&user.id, &id)
        .await?
        .ok_or_else(|| ApiError::not_found("Bill not found"))?;

    Ok(Json(bill))
}
