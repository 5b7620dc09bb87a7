//! Order fulfilment: list, detail, status changes and payments.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use tracing::instrument;

use jerseyworks_core::OrderId;

use crate::db::OrderRepository;
use crate::error::{AppError, Result};
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::middleware::RequireAdmin;
use crate::models::{AdminOrder, OrderDetail};
use crate::services::orders::{PaymentInput, StatusChange};
use crate::services::{OrderQuery, OrderService};
use crate::state::AppState;

/// Build the orders router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/orders", get(list))
        .route("/api/orders/{id}", get(show))
        .route("/api/orders/{id}/status", post(change_status))
        .route("/api/orders/{id}/payments", post(record_payment))
}

async fn load(state: &AppState, id: OrderId) -> Result<OrderDetail> {
    OrderRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {id}")))
}

#[instrument(skip(state, admin, query), fields(admin_id = %admin.id))]
async fn list(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ApiQuery(query): ApiQuery<OrderQuery>,
) -> Result<Json<Vec<AdminOrder>>> {
    let orders = OrderRepository::new(state.pool()).list().await?;
    Ok(Json(query.apply(orders)))
}

#[instrument(skip(state, admin), fields(admin_id = %admin.id))]
async fn show(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ApiPath(id): ApiPath<OrderId>,
) -> Result<Json<OrderDetail>> {
    Ok(Json(load(&state, id).await?))
}

/// Apply a status change and return the refreshed order.
#[instrument(skip(state, admin, change), fields(admin_id = %admin.id))]
async fn change_status(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ApiPath(id): ApiPath<OrderId>,
    ApiJson(change): ApiJson<StatusChange>,
) -> Result<Json<OrderDetail>> {
    OrderService::new(state.pool())
        .change_status(id, &change, Some(admin.id))
        .await?;
    Ok(Json(load(&state, id).await?))
}

/// Record a payment and return the refreshed order.
#[instrument(skip(state, admin, input), fields(admin_id = %admin.id))]
async fn record_payment(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ApiPath(id): ApiPath<OrderId>,
    ApiJson(input): ApiJson<PaymentInput>,
) -> Result<(StatusCode, Json<OrderDetail>)> {
    let input = input.normalized()?;
    OrderService::new(state.pool())
        .record_payment(id, &input, Some(admin.id))
        .await?;
    Ok((StatusCode::CREATED, Json(load(&state, id).await?)))
}
