//! Checkout route.

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    routing::post,
};
use tracing::instrument;

use crate::error::Result;
use crate::middleware::RequireUser;
use crate::models::OrderDetail;
use crate::services::checkout::{CheckoutRequest, CheckoutService};
use crate::state::AppState;

/// Build the checkout router.
pub fn router() -> Router<AppState> {
    Router::new().route("/api/checkout", post(checkout))
}

/// Place an order for the caller's cart.
///
/// The body is optional; no body or `{}` checks out without an address or
/// notes. A malformed body is a 400.
#[instrument(skip(state, user, request), fields(user_id = %user.id))]
async fn checkout(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    request: std::result::Result<Option<Json<CheckoutRequest>>, JsonRejection>,
) -> Result<(StatusCode, Json<OrderDetail>)> {
    let request = request?.map(|Json(r)| r).unwrap_or_default();
    let rules = state.store_rules().await?;

    let order = CheckoutService::new(state.pool())
        .place_order(user.id, &request, rules)
        .await?;

    Ok((StatusCode::CREATED, Json(order)))
}
