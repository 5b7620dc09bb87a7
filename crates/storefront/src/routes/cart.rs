//! Cart routes. All require a signed-in user.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, patch},
};
use serde::Serialize;
use tracing::instrument;

use jerseyworks_core::CartItemId;

use crate::db::{CartRepository, ProductRepository};
use crate::error::{AppError, Result};
use crate::extract::{ApiJson, ApiPath};
use crate::middleware::RequireUser;
use crate::models::{CartItem, CartView};
use crate::services::cart::{AddToCart, UpdateCartItem, apply_update, build_line};
use crate::services::checkout::price_entries;
use crate::state::AppState;

/// Build the cart router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/cart", get(show).post(add).delete(clear))
        .route("/api/cart/count", get(count))
        .route("/api/cart/items/{id}", patch(update).delete(remove))
}

/// Response of `GET /api/cart/count`.
#[derive(Debug, Serialize)]
pub struct CartCount {
    pub count: i64,
}

/// Response of `DELETE /api/cart`.
#[derive(Debug, Serialize)]
pub struct Cleared {
    pub removed: u64,
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
async fn show(State(state): State<AppState>, RequireUser(user): RequireUser) -> Result<Json<CartView>> {
    let entries = CartRepository::new(state.pool()).entries(user.id).await?;
    Ok(Json(price_entries(entries)?))
}

#[instrument(skip(state, user, request), fields(user_id = %user.id, product_id = %request.product_id))]
async fn add(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    ApiJson(request): ApiJson<AddToCart>,
) -> Result<(StatusCode, Json<CartItem>)> {
    let product_id = request.product_id;
    let product = ProductRepository::new(state.pool())
        .get(product_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {product_id}")))?;
    let rules = state.store_rules().await?;

    let line = build_line(request, product.customization, rules)?;
    let item = CartRepository::new(state.pool())
        .add(user.id, product_id, &line)
        .await?;

    tracing::info!(quantity = item.line.quantity, "cart line saved");
    Ok((StatusCode::CREATED, Json(item)))
}

#[instrument(skip(state, user, update), fields(user_id = %user.id))]
async fn update(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    ApiPath(id): ApiPath<CartItemId>,
    ApiJson(update): ApiJson<UpdateCartItem>,
) -> Result<Json<CartItem>> {
    let carts = CartRepository::new(state.pool());
    let item = carts
        .get(user.id, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("cart item {id}")))?;
    let product = ProductRepository::new(state.pool())
        .get(item.product_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {}", item.product_id)))?;
    let rules = state.store_rules().await?;

    let line = apply_update(item.line, update, product.customization, rules)?;
    let item = carts.replace(user.id, id, &line).await?;
    Ok(Json(item))
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
async fn remove(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    ApiPath(id): ApiPath<CartItemId>,
) -> Result<StatusCode> {
    CartRepository::new(state.pool()).remove(user.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
async fn clear(State(state): State<AppState>, RequireUser(user): RequireUser) -> Result<Json<Cleared>> {
    let removed = CartRepository::new(state.pool()).clear(user.id).await?;
    Ok(Json(Cleared { removed }))
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
async fn count(State(state): State<AppState>, RequireUser(user): RequireUser) -> Result<Json<CartCount>> {
    let count = CartRepository::new(state.pool()).count(user.id).await?;
    Ok(Json(CartCount { count }))
}
